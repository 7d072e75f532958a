//! Built-in generators so the service is useful without any external config.

use crate::domain::Question;
use crate::generator::QuizGenerator;
use crate::pool::Pool;

fn q(id: u64, level: u32, text: &str, answers: &[&str]) -> Question {
  Question::new(id, level, text).with_answers(answers.iter().copied())
}

fn js_questions() -> Vec<Question> {
  vec![
    q(1, 1, "Which keyword declares a block-scoped variable?", &["var", "let", "def"]),
    q(2, 1, "What does `typeof null` return?", &["\"null\"", "\"object\"", "\"undefined\""]),
    q(3, 1, "Which method appends an element to an array?", &["push", "pop", "shift"]),
    q(4, 2, "What is the result of `[] + []`?", &["\"\"", "0", "[]"]),
    q(5, 2, "Which statement creates a shallow copy of `obj`?", &["{ ...obj }", "obj", "Object.freeze(obj)"]),
    q(6, 2, "What does `Array.prototype.map` return?", &["a new array", "undefined", "the same array"]),
    q(7, 2, "Which comparison does not coerce types?", &["==", "===", "="]),
    q(8, 3, "When does a `Promise.all` reject?", &["when any input rejects", "never", "when all inputs reject"]),
    q(9, 3, "Which queue runs `queueMicrotask` callbacks?", &["microtask queue", "task queue", "render queue"]),
    q(10, 3, "What does a closure capture?", &["its lexical environment", "a copy of the globals", "nothing"]),
  ]
}

/// Ten questions over three tiers: 1-3 at level 1, 4-7 at level 2, 8-10 at level 3.
pub fn tiered_pool() -> Pool {
  Pool::new(js_questions()).unwrap_or_default()
}

/// Default generators: js, js-homework, math, bible.
pub fn seed_generators() -> Vec<QuizGenerator> {
  let homework = vec![
    q(1, 1, "Write a function that sums an array of numbers.", &[]),
    q(2, 1, "Write a function that reverses a string.", &[]),
    q(3, 2, "Implement a debounce helper.", &[]),
  ];
  let math = vec![
    q(1, 1, "7 + 5 = ?", &["11", "12", "13"]),
    q(2, 1, "9 - 4 = ?", &["5", "6", "4"]),
    q(3, 2, "6 × 7 = ?", &["36", "42", "48"]),
    q(4, 2, "56 ÷ 8 = ?", &["6", "7", "8"]),
  ];
  let bible = vec![
    q(1, 1, "Who built the ark?", &["Noah", "Moses", "David"]),
    q(2, 1, "How many days did creation take, before the day of rest?", &["6", "7", "40"]),
    q(3, 2, "Which book follows Genesis?", &["Exodus", "Leviticus", "Numbers"]),
  ];

  vec![
    QuizGenerator::new("js", "JS Quiz", tiered_pool()),
    QuizGenerator::new("js-homework", "JS Homework", Pool::new(homework).unwrap_or_default()),
    QuizGenerator::new("math", "Math Quiz", Pool::new(math).unwrap_or_default()),
    QuizGenerator::new("bible", "Bible Quiz", Pool::new(bible).unwrap_or_default()),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_pools_are_valid_and_non_empty() {
    let gens = seed_generators();
    assert_eq!(gens.len(), 4);
    for g in &gens {
      assert!(!g.pool().is_empty(), "{} has no questions", g.domain);
    }
    assert_eq!(tiered_pool().len(), 10);
  }
}
