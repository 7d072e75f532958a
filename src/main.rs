//! Quiz Runner · Backend
//!
//! - Axum HTTP API: level-based quizzes, public test links, authoring export
//! - Built-in question pools, overridable per domain via TOML
//! - Static quiz page fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   QUIZ_CONFIG_PATH  : path to TOML config (defaults + generators)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod pool;
mod levels;
mod selection;
mod test_link;
mod generator;
mod seeds;
mod prompt;
mod store;
mod session;
mod authoring;
mod config;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Generators are loaded and validated once; an invalid setup stops here.
  let state = Arc::new(AppState::from_env().await?);

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_runner", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
