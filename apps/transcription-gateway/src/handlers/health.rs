use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct HealthResponse {
	status: &'static str,
	version: &'static str,
	jobs: usize,
	queue_depth: usize,
}

#[instrument(name = "health", skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
	let response = HealthResponse {
		status: if state.jobs.queue.is_closed() { "draining" } else { "healthy" },
		version: env!("CARGO_PKG_VERSION"), // pulled from Cargo.toml at compile time
		jobs: state.jobs.registry.len().await,
		queue_depth: state.jobs.queue.depth(),
	};

	(StatusCode::OK, Json(response))
}
