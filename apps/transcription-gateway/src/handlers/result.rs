use crate::artifact::{remove_if_exists, stream_once};
use crate::error::GatewayError;
use crate::job::JobId;
use crate::registry::Lookup;
use crate::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, instrument};

/// Poll for a job's result.
///
/// Pending jobs answer with the configured pending status and stay registered. A terminal
/// job is removed from the registry by the first poll that sees it: success streams the
/// subtitle file (deleted once the body is done), failure reports `500` and clears the
/// input if the worker left it behind. Every later poll for the same id is `404`.
#[instrument(name = "result", skip(state))]
pub async fn get_result(State(state): State<AppState>, Path(uuid): Path<String>) -> Result<Response, GatewayError> {
	let id: JobId = uuid.parse().map_err(|_| GatewayError::NotFound)?;

	match state.jobs.registry.take_if_terminal(id).await {
		Lookup::NotFound => Err(GatewayError::NotFound),
		Lookup::Pending => {
			debug!(%id, "Job still pending");
			Ok((state.core.config.pending_status(), "pending").into_response())
		}
		Lookup::Failed(job) => {
			remove_if_exists(&job.input_path).await;
			Err(GatewayError::JobFailed(id))
		}
		Lookup::Succeeded(job) => {
			let output = job.output_path(state.jobs.paths.results_dir());
			let stream = match stream_once(output.clone(), state.core.config.stream_chunk_size).await {
				Ok(stream) => stream,
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(GatewayError::MissingArtifact(output)),
				Err(e) => {
					// the entry is already consumed, nobody can ask for this file again
					remove_if_exists(&output).await;
					return Err(GatewayError::IoError(e));
				}
			};

			info!(%id, "📦 Streaming result");
			Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], Body::from_stream(stream)).into_response())
		}
	}
}
