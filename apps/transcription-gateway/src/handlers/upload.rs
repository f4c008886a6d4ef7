use crate::artifact::remove_if_exists;
use crate::error::GatewayError;
use crate::job::{Job, JobId};
use crate::worker::QueueError;
use crate::AppState;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

#[derive(Serialize, Debug)]
pub struct UploadResponse {
	pub uuid: JobId,
}

/// Persist the uploaded file, register the job as pending and queue it. Returns at once.
#[instrument(name = "upload", skip_all)]
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>, GatewayError> {
	let id = JobId::new();
	let input_path = state.jobs.paths.input_path(id);

	let mut stored = 0usize;
	let mut found = false;
	while let Some(field) = multipart.next_field().await? {
		if field.name() == Some("file") || field.file_name().is_some() {
			stored = match store_field(field, &input_path).await {
				Ok(bytes) => bytes,
				Err(e) => {
					remove_if_exists(&input_path).await;
					return Err(e);
				}
			};
			found = true;
			break;
		}
	}

	if !found {
		return Err(GatewayError::MissingUpload);
	}

	let job = Job::new(id, input_path);
	state.jobs.registry.set(id, job.clone()).await;

	match state.jobs.queue.enqueue(job) {
		Ok(depth) => {
			info!(%id, bytes = stored, queue_depth = depth, "📤 Job queued");
			Ok(Json(UploadResponse { uuid: id }))
		}
		Err(QueueError::Closed(job)) => {
			warn!(%id, "⚠️ Upload rejected, worker is shut down");
			if let Err(e) = state.jobs.registry.remove(id).await {
				warn!(%id, error = %e, "⚠️ Rolled back job was already gone from the registry");
			}
			remove_if_exists(&job.input_path).await;
			Err(GatewayError::QueueClosed)
		}
	}
}

async fn store_field(mut field: Field<'_>, path: &Path) -> Result<usize, GatewayError> {
	let mut file = tokio::fs::File::create(path).await?;
	let mut written = 0usize;

	while let Some(chunk) = field.chunk().await? {
		file.write_all(&chunk).await?;
		written += chunk.len();
	}

	file.flush().await?;
	Ok(written)
}
