use crate::job::JobId;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
	#[error("Task Not Found")]
	NotFound,

	#[error("failure")]
	JobFailed(JobId),

	#[error("Result artifact missing: {}", .0.display())]
	MissingArtifact(PathBuf),

	#[error("multipart request has no file field")]
	MissingUpload,

	#[error("Invalid multipart body: {0}")]
	Multipart(#[from] MultipartError),

	#[error("Job queue is not accepting work")]
	QueueClosed,

	#[error("I/O error: {0}")]
	IoError(#[from] std::io::Error),
}

impl GatewayError {
	const fn status_code(&self) -> StatusCode {
		match self {
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::JobFailed(_) | Self::MissingArtifact(_) | Self::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::MissingUpload | Self::Multipart(_) => StatusCode::BAD_REQUEST,
			Self::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
		}
	}
}

impl IntoResponse for GatewayError {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::MissingArtifact(ref path) => {
				tracing::error!(path = %path.display(), "Job succeeded but its result artifact is missing");
				(self.status_code(), "Internal Server Error").into_response()
			}
			Self::IoError(ref e) => {
				tracing::error!("I/O error: {:?}", e);
				(self.status_code(), "Internal Server Error").into_response()
			}
			Self::JobFailed(id) => {
				tracing::info!(%id, "Reporting failed job");
				(self.status_code(), self.to_string()).into_response()
			}
			// All other errors fall back
			_ => (self.status_code(), self.to_string()).into_response(),
		}
	}
}
