use crate::handlers::{result, upload};
use crate::AppState;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use axum::Router;

pub fn job_routes<S>(max_upload_bytes: usize) -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	Router::new()
		// Multipart upload, answers with the job id
		.route("/upload", post(upload::upload).layer(DefaultBodyLimit::max(max_upload_bytes)))
		// Poll, consumes the result once terminal
		.route("/result/:uuid", get(result::get_result))
}
