pub mod health;
pub mod jobs;

use crate::metrics::{metrics_handler, metrics_middleware};
use crate::AppState;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// The full HTTP surface with its shared layers, bound to `state`.
pub fn app(state: AppState) -> Router {
	let max_upload = state.core.config.max_upload_bytes();

	Router::new()
		.merge(jobs::job_routes(max_upload))
		.merge(health::get_health())
		.route("/metrics", get(metrics_handler))
		.layer(
			ServiceBuilder::new()
				.layer(axum::middleware::from_fn(metrics_middleware))
				.layer(TraceLayer::new_for_http()),
		)
		.with_state(state)
}
