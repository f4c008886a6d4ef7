use axum::{
	body::Body,
	extract::MatchedPath,
	http::{Request, Response, StatusCode},
	middleware::Next,
};
use lazy_static::lazy_static;
use prometheus::{
	register_histogram, register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, Histogram, HistogramVec, IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Instant;

lazy_static! {
	static ref HTTP_REQUESTS_TOTAL: IntCounterVec =
		register_int_counter_vec!("http_requests_total", "Total number of HTTP requests", &["method", "route", "status"]).expect("Failed to register HTTP_REQUESTS_TOTAL");
	static ref HTTP_REQUEST_DURATION: HistogramVec =
		register_histogram_vec!("http_request_duration_seconds", "HTTP request duration in seconds", &["method", "route"]).expect("Failed to register HTTP_REQUEST_DURATION");
	pub static ref JOBS_TOTAL: IntCounterVec =
		register_int_counter_vec!("transcription_jobs_total", "Jobs that reached a terminal state", &["state"]).expect("Failed to register JOBS_TOTAL");
	pub static ref JOB_DURATION: Histogram = register_histogram!(
		"transcription_job_duration_seconds",
		"Time from dequeue to terminal state",
		vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]
	)
	.expect("Failed to register JOB_DURATION");
	pub static ref QUEUE_DEPTH: IntGauge = register_int_gauge!("transcription_queue_depth", "Jobs waiting for the worker").expect("Failed to register QUEUE_DEPTH");
	pub static ref WORKER_BUSY: IntGauge = register_int_gauge!("transcription_worker_busy", "1 while the worker is processing a job").expect("Failed to register WORKER_BUSY");
}

/// Middleware for Prometheus metrics collection
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response<Body> {
	let method = req.method().to_string();
	// matched template, so job ids stay out of the label set
	let route = req.extensions().get::<MatchedPath>().map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

	let start = Instant::now();
	let response = next.run(req).await;
	let duration = start.elapsed().as_secs_f64();

	let status = response.status().as_u16().to_string();

	HTTP_REQUESTS_TOTAL.with_label_values(&[&method, &route, &status]).inc();
	HTTP_REQUEST_DURATION.with_label_values(&[&method, &route]).observe(duration);

	response
}

/// Prometheus metrics handler
pub async fn metrics_handler() -> Result<String, StatusCode> {
	let encoder = TextEncoder::new();
	let metric_families = prometheus::gather();
	let mut buffer = Vec::new();

	if encoder.encode(&metric_families, &mut buffer).is_err() {
		return Err(StatusCode::INTERNAL_SERVER_ERROR);
	}

	String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
