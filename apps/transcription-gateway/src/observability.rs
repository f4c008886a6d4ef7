use crate::config::Config;
use std::str::FromStr;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Install the global subscriber: JSON lines when `log_json` is set, pretty output otherwise.
///
/// An unparsable filter falls back to `info`. Calling this twice is a no-op.
pub fn init_tracing(config: &Config) {
	let filter = EnvFilter::from_str(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

	let layer = if config.log_json {
		tracing_subscriber::fmt::layer()
			.fmt_fields(JsonFields::default())
			.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
			.with_filter(filter)
			.boxed()
	} else {
		tracing_subscriber::fmt::layer().event_format(tracing_subscriber::fmt::format().pretty()).with_filter(filter).boxed()
	};

	let _ = tracing_subscriber::registry().with(layer).try_init();
}
