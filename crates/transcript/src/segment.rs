use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One timed span of recognised speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
	#[serde(with = "seconds")]
	pub start: Duration,
	#[serde(with = "seconds")]
	pub end: Duration,
	pub text: String,
}

impl Segment {
	#[must_use]
	pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
		Self { start, end, text: text.into() }
	}
}

/// Ordered sequence of segments produced by a [`crate::Transcriber`].
///
/// The JSON form carries times as fractional seconds:
///
/// ```json
/// {"language": "en", "segments": [{"start": 0.0, "end": 1.5, "text": "hello"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub segments: Vec<Segment>,
}

impl Transcript {
	#[must_use]
	pub const fn new(segments: Vec<Segment>) -> Self {
		Self { language: None, segments }
	}

	#[must_use]
	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// End of the last segment, zero for an empty transcript.
	#[must_use]
	pub fn duration(&self) -> Duration {
		self.segments.iter().map(|s| s.end).max().unwrap_or_default()
	}

	/// Parse the engine JSON form.
	///
	/// # Errors
	/// Returns an error if `raw` is not a valid transcript document.
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}
}

mod seconds {
	use serde::{de::Error, Deserialize, Deserializer, Serializer};
	use std::time::Duration;

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_f64(value.as_secs_f64())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		let secs = f64::deserialize(deserializer)?;
		Duration::try_from_secs_f64(secs).map_err(|e| D::Error::custom(format!("invalid timestamp {secs}: {e}")))
	}
}
