use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscribeError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Transcription engine error: {0}")]
	Engine(String),

	#[error("Failed to decode engine output: {0}")]
	Decode(String),

	#[error("Unsupported input: {0}")]
	UnsupportedInput(String),
}

impl From<serde_json::Error> for TranscribeError {
	fn from(error: serde_json::Error) -> Self {
		Self::Decode(error.to_string())
	}
}

#[derive(Error, Debug)]
pub enum WriteError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Invalid segment {index}: {reason}")]
	InvalidSegment { index: usize, reason: String },
}
