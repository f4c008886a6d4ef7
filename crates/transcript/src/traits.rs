use crate::{Transcript, TranscribeError, WriteError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Expensive, stateful speech-to-text capability.
///
/// Implementations are called from a blocking thread, one job at a time, and must report
/// failures through the returned `Result` rather than by panicking.
pub trait Transcriber: Send + Sync {
	/// # Errors
	/// Any engine, decoding or I/O failure for this input.
	fn transcribe(&self, input: &Path) -> Result<Transcript, TranscribeError>;
}

/// Serializes a transcript into its external wire format.
pub trait ResultWriter: Send + Sync {
	/// # Errors
	/// I/O failures on `out` or segments the format cannot represent.
	fn write(&self, transcript: &Transcript, out: &mut dyn Write) -> Result<(), WriteError>;
}

impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
	fn transcribe(&self, input: &Path) -> Result<Transcript, TranscribeError> {
		(**self).transcribe(input)
	}
}

impl<W: ResultWriter + ?Sized> ResultWriter for Arc<W> {
	fn write(&self, transcript: &Transcript, out: &mut dyn Write) -> Result<(), WriteError> {
		(**self).write(transcript, out)
	}
}
