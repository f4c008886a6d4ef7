use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};
use transcript::{ResultWriter, TranscribeError, Transcriber, Transcript, WriteError};

/// Why a single job ended in `Failure`. Never escapes the worker loop.
#[derive(Error, Debug)]
pub enum JobError {
	#[error("Input artifact missing: {}", .0.display())]
	InputMissing(PathBuf),

	#[error("Transcription failed: {0}")]
	Transcription(#[from] TranscribeError),

	#[error("Failed to persist result: {0}")]
	Persist(#[from] WriteError),

	#[error("Worker task failed: {0}")]
	Worker(String),
}

/// PROCESS then PERSIST_RESULT, run on a blocking thread.
///
/// The input artifact is removed as soon as transcription succeeds, before the result is
/// written. A persist failure after that point leaves nothing to retry from.
pub fn run(transcriber: &dyn Transcriber, writer: &dyn ResultWriter, input: &Path, output: &Path) -> Result<(), JobError> {
	info!(input = %input.display(), "🧠 [STEP 1/2] Running transcription...");
	let start = Instant::now();

	let transcript = transcriber.transcribe(input)?;

	info!(
		segments = transcript.segments.len(),
		duration_secs = format!("{:.2}", transcript.duration().as_secs_f64()),
		transcribe_latency_ms = start.elapsed().as_millis(),
		"✅ [STEP 1/2] Transcription completed"
	);

	if let Err(e) = std::fs::remove_file(input) {
		warn!(error = %e, input = %input.display(), "⚠️ Could not remove input artifact");
	}

	info!(output = %output.display(), "📝 [STEP 2/2] Writing result...");
	if let Err(e) = persist(writer, &transcript, output) {
		error!(error = %e, output = %output.display(), "❌ Result could not be written and the input is already gone; job is unrecoverable");
		match std::fs::remove_file(output) {
			Ok(()) => {}
			Err(cleanup) if cleanup.kind() == std::io::ErrorKind::NotFound => {}
			Err(cleanup) => warn!(error = %cleanup, "⚠️ Could not remove partial result"),
		}
		return Err(JobError::Persist(e));
	}

	info!(output = %output.display(), "✅ [STEP 2/2] Result written");
	Ok(())
}

fn persist(writer: &dyn ResultWriter, transcript: &Transcript, output: &Path) -> Result<(), WriteError> {
	let mut out = BufWriter::new(File::create(output)?);
	writer.write(transcript, &mut out)?;
	out.flush()?;
	Ok(())
}
