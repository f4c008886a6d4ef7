use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};
use transcript::{TranscribeError, Transcriber, Transcript};

/// Runs `program args... <input>` and reads a JSON [`Transcript`] from its stdout.
///
/// A non-zero exit status is an engine failure carrying the program's stderr.
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
	program: String,
	args: Vec<String>,
}

impl CommandTranscriber {
	#[must_use]
	pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
		Self { program: program.into(), args }
	}

	#[must_use]
	pub fn program(&self) -> &str {
		&self.program
	}
}

impl Transcriber for CommandTranscriber {
	fn transcribe(&self, input: &Path) -> Result<Transcript, TranscribeError> {
		debug!(program = %self.program, args = ?self.args, input = %input.display(), "Spawning transcription command");
		let start = Instant::now();

		let output = Command::new(&self.program)
			.args(&self.args)
			.arg(input)
			.output()
			.map_err(|e| TranscribeError::Engine(format!("failed to run {}: {e}", self.program)))?;

		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
			let reason = if stderr.is_empty() { format!("{} exited with {}", self.program, output.status) } else { stderr };
			return Err(TranscribeError::Engine(reason));
		}

		let stdout = String::from_utf8(output.stdout).map_err(|e| TranscribeError::Decode(format!("engine output is not UTF-8: {e}")))?;
		let transcript = Transcript::from_json(&stdout)?;

		info!(
			program = %self.program,
			segments = transcript.segments.len(),
			elapsed_ms = start.elapsed().as_millis(),
			"Transcription command finished"
		);

		Ok(transcript)
	}
}
