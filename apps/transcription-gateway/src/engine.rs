use crate::config::{Config, Engine};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use transcribe_engines::CommandTranscriber;
use transcript::Transcriber;

/// Construct the configured transcription engine. Model loading happens here, once.
///
/// # Errors
/// Fails if the engine cannot be initialised or was compiled out.
pub fn build_transcriber(config: &Config) -> Result<Arc<dyn Transcriber>> {
	match config.engine {
		Engine::Command => {
			let engine = CommandTranscriber::new(config.transcriber_cmd.clone(), config.transcriber_args());
			info!(program = %engine.program(), "🔧 Using command transcription engine");
			Ok(Arc::new(engine))
		}
		Engine::Whisper => whisper(config),
	}
}

#[cfg(feature = "whisper")]
fn whisper(config: &Config) -> Result<Arc<dyn Transcriber>> {
	let model_path = config.whisper_model_path.as_deref().ok_or_else(|| anyhow::anyhow!("whisper engine requires --whisper-model-path"))?;
	let engine = transcribe_engines::WhisperTranscriber::load(model_path, config.whisper_threads, config.whisper_language.clone())?;
	Ok(Arc::new(engine))
}

#[cfg(not(feature = "whisper"))]
fn whisper(_config: &Config) -> Result<Arc<dyn Transcriber>> {
	anyhow::bail!("this build does not include the whisper engine; rebuild with `--features whisper`")
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[test]
	fn builds_the_command_engine_by_default() {
		let config = Config::parse_from(["transcription-gateway"]);
		assert!(build_transcriber(&config).is_ok());
	}

	#[cfg(not(feature = "whisper"))]
	#[test]
	fn whisper_is_rejected_when_compiled_out() {
		let config = Config::parse_from(["transcription-gateway", "--engine", "whisper", "--whisper-model-path", "m.bin"]);
		assert!(build_transcriber(&config).is_err());
	}
}
