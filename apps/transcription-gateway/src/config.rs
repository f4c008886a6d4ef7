use axum::http::StatusCode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
	/// External program printing a JSON transcript on stdout
	Command,
	/// In-process whisper.cpp (requires the `whisper` feature). Decodes WAV uploads only;
	/// compressed formats such as mp3 need the command engine with a converting wrapper
	Whisper,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "transcription-gateway")]
#[command(about = "Upload audio, poll for subtitles", long_about = None)]
pub struct Config {
	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "8000")]
	pub port: u16,

	/// Directory holding raw uploads, keyed by job id
	#[arg(long, env = "UPLOADS_DIR", default_value = "uploads")]
	pub uploads_dir: PathBuf,

	/// Directory holding results, keyed by `{id}.srt`
	#[arg(long, env = "RESULTS_DIR", default_value = "results")]
	pub results_dir: PathBuf,

	/// Chunk size used when streaming results back to clients
	#[arg(long, env = "STREAM_CHUNK_SIZE", default_value = "1048576")]
	pub stream_chunk_size: usize,

	/// Maximum accepted upload size in MiB
	#[arg(long, env = "MAX_UPLOAD_MB", default_value = "512")]
	pub max_upload_mb: usize,

	/// Status returned while a job is pending. `102` is accepted but hyper turns any 1xx
	/// final response into a 500, so it only survives behind a proxy that rewrites it
	#[arg(long, env = "PENDING_STATUS", default_value = "202")]
	pub pending_status: u16,

	/// Transcription engine. `whisper` reads WAV input only
	#[arg(long, env = "TRANSCRIBE_ENGINE", value_enum, default_value = "command")]
	pub engine: Engine,

	/// Program run by the command engine; the input path is appended to its arguments
	#[arg(long, env = "TRANSCRIBER_CMD", default_value = "whisper-json")]
	pub transcriber_cmd: String,

	/// Whitespace separated arguments passed before the input path
	#[arg(long, env = "TRANSCRIBER_ARGS", default_value = "")]
	pub transcriber_args: String,

	/// Whisper model path
	#[arg(long, env = "WHISPER_MODEL_PATH")]
	pub whisper_model_path: Option<String>,

	/// Number of threads for Whisper processing
	#[arg(long, env = "WHISPER_THREADS", default_value = "2")]
	pub whisper_threads: i32,

	/// Spoken language hint for Whisper, `auto` to detect
	#[arg(long, env = "WHISPER_LANGUAGE")]
	pub whisper_language: Option<String>,

	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter directives
	#[arg(long, env = "RUST_LOG", default_value = "info")]
	pub rust_log: String,
}

impl Config {
	/// Validate configuration values
	///
	/// # Errors
	/// Describes the first invalid value.
	pub fn validate(&self) -> Result<(), String> {
		if self.stream_chunk_size == 0 {
			return Err("stream_chunk_size must be greater than 0".to_string());
		}

		if self.max_upload_mb == 0 {
			return Err("max_upload_mb must be greater than 0".to_string());
		}

		if StatusCode::from_u16(self.pending_status).is_err() {
			return Err(format!("pending_status {} is not a valid HTTP status", self.pending_status));
		}

		if self.engine == Engine::Whisper && self.whisper_model_path.is_none() {
			return Err("whisper engine requires whisper_model_path".to_string());
		}

		if self.whisper_threads < 1 {
			return Err("whisper_threads must be at least 1".to_string());
		}

		Ok(())
	}

	#[must_use]
	pub fn pending_status(&self) -> StatusCode {
		StatusCode::from_u16(self.pending_status).unwrap_or(StatusCode::ACCEPTED)
	}

	#[must_use]
	pub const fn max_upload_bytes(&self) -> usize {
		self.max_upload_mb.saturating_mul(1024 * 1024)
	}

	#[must_use]
	pub fn transcriber_args(&self) -> Vec<String> {
		self.transcriber_args.split_whitespace().map(str::to_string).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Config {
		Config::parse_from(std::iter::once("transcription-gateway").chain(args.iter().copied()))
	}

	#[test]
	fn defaults_are_valid() {
		let config = parse(&[]);
		assert!(config.validate().is_ok());
		assert_eq!(config.pending_status(), StatusCode::ACCEPTED);
		assert_eq!(config.max_upload_bytes(), 512 * 1024 * 1024);
	}

	#[test]
	fn splits_transcriber_args() {
		let config = parse(&["--transcriber-args", "-m  base --json"]);
		assert_eq!(config.transcriber_args(), vec!["-m", "base", "--json"]);
	}

	#[test]
	fn whisper_requires_a_model() {
		let config = parse(&["--engine", "whisper"]);
		assert!(config.validate().is_err());

		let config = parse(&["--engine", "whisper", "--whisper-model-path", "ggml-base.bin"]);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn engine_help_names_the_whisper_input_format() {
		use clap::CommandFactory;

		let command = Config::command();
		let engine = command.get_arguments().find(|arg| arg.get_id() == "engine").unwrap();
		assert!(engine.get_help().unwrap().to_string().contains("WAV"));
	}

	#[test]
	fn processing_status_stays_available() {
		let config = parse(&["--pending-status", "102"]);
		assert!(config.validate().is_ok());
		assert_eq!(config.pending_status(), StatusCode::PROCESSING);
	}

	#[test]
	fn rejects_bad_values() {
		assert!(parse(&["--stream-chunk-size", "0"]).validate().is_err());
		assert!(parse(&["--pending-status", "42"]).validate().is_err());
		assert!(parse(&["--whisper-threads", "0"]).validate().is_err());
	}
}
