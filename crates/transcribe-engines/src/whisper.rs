use crate::audio::{load_wav, WHISPER_SAMPLE_RATE};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use transcript::{Segment, TranscribeError, Transcriber, Transcript};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// In-process whisper.cpp engine. The model is loaded once and a fresh decoding state is
/// created per input. Input must be WAV; other containers are rejected as
/// [`TranscribeError::UnsupportedInput`].
pub struct WhisperTranscriber {
	ctx: WhisperContext,
	threads: i32,
	language: Option<String>,
}

impl WhisperTranscriber {
	/// # Errors
	/// Fails if the ggml model cannot be loaded.
	pub fn load(model_path: &str, threads: i32, language: Option<String>) -> Result<Self, TranscribeError> {
		info!("🔄 Loading Whisper model from {}...", model_path);
		let start = Instant::now();

		let ctx = WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
			.map_err(|e| TranscribeError::Engine(format!("failed to load model {model_path}: {e}")))?;

		info!(load_time_ms = start.elapsed().as_millis(), threads, "✅ Whisper model loaded");
		Ok(Self { ctx, threads, language })
	}

	fn params(&self) -> FullParams<'_, '_> {
		let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
		params.set_translate(false);
		params.set_print_special(false);
		params.set_print_progress(false);
		params.set_print_realtime(false);
		params.set_print_timestamps(false);
		params.set_n_threads(self.threads);
		params.set_language(self.language.as_deref());
		params
	}
}

impl Transcriber for WhisperTranscriber {
	fn transcribe(&self, input: &Path) -> Result<Transcript, TranscribeError> {
		let audio = load_wav(input)?;
		let audio_secs = audio.len() as f64 / f64::from(WHISPER_SAMPLE_RATE);

		let start = Instant::now();
		let mut state = self.ctx.create_state().map_err(|e| TranscribeError::Engine(format!("failed to create Whisper state: {e}")))?;
		state.full(self.params(), &audio).map_err(|e| TranscribeError::Engine(format!("transcription failed: {e}")))?;

		let num_segments = state.full_n_segments();
		if num_segments == 0 {
			warn!(input = %input.display(), "⚠️ No segments extracted - audio may be silence");
		}

		let mut segments = Vec::new();
		for i in 0..num_segments {
			let Some(segment) = state.get_segment(i) else { continue };
			let text = segment.to_str().map_err(|e| TranscribeError::Decode(format!("segment {i}: {e}")))?;
			segments.push(Segment::new(centiseconds(segment.start_timestamp()), centiseconds(segment.end_timestamp()), text.trim()));
		}

		let elapsed = start.elapsed().as_secs_f64();
		info!(
			segments = segments.len(),
			audio_secs = format!("{audio_secs:.2}"),
			realtime_factor = format!("{:.2}x", elapsed / audio_secs.max(f64::EPSILON)),
			"✅ Whisper transcription completed"
		);

		let transcript = Transcript::new(segments);
		Ok(match &self.language {
			Some(language) if language != "auto" => transcript.with_language(language.clone()),
			_ => transcript,
		})
	}
}

fn centiseconds(ts: i64) -> Duration {
	Duration::from_millis(u64::try_from(ts).unwrap_or(0) * 10)
}
