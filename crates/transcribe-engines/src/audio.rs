use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;
use tracing::debug;
use transcript::TranscribeError;

/// Sample rate Whisper models are trained on.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decode a WAV file into mono `f32` samples at [`WHISPER_SAMPLE_RATE`].
///
/// # Errors
/// Fails if the file cannot be opened or is not a PCM/float WAV stream.
pub fn load_wav(path: &Path) -> Result<Vec<f32>, TranscribeError> {
	let file = std::fs::File::open(path)?;
	decode_wav(std::io::BufReader::new(file))
}

/// # Errors
/// Fails on malformed headers, unsupported bit depths or truncated sample data.
pub fn decode_wav<R: Read>(reader: R) -> Result<Vec<f32>, TranscribeError> {
	let mut reader = WavReader::new(reader).map_err(|e| TranscribeError::UnsupportedInput(format!("not a WAV stream: {e}")))?;
	let spec = reader.spec();

	debug!(
		sample_rate = spec.sample_rate,
		channels = spec.channels,
		bits_per_sample = spec.bits_per_sample,
		format = ?spec.sample_format,
		"Decoding WAV input"
	);

	let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
		(SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>().map_err(decode_error)?,
		(SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
			let scale = f64::from(1u32 << (bits - 1));
			reader
				.samples::<i32>()
				.map(|s| s.map(|sample| (f64::from(sample) / scale) as f32))
				.collect::<Result<_, _>>()
				.map_err(decode_error)?
		}
		(format, bits) => return Err(TranscribeError::UnsupportedInput(format!("{bits}-bit {format:?} samples"))),
	};

	let mono = downmix(samples, spec.channels);
	Ok(resample_simple(&mono, spec.sample_rate, WHISPER_SAMPLE_RATE))
}

fn decode_error(error: hound::Error) -> TranscribeError {
	TranscribeError::Decode(error.to_string())
}

/// Average interleaved frames down to one channel.
#[must_use]
pub fn downmix(samples: Vec<f32>, channels: u16) -> Vec<f32> {
	if channels <= 1 {
		return samples;
	}

	let width = usize::from(channels);
	samples.chunks_exact(width).map(|frame| frame.iter().sum::<f32>() / f32::from(channels)).collect()
}

/// Nearest-sample rate conversion.
#[must_use]
pub fn resample_simple(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
	if from_rate == to_rate || from_rate == 0 || to_rate == 0 {
		return samples.to_vec();
	}

	let ratio = f64::from(from_rate) / f64::from(to_rate);
	let output_len = (samples.len() as f64 / ratio) as usize;

	(0..output_len)
		.map(|i| {
			let src_idx = (i as f64 * ratio) as usize;
			samples.get(src_idx).copied().unwrap_or(0.0)
		})
		.collect()
}
