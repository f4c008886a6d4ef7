use crate::{ResultWriter, Transcript, WriteError};
use std::io::Write;
use std::time::Duration;

/// SubRip (`.srt`) writer.
///
/// Cues are numbered from 1, blank segments are skipped without leaving gaps in the
/// numbering, and `-->` inside text is rewritten so it cannot be mistaken for a timing line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SrtWriter;

impl SrtWriter {
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl ResultWriter for SrtWriter {
	fn write(&self, transcript: &Transcript, out: &mut dyn Write) -> Result<(), WriteError> {
		let mut cue = 0usize;

		for (index, segment) in transcript.segments.iter().enumerate() {
			if segment.end < segment.start {
				return Err(WriteError::InvalidSegment {
					index,
					reason: format!("ends at {:?} before it starts at {:?}", segment.end, segment.start),
				});
			}

			let text = segment.text.trim().replace("-->", "->");
			if text.is_empty() {
				continue;
			}

			cue += 1;
			writeln!(out, "{cue}")?;
			writeln!(out, "{} --> {}", format_timestamp(segment.start), format_timestamp(segment.end))?;
			writeln!(out, "{text}")?;
			writeln!(out)?;
		}

		out.flush()?;
		Ok(())
	}
}

/// `HH:MM:SS,mmm`, hours are not wrapped.
#[must_use]
pub fn format_timestamp(at: Duration) -> String {
	let total_ms = at.as_millis();
	let hours = total_ms / 3_600_000;
	let minutes = (total_ms % 3_600_000) / 60_000;
	let seconds = (total_ms % 60_000) / 1000;
	let millis = total_ms % 1000;
	format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}
