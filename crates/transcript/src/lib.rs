//! Shared transcript model and the capability seams between the job layer and the
//! transcription engine / subtitle writer.

pub mod error;
pub mod segment;
pub mod srt;
pub mod traits;

pub use error::{TranscribeError, WriteError};
pub use segment::{Segment, Transcript};
pub use srt::SrtWriter;
pub use traits::{ResultWriter, Transcriber};
