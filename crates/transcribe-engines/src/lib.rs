//! Concrete [`transcript::Transcriber`] engines.
//!
//! The default build only ships [`CommandTranscriber`], which delegates to an external
//! program. The in-process Whisper engine needs the native whisper.cpp toolchain and sits
//! behind the `whisper` feature.

pub mod audio;
pub mod command;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use command::CommandTranscriber;
#[cfg(feature = "whisper")]
pub use whisper::WhisperTranscriber;
