use axum::body::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Removes the file at `path` when dropped.
#[derive(Debug)]
pub struct RemoveOnDrop {
	path: PathBuf,
}

impl RemoveOnDrop {
	#[must_use]
	pub const fn new(path: PathBuf) -> Self {
		Self { path }
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Drop for RemoveOnDrop {
	fn drop(&mut self) {
		match std::fs::remove_file(&self.path) {
			Ok(()) => debug!(path = %self.path.display(), "🧹 Result artifact removed"),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {}
			Err(e) => warn!(path = %self.path.display(), error = %e, "⚠️ Could not remove result artifact"),
		}
	}
}

/// A chunked file stream that owns the deletion guard of the file it reads.
#[derive(Debug)]
pub struct ArtifactStream {
	inner: ReaderStream<File>,
	guard: RemoveOnDrop,
}

impl ArtifactStream {
	#[must_use]
	pub fn path(&self) -> &Path {
		self.guard.path()
	}
}

impl Stream for ArtifactStream {
	type Item = io::Result<Bytes>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner).poll_next(cx)
	}
}

/// Open a result artifact as a chunked byte stream that deletes the file once the stream is
/// finished or dropped, whichever comes first.
///
/// The registry entry is already consumed when this is called, so an aborted download also
/// removes the file rather than orphaning it.
///
/// # Errors
/// Fails if the file cannot be opened; nothing is removed in that case.
pub async fn stream_once(path: PathBuf, chunk_size: usize) -> io::Result<ArtifactStream> {
	let file = File::open(&path).await?;

	Ok(ArtifactStream {
		inner: ReaderStream::with_capacity(file, chunk_size),
		guard: RemoveOnDrop::new(path),
	})
}

/// Best-effort removal of an artifact that may already be gone.
pub async fn remove_if_exists(path: &Path) {
	match tokio::fs::remove_file(path).await {
		Ok(()) => debug!(path = %path.display(), "🧹 Artifact removed"),
		Err(e) if e.kind() == io::ErrorKind::NotFound => {}
		Err(e) => warn!(path = %path.display(), error = %e, "⚠️ Could not remove artifact"),
	}
}
