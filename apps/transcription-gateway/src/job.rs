use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Extension of every result artifact, fixed by the subtitle format.
pub const RESULT_EXTENSION: &str = "srt";

/// Opaque job identifier. Random, so never reused within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for JobId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for JobId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.hyphenated())
	}
}

impl FromStr for JobId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
	Pending,
	Success,
	Failure,
}

impl JobState {
	#[must_use]
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Success | Self::Failure)
	}

	/// `Pending` may move to either terminal state; terminal states never move.
	#[must_use]
	pub const fn can_transition_to(self, next: Self) -> bool {
		matches!(self, Self::Pending) && next.is_terminal()
	}

	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Success => "success",
			Self::Failure => "failure",
		}
	}
}

impl fmt::Display for JobState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One upload-to-result unit of work.
#[derive(Debug, Clone)]
pub struct Job {
	pub id: JobId,
	pub input_path: PathBuf,
	pub state: JobState,
	pub enqueued_at: Instant,
}

impl Job {
	#[must_use]
	pub fn new(id: JobId, input_path: PathBuf) -> Self {
		Self {
			id,
			input_path,
			state: JobState::Pending,
			enqueued_at: Instant::now(),
		}
	}

	/// Where the result artifact for this job lives. Derived, never stored.
	#[must_use]
	pub fn output_path(&self, results_dir: &Path) -> PathBuf {
		results_dir.join(format!("{}.{RESULT_EXTENSION}", self.id))
	}

	/// Time spent waiting since the job was created.
	#[must_use]
	pub fn queue_latency(&self) -> Duration {
		self.enqueued_at.elapsed()
	}
}

/// The two artifact areas: raw uploads keyed by job id and results keyed by `{id}.srt`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
	uploads: PathBuf,
	results: PathBuf,
}

impl ArtifactPaths {
	#[must_use]
	pub fn new(uploads: impl Into<PathBuf>, results: impl Into<PathBuf>) -> Self {
		Self {
			uploads: uploads.into(),
			results: results.into(),
		}
	}

	#[must_use]
	pub fn uploads_dir(&self) -> &Path {
		&self.uploads
	}

	#[must_use]
	pub fn results_dir(&self) -> &Path {
		&self.results
	}

	#[must_use]
	pub fn input_path(&self, id: JobId) -> PathBuf {
		self.uploads.join(id.to_string())
	}

	#[must_use]
	pub fn output_path(&self, id: JobId) -> PathBuf {
		self.results.join(format!("{id}.{RESULT_EXTENSION}"))
	}

	/// Create both directories if missing.
	///
	/// # Errors
	/// Propagates any filesystem error.
	pub async fn provision(&self) -> std::io::Result<()> {
		tokio::fs::create_dir_all(&self.uploads).await?;
		tokio::fs::create_dir_all(&self.results).await
	}
}
