use axum::extract::FromRef;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use transcript::{ResultWriter, Transcriber};

pub mod artifact;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod job;
pub mod metrics;
pub mod observability;
pub mod registry;
pub mod routes;
pub mod worker;

pub use config::{Config, Engine};
pub use error::GatewayError;
pub use job::{ArtifactPaths, Job, JobId, JobState};
pub use registry::{JobRegistry, Lookup, RegistryError};
pub use worker::{JobError, JobQueue, JobSender, QueueError, Worker};

/// Core: configuration and process lifetime
#[derive(Clone)]
pub struct CoreContext {
	pub config: Arc<Config>,
	pub cancel_token: CancellationToken,
}

/// Jobs: the registry, the producer side of the queue and the artifact layout
#[derive(Clone)]
pub struct JobContext {
	pub registry: Arc<JobRegistry>,
	pub queue: JobSender,
	pub paths: Arc<ArtifactPaths>,
}

#[derive(Clone)]
pub struct AppState {
	pub core: CoreContext,
	pub jobs: JobContext,
}

impl AppState {
	/// Build the shared state and the one worker that consumes its queue.
	///
	/// The worker is returned unstarted; call [`Worker::spawn`] once the caller is ready.
	#[must_use]
	pub fn build(config: Arc<Config>, transcriber: Arc<dyn Transcriber>, writer: Arc<dyn ResultWriter>, cancel_token: CancellationToken) -> (Self, Worker) {
		let registry = Arc::new(JobRegistry::new());
		let paths = Arc::new(ArtifactPaths::new(config.uploads_dir.clone(), config.results_dir.clone()));

		let mut queue = JobQueue::new();
		let sender = queue.sender();
		let Some(receiver) = queue.take_receiver() else {
			unreachable!("a fresh queue always has its receiver")
		};

		let worker = Worker::new(receiver, Arc::clone(&registry), Arc::clone(&paths), transcriber, writer, cancel_token.clone());

		let state = Self {
			core: CoreContext { config, cancel_token },
			jobs: JobContext { registry, queue: sender, paths },
		};

		(state, worker)
	}
}

impl FromRef<AppState> for Arc<Config> {
	fn from_ref(state: &AppState) -> Self {
		state.core.config.clone()
	}
}

impl FromRef<AppState> for CancellationToken {
	fn from_ref(state: &AppState) -> Self {
		state.core.cancel_token.clone()
	}
}

impl FromRef<AppState> for Arc<JobRegistry> {
	fn from_ref(state: &AppState) -> Self {
		state.jobs.registry.clone()
	}
}
