mod pipeline;
mod queue;

pub use pipeline::JobError;
pub use queue::{JobQueue, JobReceiver, JobSender, QueueError};

use crate::artifact::remove_if_exists;
use crate::job::{ArtifactPaths, Job, JobState};
use crate::metrics::{JOBS_TOTAL, JOB_DURATION, WORKER_BUSY};
use crate::registry::JobRegistry;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use transcript::{ResultWriter, Transcriber};

/// The single consumer of the job queue.
///
/// Jobs are processed strictly one at a time in enqueue order. The transcription itself runs
/// on a blocking thread so request handling never waits on it. A failing, panicking or
/// malformed job ends in `Failure`; the loop keeps going until cancelled.
///
/// On cancellation the current job runs to completion, then every job still queued is
/// failed and its input removed.
pub struct Worker {
	rx: JobReceiver,
	registry: Arc<JobRegistry>,
	paths: Arc<ArtifactPaths>,
	transcriber: Arc<dyn Transcriber>,
	writer: Arc<dyn ResultWriter>,
	cancellation_token: CancellationToken,
}

impl Worker {
	#[must_use]
	pub fn new(
		rx: JobReceiver,
		registry: Arc<JobRegistry>,
		paths: Arc<ArtifactPaths>,
		transcriber: Arc<dyn Transcriber>,
		writer: Arc<dyn ResultWriter>,
		cancellation_token: CancellationToken,
	) -> Self {
		Self {
			rx,
			registry,
			paths,
			transcriber,
			writer,
			cancellation_token,
		}
	}

	pub fn spawn(self) -> JoinHandle<()> {
		info!("🏭 Starting transcription worker");
		tokio::spawn(self.run())
	}

	pub async fn run(mut self) {
		info!("🔄 Worker loop started, waiting for jobs...");

		loop {
			let job = tokio::select! {
				biased;
				() = self.cancellation_token.cancelled() => {
					info!("🛑 Worker shutting down (cancellation requested)");
					break;
				}
				job = self.rx.recv() => match job {
					Some(job) => job,
					None => {
						info!("🛑 Worker shutting down (queue closed)");
						break;
					}
				}
			};

			self.process(job).await;
		}

		self.drain().await;
		info!("✅ Worker exiting");
	}

	async fn process(&self, job: Job) {
		let id = job.id;
		info!(
			%id,
			queue_latency_ms = job.queue_latency().as_millis(),
			remaining = self.rx.depth(),
			"📥 Processing job from queue"
		);

		WORKER_BUSY.set(1);
		let start = Instant::now();

		let state = match self.execute(&job).await {
			Ok(()) => JobState::Success,
			Err(e) => {
				error!(%id, error = %e, "❌ Job failed");
				// a failed job is never retried, so its upload has no further use
				remove_if_exists(&job.input_path).await;
				JobState::Failure
			}
		};

		JOB_DURATION.observe(start.elapsed().as_secs_f64());
		JOBS_TOTAL.with_label_values(&[state.as_str()]).inc();
		WORKER_BUSY.set(0);

		match self.registry.transition(id, state).await {
			Ok(()) => info!(%id, %state, processing_latency_ms = start.elapsed().as_millis(), "🏁 Job completed"),
			Err(e) => error!(%id, error = %e, "❌ Could not record job state"),
		}
	}

	async fn execute(&self, job: &Job) -> Result<(), JobError> {
		match tokio::fs::try_exists(&job.input_path).await {
			Ok(true) => {}
			Ok(false) | Err(_) => return Err(JobError::InputMissing(job.input_path.clone())),
		}

		let transcriber = Arc::clone(&self.transcriber);
		let writer = Arc::clone(&self.writer);
		let input = job.input_path.clone();
		let output = self.paths.output_path(job.id);

		let handle = tokio::task::spawn_blocking({
			let output = output.clone();
			move || pipeline::run(transcriber.as_ref(), writer.as_ref(), &input, &output)
		});

		match handle.await {
			Ok(result) => result,
			Err(join_error) => {
				// panicked mid-write: nothing downstream may read a half-written result
				remove_if_exists(&output).await;
				Err(JobError::Worker(join_error.to_string()))
			}
		}
	}

	async fn drain(&mut self) {
		self.rx.close();

		let mut drained = 0usize;
		while let Some(job) = self.rx.try_recv() {
			remove_if_exists(&job.input_path).await;
			if let Err(e) = self.registry.transition(job.id, JobState::Failure).await {
				warn!(id = %job.id, error = %e, "⚠️ Could not fail drained job");
			}
			JOBS_TOTAL.with_label_values(&[JobState::Failure.as_str()]).inc();
			drained += 1;
		}

		if drained > 0 {
			warn!(drained, "⚠️ Failed queued jobs that never started");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::job::JobId;
	use std::path::{Path, PathBuf};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;
	use std::time::Duration;
	use tempfile::TempDir;
	use transcript::{Segment, SrtWriter, TranscribeError, Transcript, WriteError};

	#[derive(Debug, Clone, PartialEq, Eq)]
	enum Event {
		Start(PathBuf),
		End(PathBuf),
	}

	/// Reads the input as text, records start/end and the peak number of concurrent calls.
	#[derive(Default)]
	struct RecordingTranscriber {
		events: Mutex<Vec<Event>>,
		active: AtomicUsize,
		peak: AtomicUsize,
		delay: Duration,
	}

	impl Transcriber for RecordingTranscriber {
		fn transcribe(&self, input: &Path) -> Result<Transcript, TranscribeError> {
			let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
			self.peak.fetch_max(now, Ordering::SeqCst);
			self.events.lock().unwrap().push(Event::Start(input.to_path_buf()));

			std::thread::sleep(self.delay);
			let text = std::fs::read_to_string(input)?;

			self.events.lock().unwrap().push(Event::End(input.to_path_buf()));
			self.active.fetch_sub(1, Ordering::SeqCst);
			Ok(Transcript::new(vec![Segment::new(Duration::ZERO, Duration::from_secs(1), text)]))
		}
	}

	struct FailingTranscriber;

	impl Transcriber for FailingTranscriber {
		fn transcribe(&self, _input: &Path) -> Result<Transcript, TranscribeError> {
			Err(TranscribeError::Engine("model exploded".to_string()))
		}
	}

	/// Panics on inputs whose content is `panic`, transcribes everything else.
	struct PanickyTranscriber;

	impl Transcriber for PanickyTranscriber {
		fn transcribe(&self, input: &Path) -> Result<Transcript, TranscribeError> {
			let text = std::fs::read_to_string(input)?;
			assert!(text != "panic", "engine crashed");
			Ok(Transcript::new(vec![Segment::new(Duration::ZERO, Duration::from_secs(1), text)]))
		}
	}

	struct BrokenWriter;

	impl ResultWriter for BrokenWriter {
		fn write(&self, _transcript: &Transcript, _out: &mut dyn std::io::Write) -> Result<(), WriteError> {
			Err(WriteError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
		}
	}

	struct Harness {
		_dir: TempDir,
		paths: Arc<ArtifactPaths>,
		registry: Arc<JobRegistry>,
		tx: JobSender,
		token: CancellationToken,
		handle: JoinHandle<()>,
	}

	impl Harness {
		async fn start(transcriber: Arc<dyn Transcriber>, writer: Arc<dyn ResultWriter>) -> Self {
			let dir = tempfile::tempdir().unwrap();
			let paths = Arc::new(ArtifactPaths::new(dir.path().join("uploads"), dir.path().join("results")));
			paths.provision().await.unwrap();

			let registry = Arc::new(JobRegistry::new());
			let mut queue = JobQueue::new();
			let tx = queue.sender();
			let token = CancellationToken::new();
			let worker = Worker::new(queue.take_receiver().unwrap(), Arc::clone(&registry), Arc::clone(&paths), transcriber, writer, token.clone());

			Self {
				_dir: dir,
				paths,
				registry,
				tx,
				token,
				handle: worker.spawn(),
			}
		}

		async fn submit(&self, content: &str) -> JobId {
			let id = JobId::new();
			let input = self.paths.input_path(id);
			tokio::fs::write(&input, content).await.unwrap();
			let job = Job::new(id, input);
			self.registry.set(id, job.clone()).await;
			self.tx.enqueue(job).unwrap();
			id
		}

		async fn wait_terminal(&self, id: JobId) -> JobState {
			for _ in 0..500 {
				let state = self.registry.get(id).await.unwrap().state;
				if state.is_terminal() {
					return state;
				}
				tokio::time::sleep(Duration::from_millis(10)).await;
			}
			panic!("job {id} never finished");
		}
	}

	#[tokio::test]
	async fn successful_job_writes_result_and_removes_input() {
		let h = Harness::start(Arc::new(RecordingTranscriber::default()), Arc::new(SrtWriter::new())).await;
		let id = h.submit("hello world").await;

		assert_eq!(h.wait_terminal(id).await, JobState::Success);
		assert!(!h.paths.input_path(id).exists());

		let srt = tokio::fs::read_to_string(h.paths.output_path(id)).await.unwrap();
		assert_eq!(srt, "1\n00:00:00,000 --> 00:00:01,000\nhello world\n\n");
	}

	#[tokio::test]
	async fn engine_failure_removes_input_before_failing() {
		let h = Harness::start(Arc::new(FailingTranscriber), Arc::new(SrtWriter::new())).await;
		let id = h.submit("audio").await;

		assert_eq!(h.wait_terminal(id).await, JobState::Failure);
		assert!(!h.paths.input_path(id).exists());
		assert!(!h.paths.output_path(id).exists());
	}

	#[tokio::test]
	async fn persist_failure_is_unrecoverable() {
		let h = Harness::start(Arc::new(RecordingTranscriber::default()), Arc::new(BrokenWriter)).await;
		let id = h.submit("audio").await;

		assert_eq!(h.wait_terminal(id).await, JobState::Failure);
		// input was consumed by the successful transcription step
		assert!(!h.paths.input_path(id).exists());
		assert!(!h.paths.output_path(id).exists());
	}

	#[tokio::test]
	async fn missing_input_fails_the_job_not_the_loop() {
		let h = Harness::start(Arc::new(RecordingTranscriber::default()), Arc::new(SrtWriter::new())).await;

		let ghost = JobId::new();
		let job = Job::new(ghost, h.paths.input_path(ghost));
		h.registry.set(ghost, job.clone()).await;
		h.tx.enqueue(job).unwrap();
		let next = h.submit("still alive").await;

		assert_eq!(h.wait_terminal(ghost).await, JobState::Failure);
		assert_eq!(h.wait_terminal(next).await, JobState::Success);
	}

	#[tokio::test]
	async fn panicking_engine_fails_the_job_not_the_loop() {
		let h = Harness::start(Arc::new(PanickyTranscriber), Arc::new(SrtWriter::new())).await;
		let bad = h.submit("panic").await;
		let good = h.submit("fine").await;

		assert_eq!(h.wait_terminal(bad).await, JobState::Failure);
		assert!(!h.paths.input_path(bad).exists());
		assert!(!h.paths.output_path(bad).exists());
		assert_eq!(h.wait_terminal(good).await, JobState::Success);
		assert!(!h.handle.is_finished());
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn jobs_run_one_at_a_time_in_fifo_order() {
		let engine = Arc::new(RecordingTranscriber {
			delay: Duration::from_millis(20),
			..RecordingTranscriber::default()
		});
		let h = Harness::start(engine.clone(), Arc::new(SrtWriter::new())).await;

		let mut ids = Vec::new();
		for i in 0..4 {
			ids.push(h.submit(&format!("job {i}")).await);
		}
		for &id in &ids {
			assert_eq!(h.wait_terminal(id).await, JobState::Success);
		}

		assert_eq!(engine.peak.load(Ordering::SeqCst), 1);

		let expected: Vec<Event> = ids
			.iter()
			.flat_map(|&id| {
				let input = h.paths.input_path(id);
				[Event::Start(input.clone()), Event::End(input)]
			})
			.collect();
		assert_eq!(*engine.events.lock().unwrap(), expected);
	}

	#[tokio::test]
	async fn cancellation_drains_queued_jobs() {
		let engine = Arc::new(RecordingTranscriber {
			delay: Duration::from_millis(200),
			..RecordingTranscriber::default()
		});
		let h = Harness::start(engine.clone(), Arc::new(SrtWriter::new())).await;

		let first = h.submit("first").await;
		// let the worker pick up the first job before queueing the rest
		for _ in 0..100 {
			if !engine.events.lock().unwrap().is_empty() {
				break;
			}
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
		let queued = [h.submit("second").await, h.submit("third").await];

		h.token.cancel();
		h.handle.await.unwrap();

		assert_eq!(h.registry.get(first).await.unwrap().state, JobState::Success);
		for id in queued {
			assert_eq!(h.registry.get(id).await.unwrap().state, JobState::Failure);
			assert!(!h.paths.input_path(id).exists());
		}
		assert!(h.tx.enqueue(Job::new(JobId::new(), PathBuf::from("late"))).is_err());
	}
}
