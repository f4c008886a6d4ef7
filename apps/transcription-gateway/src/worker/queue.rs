use crate::job::Job;
use crate::metrics::QUEUE_DEPTH;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum QueueError {
	/// The worker has shut down. The job is handed back untouched.
	#[error("Job queue is closed")]
	Closed(Box<Job>),
}

/// FIFO hand-off from upload handlers to the single worker.
///
/// Unbounded on purpose: an upload never waits for the worker and a job is never dropped.
/// The receiver can be taken exactly once, which is what keeps the worker single.
pub struct JobQueue {
	tx: JobSender,
	rx: Option<JobReceiver>,
}

impl JobQueue {
	#[must_use]
	pub fn new() -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		let depth = Arc::new(AtomicUsize::new(0));

		Self {
			tx: JobSender { tx, depth: Arc::clone(&depth) },
			rx: Some(JobReceiver { rx, depth }),
		}
	}

	/// Get a sender handle (for producers)
	#[must_use]
	pub fn sender(&self) -> JobSender {
		self.tx.clone()
	}

	/// Take the receiver (for the worker - can only be called once)
	pub fn take_receiver(&mut self) -> Option<JobReceiver> {
		self.rx.take()
	}
}

impl Default for JobQueue {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone, Debug)]
pub struct JobSender {
	tx: mpsc::UnboundedSender<Job>,
	depth: Arc<AtomicUsize>,
}

impl JobSender {
	/// Non-blocking enqueue. Returns the queue depth after the push.
	///
	/// # Errors
	/// [`QueueError::Closed`] with the job if the receiver is gone or closed.
	pub fn enqueue(&self, job: Job) -> Result<usize, QueueError> {
		let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;

		match self.tx.send(job) {
			Ok(()) => {
				QUEUE_DEPTH.set(gauge_value(depth));
				Ok(depth)
			}
			Err(mpsc::error::SendError(job)) => {
				self.depth.fetch_sub(1, Ordering::SeqCst);
				Err(QueueError::Closed(Box::new(job)))
			}
		}
	}

	#[must_use]
	pub fn depth(&self) -> usize {
		self.depth.load(Ordering::SeqCst)
	}

	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

#[derive(Debug)]
pub struct JobReceiver {
	rx: mpsc::UnboundedReceiver<Job>,
	depth: Arc<AtomicUsize>,
}

impl JobReceiver {
	/// Wait for the next job. `None` once every sender is gone and the buffer is empty.
	pub async fn recv(&mut self) -> Option<Job> {
		let job = self.rx.recv().await?;
		self.dequeued();
		Some(job)
	}

	/// Next buffered job without waiting.
	pub fn try_recv(&mut self) -> Option<Job> {
		let job = self.rx.try_recv().ok()?;
		self.dequeued();
		Some(job)
	}

	/// Refuse further sends; already buffered jobs stay readable.
	pub fn close(&mut self) {
		self.rx.close();
	}

	#[must_use]
	pub fn depth(&self) -> usize {
		self.depth.load(Ordering::SeqCst)
	}

	fn dequeued(&self) {
		let depth = self.depth.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
		QUEUE_DEPTH.set(gauge_value(depth));
	}
}

fn gauge_value(depth: usize) -> i64 {
	i64::try_from(depth).unwrap_or(i64::MAX)
}
