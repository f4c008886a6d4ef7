use crate::job::{Job, JobId, JobState};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
	#[error("Job not found: {0}")]
	NotFound(JobId),

	#[error("Job {id} cannot move from {from} to {to}")]
	InvalidTransition { id: JobId, from: JobState, to: JobState },
}

/// Outcome of a consuming lookup.
#[derive(Debug)]
pub enum Lookup {
	/// Never registered, or already consumed by an earlier poll.
	NotFound,
	/// Still waiting in the queue or being processed. Nothing was removed.
	Pending,
	/// Terminal success. The entry has been removed.
	Succeeded(Job),
	/// Terminal failure. The entry has been removed.
	Failed(Job),
}

/// Authoritative store of job records.
///
/// Every operation holds the one lock for its whole duration, so no caller ever observes a
/// half-applied mutation. `take_if_terminal` is the read-and-remove pair that makes result
/// delivery exactly-once under concurrent polls.
#[derive(Debug, Default)]
pub struct JobRegistry {
	jobs: Mutex<HashMap<JobId, Job>>,
}

impl JobRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// # Errors
	/// [`RegistryError::NotFound`] if `id` is not registered.
	pub async fn get(&self, id: JobId) -> Result<Job, RegistryError> {
		self.jobs.lock().await.get(&id).cloned().ok_or(RegistryError::NotFound(id))
	}

	pub async fn set(&self, id: JobId, job: Job) {
		self.jobs.lock().await.insert(id, job);
	}

	/// # Errors
	/// [`RegistryError::NotFound`] if `id` is not registered.
	pub async fn remove(&self, id: JobId) -> Result<Job, RegistryError> {
		self.jobs.lock().await.remove(&id).ok_or(RegistryError::NotFound(id))
	}

	pub async fn contains(&self, id: JobId) -> bool {
		self.jobs.lock().await.contains_key(&id)
	}

	/// Move a pending job to a terminal state.
	///
	/// # Errors
	/// [`RegistryError::NotFound`] if `id` is gone, [`RegistryError::InvalidTransition`] if the
	/// job is already terminal or `to` is not terminal. The record is left untouched on error.
	pub async fn transition(&self, id: JobId, to: JobState) -> Result<(), RegistryError> {
		let mut jobs = self.jobs.lock().await;
		let job = jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;

		if !job.state.can_transition_to(to) {
			return Err(RegistryError::InvalidTransition { id, from: job.state, to });
		}

		job.state = to;
		drop(jobs);
		Ok(())
	}

	/// Atomically look a job up and, if it has reached a terminal state, remove it.
	pub async fn take_if_terminal(&self, id: JobId) -> Lookup {
		let mut jobs = self.jobs.lock().await;

		match jobs.get(&id).map(|job| job.state) {
			None => Lookup::NotFound,
			Some(JobState::Pending) => Lookup::Pending,
			Some(JobState::Success) => jobs.remove(&id).map_or(Lookup::NotFound, Lookup::Succeeded),
			Some(JobState::Failure) => jobs.remove(&id).map_or(Lookup::NotFound, Lookup::Failed),
		}
	}

	pub async fn len(&self) -> usize {
		self.jobs.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.jobs.lock().await.is_empty()
	}
}
