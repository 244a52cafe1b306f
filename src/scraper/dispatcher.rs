//! Admission-controlled dispatcher
//!
//! This module handles:
//! - Pulling URLs from the job queue with an idle timeout
//! - Bounding concurrent jobs with a semaphore of admission slots
//! - Draining in-flight jobs when the queue goes idle
//!
//! A slot is acquired before the next job is spawned. When every slot is
//! taken the dispatcher stops popping, which is the worker's only
//! backpressure: the queue is drained no faster than jobs complete.

use crate::queue::{JobQueue, QueueError};
use crate::scraper::processor::JobProcessor;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Lower bound on the parallelism used by the slot formula
const MIN_PARALLELISM: usize = 4;

/// Admission slots granted per unit of parallelism
const SLOTS_PER_CPU: usize = 4;

/// Lower bound on the number of admission slots
const MIN_SLOTS: usize = 20;

/// Upper bound on the number of admission slots
pub const MAX_ADMISSION_SLOTS: usize = 10_000;

/// Computes the admission slot count for a given parallelism
///
/// `max(max(parallelism, 4) * 4, 20)`
///
/// # Example
///
/// ```
/// use title_scraper::admission_slots;
///
/// assert_eq!(admission_slots(2), 20);
/// assert_eq!(admission_slots(8), 32);
/// ```
pub fn admission_slots(parallelism: usize) -> usize {
    (parallelism.max(MIN_PARALLELISM) * SLOTS_PER_CPU).max(MIN_SLOTS)
}

/// Admission slot count for this machine
pub fn default_admission_slots() -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    admission_slots(parallelism)
}

/// Something that can run a job to completion
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    /// Runs the job for `url`; failures are handled (logged) internally
    async fn handle(&self, url: String);
}

#[async_trait]
impl JobHandler for JobProcessor {
    async fn handle(&self, url: String) {
        self.run(&url).await;
    }
}

/// Result of a completed dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Number of jobs handed to the handler
    pub dispatched: usize,
}

/// Pulls jobs from a queue and runs them under an admission limit
pub struct Dispatcher<Q> {
    queue: Q,
    handler: Arc<dyn JobHandler>,
    slots: Arc<Semaphore>,
    capacity: usize,
    idle_timeout: Duration,
}

impl<Q: JobQueue> Dispatcher<Q> {
    /// Creates a dispatcher
    ///
    /// # Arguments
    ///
    /// * `queue` - Source of job URLs
    /// * `handler` - Runs each job
    /// * `capacity` - Number of admission slots, clamped to
    ///   `1..=MAX_ADMISSION_SLOTS`
    /// * `idle_timeout` - How long a pop may wait before the loop ends
    pub fn new(
        queue: Q,
        handler: Arc<dyn JobHandler>,
        capacity: usize,
        idle_timeout: Duration,
    ) -> Self {
        let capacity = capacity.clamp(1, MAX_ADMISSION_SLOTS);
        Self {
            queue,
            handler,
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            idle_timeout,
        }
    }

    /// Total number of admission slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Runs the dispatch loop until the queue goes idle
    ///
    /// # Returns
    ///
    /// * `Ok(DispatchSummary)` - The queue stayed empty for the idle timeout
    ///   and every dispatched job has finished
    /// * `Err(QueueError)` - The queue failed; in-flight jobs are not awaited
    pub async fn run(mut self) -> Result<DispatchSummary, QueueError> {
        let mut dispatched = 0;

        loop {
            let url = match self.queue.pop(self.idle_timeout).await? {
                Some(url) => url,
                None => {
                    tracing::info!(
                        "No job seen for {} seconds. Exiting.",
                        self.idle_timeout.as_secs()
                    );
                    break;
                }
            };

            // Blocks while every slot is taken, which also holds back the next pop
            let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await else {
                break;
            };

            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                handler.handle(url).await;
                drop(permit);
            });
            dispatched += 1;

            tracing::trace!(
                dispatched,
                available = self.slots.available_permits(),
                "Dispatched job"
            );
        }

        self.drain().await;

        Ok(DispatchSummary { dispatched })
    }

    /// Waits until every admission slot has been released
    async fn drain(&self) {
        let in_flight = self.capacity - self.slots.available_permits();
        if in_flight > 0 {
            tracing::info!("Waiting for {} in-flight jobs", in_flight);
        }

        let permits = u32::try_from(self.capacity).unwrap_or(u32::MAX);
        let _all = self.slots.acquire_many(permits).await;
    }
}
