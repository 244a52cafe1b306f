//! Job queue interface
//!
//! The scraper consumes URLs from an external queue through a blocking pop
//! with an idle timeout. An idle timeout is the normal way a run ends; every
//! other queue failure is fatal to the worker.

mod redis_queue;

pub use redis_queue::RedisQueue;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a job queue
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// A source of URL jobs
#[async_trait]
pub trait JobQueue: Send {
    /// Blocks for up to `timeout` waiting for the next URL
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - A job was popped
    /// * `Ok(None)` - No job arrived within `timeout`
    /// * `Err(QueueError)` - The queue is unusable
    async fn pop(&mut self, timeout: Duration) -> Result<Option<String>, QueueError>;
}
