//! Redis list queue
//!
//! Jobs are plain URL strings pushed onto a Redis list by the ingestion step
//! and consumed here with `BLPOP`.

use super::{JobQueue, QueueError};
use crate::config::QueueConfig;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;

/// Job queue backed by a Redis list
pub struct RedisQueue {
    conn: MultiplexedConnection,
    key: String,
}

impl RedisQueue {
    /// Connects to the Redis server described by `config`
    ///
    /// # Returns
    ///
    /// * `Ok(RedisQueue)` - Connected queue
    /// * `Err(QueueError)` - The URL is invalid or the server is unreachable
    pub async fn connect(config: &QueueConfig) -> Result<Self, QueueError> {
        let client = redis::Client::open(config.connection_url())?;
        let conn = client.get_multiplexed_async_connection().await?;

        tracing::info!(host = %config.host, key = %config.key, "Connected to job queue");

        Ok(Self {
            conn,
            key: config.key.clone(),
        })
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn pop(&mut self, timeout: Duration) -> Result<Option<String>, QueueError> {
        // BLPOP takes whole seconds; 0 would block forever
        let seconds = timeout.as_secs().max(1);

        let reply: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(&self.key)
            .arg(seconds)
            .query_async(&mut self.conn)
            .await?;

        Ok(reply.map(|(_, url)| url))
    }
}
