//! Lazily readable response bodies
//!
//! The resolver pulls the body one chunk at a time so that declared charsets
//! can be decoded as they stream in, without holding the raw bytes.

use async_trait::async_trait;
use bytes::Bytes;

/// Boxed error produced while reading a body
pub type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// A body that yields its bytes in chunks
#[async_trait]
pub trait BodySource: Send {
    /// Returns the next chunk, or `None` once the body is exhausted
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, BodyError>;
}

#[async_trait]
impl BodySource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, BodyError> {
        Ok(self.chunk().await?)
    }
}

/// In-memory body made of fixed chunks
#[cfg(test)]
pub struct ChunkedBody {
    chunks: std::collections::VecDeque<Bytes>,
}

#[cfg(test)]
impl ChunkedBody {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl BodySource for ChunkedBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, BodyError> {
        Ok(self.chunks.pop_front())
    }
}
