use crate::error::{GasWatchError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A single upstream able to produce a `T`.
#[async_trait]
pub trait Source<T>: Send + Sync {
    fn name(&self) -> &str;

    /// Upper bound for one attempt against this source.
    fn timeout(&self) -> Duration;

    async fn fetch(&self) -> Result<T>;
}

/// Ordered list of sources tried one after the other until one succeeds.
pub struct FallbackChain<T> {
    sources: Vec<Box<dyn Source<T>>>,
}

impl<T: Send> FallbackChain<T> {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn with_source(mut self, source: impl Source<T> + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the first successful value, or `None` once every source failed.
    /// Failures are logged and never propagated.
    pub async fn resolve(&self) -> Option<T> {
        for source in &self.sources {
            match attempt(source.as_ref()).await {
                Ok(value) => {
                    tracing::debug!(source = source.name(), "Source succeeded");
                    return Some(value);
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Source failed");
                }
            }
        }

        None
    }
}

impl<T: Send> Default for FallbackChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn attempt<T>(source: &dyn Source<T>) -> Result<T> {
    let limit = source.timeout();
    match tokio::time::timeout(limit, source.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(GasWatchError::Timeout {
            provider: source.name().to_string(),
            after: limit,
        }),
    }
}
