use crate::domain::model::Category;
use crate::domain::ports::RegistryLookup;
use crate::utils::error::{IcpError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

const MAX_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Outer resilience retry around any [`RegistryLookup`].
///
/// Retries blindly on every error kind, with a fixed delay between
/// attempts. Stale-token recovery happens one layer below, inside the
/// query engine; the two bounds answer different failure classes and are
/// deliberately kept separate.
pub struct Retryer<Q: RegistryLookup> {
    inner: Q,
    max_attempts: u32,
    delay: Duration,
}

impl<Q: RegistryLookup> Retryer<Q> {
    pub fn new(inner: Q) -> Self {
        Self::with_policy(inner, MAX_ATTEMPTS, RETRY_DELAY)
    }

    /// Policy override used by tests.
    pub fn with_policy(inner: Q, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts,
            delay,
        }
    }
}

#[async_trait]
impl<Q: RegistryLookup> RegistryLookup for Retryer<Q> {
    async fn lookup(&mut self, target: &str, category: Category) -> Result<Vec<String>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.inner.lookup(target, category).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(IcpError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "attempt {}/{} failed [{}][{}]: {}",
                        attempt,
                        self.max_attempts,
                        target,
                        category,
                        e
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}
