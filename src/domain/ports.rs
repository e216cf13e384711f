use crate::domain::model::{Category, Credential};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Supplier of the short-lived auth credential.
///
/// `ensure` returns a cached credential when it is still fresh and
/// refreshes it over the network otherwise. `invalidate` drops the cache
/// so the next `ensure` is forced to refresh.
#[async_trait]
pub trait CredentialProvider: Send {
    async fn ensure(&mut self) -> Result<Credential>;
    fn invalidate(&mut self);
}

/// One registry lookup for a (target, category) pair.
///
/// An empty list is a valid "no registration found" result, distinct from
/// an `Err`. Implemented by the query engine and by the retry wrapper, so
/// the batch orchestrator is generic over either.
#[async_trait]
pub trait RegistryLookup: Send {
    async fn lookup(&mut self, target: &str, category: Category) -> Result<Vec<String>>;
}
