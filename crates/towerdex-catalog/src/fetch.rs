//! The data provider seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::key::CollectionKey;

/// Fetches one collection of `T` by key.
///
/// Implementations may fail; the cache in front of them shares one in-flight
/// call per key between all callers.
#[async_trait]
pub trait Fetch<T>: Send + Sync {
    async fn fetch(&self, key: &CollectionKey) -> Result<Vec<T>>;
}
