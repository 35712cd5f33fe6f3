//! Key-value storage abstractions shared by the session, preference and rate caches.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A named collection of byte keys and values with optional expiry.
///
/// Implementations never fail loudly: read errors surface as a miss and write
/// errors are logged.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>);
    async fn remove(&self, key: &[u8]);
    async fn clear(&self);
}

/// Hands out collections by name, either persisted or in memory.
pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;

    fn remove_collection(&self, name: &str) -> bool;
}

/// Reads a JSON encoded value. Entries that fail to decode are treated as missing.
pub async fn get_json<T: DeserializeOwned>(
    collection: &dyn KeyValueCollection,
    key: &str,
) -> Option<T> {
    let bytes = collection.get(key.as_bytes()).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding unreadable entry for key {}: {}", key, e);
            None
        }
    }
}

/// Writes a value as JSON.
pub async fn put_json<T: Serialize>(
    collection: &dyn KeyValueCollection,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) {
    match serde_json::to_vec(value) {
        Ok(bytes) => collection.put(key.as_bytes(), &bytes, ttl).await,
        Err(e) => debug!("Failed to encode entry for key {}: {}", key, e),
    }
}
