use super::error::StorageError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Blob storage holding the day buckets.
///
/// Objects are only ever replaced as a whole.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Fetches an object. `Ok(None)` means the object does not exist,
    /// any other failure is an error.
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
