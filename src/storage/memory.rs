use super::{ObjectStore, error::StorageError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// One recorded `put` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRecord {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

impl PutRecord {
    pub fn body_json(&self) -> Result<serde_json::Value, StorageError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Object store kept in memory. Every write is recorded in order.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    puts: RwLock<Vec<PutRecord>>,
    failing: AtomicBool,
    failing_put_keys: RwLock<HashSet<String>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object without recording it as a write.
    pub async fn seed(&self, bucket: &str, key: &str, body: Vec<u8>) {
        let mut objects = self.objects.write().await;
        objects.insert((bucket.to_string(), key.to_string()), body);
    }

    pub async fn puts(&self) -> Vec<PutRecord> {
        self.puts.read().await.clone()
    }

    pub async fn clear_puts(&self) {
        self.puts.write().await.clear();
    }

    /// While failing, every call returns an error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every later `put` to `key` fail. Reads are unaffected.
    pub async fn fail_puts_to(&self, key: &str) {
        self.failing_put_keys.write().await.insert(key.to_string());
    }

    fn check_failing(&self, operation: &str, bucket: &str, key: &str) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::operation_failed(
                operation,
                bucket,
                key,
                "simulated failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check_failing("get", bucket, key)?;
        let objects = self.objects.read().await;
        Ok(objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.check_failing("put", bucket, key)?;
        if self.failing_put_keys.read().await.contains(key) {
            return Err(StorageError::operation_failed(
                "put",
                bucket,
                key,
                "simulated write failure",
            ));
        }
        let mut objects = self.objects.write().await;
        let mut puts = self.puts.write().await;
        objects.insert((bucket.to_string(), key.to_string()), body.clone());
        puts.push(PutRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}
