use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolves the name of the object-store bucket backing the status page.
#[async_trait]
pub trait StackResolver: Send + Sync + Debug {
    async fn status_page_bucket_name(&self) -> Result<String>;
}

/// Resolver returning a configured name. Counts how often it is asked.
#[derive(Debug)]
pub struct StaticStackResolver {
    bucket_name: String,
    calls: AtomicUsize,
}

impl StaticStackResolver {
    pub fn new(bucket_name: &str) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StackResolver for StaticStackResolver {
    async fn status_page_bucket_name(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bucket_name.clone())
    }
}
