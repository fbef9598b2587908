use super::CatalogStore;
use crate::datamodel::Metric;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Catalog stored as a JSON array of metrics in a single file.
#[derive(Debug)]
pub struct JsonFileCatalogStore {
    path: PathBuf,
    // Serialises read-modify-write cycles of `put`
    write_lock: Mutex<()>,
}

impl JsonFileCatalogStore {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Metric>> {
        match tokio::fs::read(&self.path).await {
            Ok(body) => serde_json::from_slice(&body)
                .with_context(|| format!("Failed to parse catalog {}", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read catalog {}", self.path.display())),
        }
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalogStore {
    async fn get_all(&self) -> Result<Vec<Metric>> {
        self.load().await
    }

    async fn get_by_id(&self, metric_id: &str) -> Result<Vec<Metric>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|metric| metric.metric_id == metric_id)
            .collect())
    }

    async fn put(&self, metric: &Metric) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut metrics = self.load().await?;
        metrics.retain(|m| m.metric_id != metric.metric_id);
        metrics.push(metric.clone());
        metrics.sort_by(|a, b| a.order.cmp(&b.order).then(a.metric_id.cmp(&b.metric_id)));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_vec_pretty(&metrics)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write catalog {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::MetricType;

    #[tokio::test]
    async fn test_missing_file_is_an_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let store = JsonFileCatalogStore::new(path.to_str().unwrap());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/metrics.json");
        let store = JsonFileCatalogStore::new(path.to_str().unwrap());

        let b = Metric::new("b".to_string(), MetricType::Datadog, "B".to_string()).with_order(2);
        let a = Metric::new("a".to_string(), MetricType::Pingdom, "A".to_string()).with_order(1);
        store.put(&b).await.unwrap();
        store.put(&a).await.unwrap();

        let reopened = JsonFileCatalogStore::new(path.to_str().unwrap());
        let all = reopened.get_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|m| m.metric_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(reopened.get_by_id("b").await.unwrap()[0].metric_type, MetricType::Datadog);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileCatalogStore::new(path.to_str().unwrap());
        assert!(store.get_all().await.is_err());
    }
}
