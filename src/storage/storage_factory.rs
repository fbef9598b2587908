use std::sync::Arc;

use anyhow::{Result, bail};

use super::ObjectStore;
use super::filesystem::FileSystemObjectStore;
use super::memory::InMemoryObjectStore;

pub async fn create_object_store_from_connection_string(
    connection_string: &str,
) -> Result<Arc<dyn ObjectStore>> {
    Ok(match connection_string {
        s if s.starts_with("memory:") => Arc::new(InMemoryObjectStore::new()),

        s if s.starts_with("file://") => {
            // file://./data is relative, file:///var/data is absolute
            let root = &s["file://".len()..];
            if root.is_empty() {
                bail!("No path in object store connection string: {}", s);
            }
            Arc::new(FileSystemObjectStore::connect(root).await?)
        }

        _ => bail!("Unsupported object store type: {}", connection_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_connection_string() {
        let store = create_object_store_from_connection_string("memory:")
            .await
            .unwrap();
        assert!(store.get("bucket", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_connection_string() {
        let dir = tempfile::tempdir().unwrap();
        let connection_string = format!("file://{}", dir.path().display());
        let store = create_object_store_from_connection_string(&connection_string)
            .await
            .unwrap();
        store
            .put("bucket", "a/b.json", b"[]".to_vec(), "application/json")
            .await
            .unwrap();
        assert!(dir.path().join("bucket/a/b.json").exists());
    }

    #[tokio::test]
    async fn test_unsupported_connection_string() {
        let result = create_object_store_from_connection_string("s3://bucket").await;
        assert!(result.is_err());
    }
}
