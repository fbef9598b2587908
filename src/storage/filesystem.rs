use super::{ObjectStore, error::StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Object store laid out as `root/bucket/key` on the local filesystem.
#[derive(Debug)]
pub struct FileSystemObjectStore {
    root: PathBuf,
}

impl FileSystemObjectStore {
    pub async fn connect(root: &str) -> Result<Self, StorageError> {
        let root = PathBuf::from(root);
        tokio::fs::create_dir_all(&root).await?;
        debug!("Filesystem object store rooted at {}", root.display());
        Ok(Self { root })
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(bucket).join(key);
        // Keys come from metric identifiers, keep them inside the root
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::operation_failed(
                "resolve",
                bucket,
                key,
                "key escapes the store root",
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FileSystemObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write aside then rename, so readers never see a half-written bucket
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &body).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}
