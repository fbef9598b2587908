use std::sync::Arc;

use anyhow::{Result, bail};

use super::CatalogStore;
use super::json_file::JsonFileCatalogStore;
use super::memory::InMemoryCatalogStore;

pub fn create_catalog_store_from_connection_string(
    connection_string: &str,
) -> Result<Arc<dyn CatalogStore>> {
    Ok(match connection_string {
        s if s.starts_with("memory:") => Arc::new(InMemoryCatalogStore::new()),

        s if s.starts_with("file://") => {
            let path = &s["file://".len()..];
            if path.is_empty() {
                bail!("No path in catalog connection string: {}", s);
            }
            Arc::new(JsonFileCatalogStore::new(path))
        }

        _ => bail!("Unsupported catalog type: {}", connection_string),
    })
}
