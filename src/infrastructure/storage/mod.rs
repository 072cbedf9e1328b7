//! Record storage implementations

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::Store;

/// One JSON file per record: `<base_path>/<key>.json`
pub struct JsonFileStore {
    base_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid record key '{}'", key),
            )));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn read_record(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_record(&self, key: &str, record: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        tokio::fs::create_dir_all(&self.base_path).await?;

        // Write beside the record, then swap it in, so a crash mid-write
        // leaves the previous record intact.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, record).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-memory store, for tests and throwaway console sessions
#[derive(Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read_record(&self, key: &str) -> Result<Option<String>, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn write_record(&self, key: &str, record: &str) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), record.to_string());
        Ok(())
    }
}
