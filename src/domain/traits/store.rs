use async_trait::async_trait;
use crate::application::errors::StorageError;

/// Store trait - keyed record persistence
///
/// `write_record` replaces the whole record; readers never see a partial write.
#[async_trait]
pub trait Store: Send + Sync {
    async fn read_record(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn write_record(&self, key: &str, record: &str) -> Result<(), StorageError>;
}
