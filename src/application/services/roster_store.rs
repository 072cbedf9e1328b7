//! Roster persistence on top of a keyed record [`Store`]

use std::sync::Arc;

use crate::application::errors::StorageError;
use crate::domain::entities::Roster;
use crate::domain::traits::Store;

/// Default key of the roster record
pub const DEFAULT_ROSTER_KEY: &str = "popes";

/// Loads and saves the single roster record
#[derive(Clone)]
pub struct RosterStore {
    store: Arc<dyn Store>,
    key: String,
}

impl RosterStore {
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the roster, creating an empty record on first use.
    pub async fn load(&self) -> Result<Roster, StorageError> {
        match self.store.read_record(&self.key).await? {
            Some(record) => Ok(serde_json::from_str(&record)?),
            None => {
                tracing::info!(key = %self.key, "No roster record found, initializing an empty one");
                self.save(Roster::new()).await
            }
        }
    }

    /// Replace the stored roster with `roster`.
    pub async fn save(&self, roster: Roster) -> Result<Roster, StorageError> {
        let record = serde_json::to_string(&roster)?;
        self.store.write_record(&self.key, &record).await?;
        tracing::debug!(key = %self.key, record = %record, "Roster saved");
        Ok(roster)
    }
}
