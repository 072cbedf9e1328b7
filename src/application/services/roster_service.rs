//! Roster engine - rotation operations with a serialized load/mutate/save cycle

use tokio::sync::Mutex;

use super::RosterStore;
use crate::application::errors::RosterError;
use crate::domain::entities::{Roster, Rotation};

/// Runs every roster operation against the store, one at a time.
///
/// The mutex is held across load and save, so concurrent commands queue up
/// in arrival order instead of overwriting each other's writes.
pub struct RosterService {
    store: RosterStore,
    lock: Mutex<()>,
}

impl RosterService {
    pub fn new(store: RosterStore) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    async fn mutate<T, F>(&self, op: &'static str, f: F) -> Result<(Roster, T), RosterError>
    where
        F: FnOnce(&mut Roster) -> Result<T, RosterError>,
    {
        let _guard = self.lock.lock().await;
        tracing::debug!(op, "Roster mutation started");
        let mut roster = self.store.load().await?;
        let outcome = f(&mut roster)?;
        let roster = self.store.save(roster).await?;
        Ok((roster, outcome))
    }

    /// Add `id` at the back of the queue.
    pub async fn add(&self, id: &str) -> Result<String, RosterError> {
        self.mutate("add", |roster| roster.add(id)).await?;
        Ok(id.to_string())
    }

    /// Remove `id` from the queue.
    pub async fn remove(&self, id: &str) -> Result<String, RosterError> {
        self.mutate("remove", |roster| roster.remove(id)).await?;
        Ok(id.to_string())
    }

    pub async fn cycle(&self) -> Result<Rotation, RosterError> {
        let (_, rotation) = self.mutate("cycle", Roster::cycle).await?;
        Ok(rotation)
    }

    pub async fn defer(&self) -> Result<Rotation, RosterError> {
        let (_, rotation) = self.mutate("defer", Roster::defer).await?;
        Ok(rotation)
    }

    /// Snapshot of the queue; an empty roster is not an error.
    pub async fn list(&self) -> Result<Roster, RosterError> {
        let _guard = self.lock.lock().await;
        Ok(self.store.load().await?)
    }

    /// Id of the current pope.
    pub async fn current(&self) -> Result<String, RosterError> {
        let roster = self.list().await?;
        roster
            .current()
            .map(str::to_string)
            .ok_or(RosterError::EmptyRoster)
    }
}
