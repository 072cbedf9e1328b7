//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use pope_bot::application::commands::{build_dispatcher, PopeServices};
use pope_bot::application::errors::{BotError, StorageError};
use pope_bot::application::messaging::CommandDispatcher;
use pope_bot::application::services::{RosterService, RosterStore};
use pope_bot::domain::entities::{Roster, User};
use pope_bot::domain::traits::{Directory, Notifier, Store};
use pope_bot::infrastructure::storage::MemoryStore;

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Remembers every message instead of sending it
#[derive(Default)]
pub struct RecordingNotifier {
    private: Mutex<Vec<(String, String)>>,
    channel: Mutex<Vec<String>>,
    fail_next_to: Mutex<Option<String>>,
}

impl RecordingNotifier {
    /// Make the next private message to `user_id` fail, once
    pub fn fail_next_message_to(&self, user_id: &str) {
        *self.fail_next_to.lock().unwrap() = Some(user_id.to_string());
    }

    pub fn private_messages(&self) -> Vec<(String, String)> {
        self.private.lock().unwrap().clone()
    }

    pub fn messages_to(&self, user_id: &str) -> Vec<String> {
        self.private_messages()
            .into_iter()
            .filter(|(to, _)| to == user_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn channel_messages(&self) -> Vec<String> {
        self.channel.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_private(&self, user_id: &str, text: &str) -> Result<(), BotError> {
        {
            let mut fail_next_to = self.fail_next_to.lock().unwrap();
            if fail_next_to.as_deref() == Some(user_id) {
                *fail_next_to = None;
                return Err(BotError::Network("connection reset".to_string()));
            }
        }
        self.private
            .lock()
            .unwrap()
            .push((user_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_channel(&self, text: &str) -> Result<(), BotError> {
        self.channel.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Directory backed by a fixed set of users
pub struct FixedDirectory {
    users: HashMap<String, User>,
}

impl FixedDirectory {
    pub fn new(users: &[(&str, &str)]) -> Self {
        Self {
            users: users
                .iter()
                .map(|(id, name)| (id.to_string(), User::new(*id).with_name(*name)))
                .collect(),
        }
    }
}

#[async_trait]
impl Directory for FixedDirectory {
    async fn resolve_user_by_name(&self, name: &str) -> Result<Option<User>, BotError> {
        Ok(self.users.values().find(|u| u.name.as_deref() == Some(name)).cloned())
    }

    async fn resolve_user_by_id(&self, id: &str) -> Result<User, BotError> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| BotError::NotFound(id.to_string()))
    }

    async fn describe_channel(&self, channel_id: &str) -> Result<String, BotError> {
        if channel_id.starts_with('D') {
            Ok("Private messaged me".to_string())
        } else {
            Ok(format!("In channel `{}`", channel_id))
        }
    }
}

/// Store whose disk is always broken
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn read_record(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read denied",
        )))
    }

    async fn write_record(&self, _key: &str, _record: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "write denied",
        )))
    }
}

/// Store that reads fine but whose writes always fail
pub struct ReadOnlyStore {
    inner: MemoryStore,
}

impl ReadOnlyStore {
    pub async fn seeded(key: &str, record: &str) -> Self {
        let inner = MemoryStore::new();
        inner.write_record(key, record).await.unwrap();
        Self { inner }
    }
}

#[async_trait]
impl Store for ReadOnlyStore {
    async fn read_record(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read_record(key).await
    }

    async fn write_record(&self, _key: &str, _record: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

pub const USERS: &[(&str, &str)] = &[
    ("U1", "ann"),
    ("U2", "bob"),
    ("U3", "cat"),
    ("U4", "dan"),
    ("U9", "newuser"),
    ("UADMIN", "admin"),
];

/// A dispatcher wired to in-memory collaborators
pub struct Harness {
    pub dispatcher: CommandDispatcher,
    pub notifier: Arc<RecordingNotifier>,
    pub roster: Arc<RosterService>,
    pub store: RosterStore,
}

impl Harness {
    pub async fn with_roster(ids: &[&str]) -> Self {
        Self::build(Arc::new(MemoryStore::new()), ids, false).await
    }

    pub async fn announcing(ids: &[&str]) -> Self {
        Self::build(Arc::new(MemoryStore::new()), ids, true).await
    }

    pub async fn build(store: Arc<dyn Store>, ids: &[&str], announce: bool) -> Self {
        ensure_init();
        let store = RosterStore::new(store, "popes");
        if !ids.is_empty() {
            store
                .save(Roster::from_ids(ids.iter().copied()))
                .await
                .unwrap();
        }
        let roster = Arc::new(RosterService::new(store.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let services = PopeServices {
            roster: roster.clone(),
            notifier: notifier.clone(),
            directory: Arc::new(FixedDirectory::new(USERS)),
            announce,
        };
        Self {
            dispatcher: build_dispatcher(services).unwrap(),
            notifier,
            roster,
            store,
        }
    }

    pub async fn roster_ids(&self) -> Vec<String> {
        self.store.load().await.unwrap().as_slice().to_vec()
    }
}
