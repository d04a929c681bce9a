//! Dependency injection for the collaborators the lending core talks to.
//!
//! All external dependencies are abstracted behind traits and bundled in a
//! [`LendingEnvironment`] handed to the controller. Production code uses
//! [`SystemClock`] and a real store; tests swap in fixed clocks and recording
//! stores.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::{ItemId, Requester};

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Supplies authenticated requester references.
///
/// Credential storage lives behind this trait; the core only sees the
/// resulting [`Requester`].
pub trait IdentityProvider: Send + Sync {
    /// Resolves `identifier` (email or student id) and optional `secret` to a
    /// requester, or `None` if the provider refuses
    fn authenticate(&self, identifier: &str, secret: Option<&str>) -> Option<Requester>;
}

/// Source of valid item ids and their initial stock
pub trait Catalog: Send + Sync {
    /// Every item with its starting count
    fn stock(&self) -> Vec<(ItemId, u32)>;
}

/// Catalog backed by a fixed list
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    entries: Vec<(ItemId, u32)>,
}

impl StaticCatalog {
    /// Creates a catalog from `(item, count)` pairs
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<ItemId>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(item, count)| (item.into(), count))
                .collect(),
        }
    }
}

impl Catalog for StaticCatalog {
    fn stock(&self) -> Vec<(ItemId, u32)> {
        self.entries.clone()
    }
}

/// Return reminder handed to the persistence collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Requester display name
    pub user: String,
    /// Borrowed items
    pub items: Vec<ItemId>,
    /// Borrow date as entered by the requester
    pub borrow_date: String,
    /// Promised return date as entered by the requester
    pub return_date: String,
}

/// Durable storage for reminders
pub trait ReminderStore: Send + Sync {
    /// Persists one reminder.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record could not be stored.
    fn save(&self, reminder: Reminder) -> Result<(), StoreError>;

    /// Every stored reminder in insertion order
    fn list(&self) -> Vec<Reminder>;
}

/// Reminder store kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct InMemoryReminderStore {
    reminders: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReminderStore for InMemoryReminderStore {
    fn save(&self, reminder: Reminder) -> Result<(), StoreError> {
        let mut guard = self
            .reminders
            .lock()
            .map_err(|_| StoreError::Persist("reminder lock poisoned".to_string()))?;
        guard.push(reminder);
        Ok(())
    }

    fn list(&self) -> Vec<Reminder> {
        self.reminders
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Environment dependencies for the lifecycle controller
#[derive(Clone)]
pub struct LendingEnvironment {
    /// Clock for request and receipt timestamps
    pub clock: Arc<dyn Clock>,
    /// Where reminders are handed off
    pub reminders: Arc<dyn ReminderStore>,
}

impl LendingEnvironment {
    /// Creates a new `LendingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, reminders: Arc<dyn ReminderStore>) -> Self {
        Self { clock, reminders }
    }
}

impl Default for LendingEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(InMemoryReminderStore::new()))
    }
}

impl std::fmt::Debug for LendingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LendingEnvironment")
            .field("clock", &"<dyn Clock>")
            .field("reminders", &"<dyn ReminderStore>")
            .finish()
    }
}
