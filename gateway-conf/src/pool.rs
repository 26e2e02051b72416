//! Ordered server pools and auth server failover
//!
//! A pool is filled while the configuration is parsed and read by many
//! threads afterwards. The entries sit behind an `RwLock`; readers clone the
//! `Arc` they need and release the lock immediately, so an entry stays alive
//! for as long as anyone holds it, even if failover moves it in the
//! meantime. Failover takes the write lock and only reorders.

use crate::config::schema::ServerEntry;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Insertion-ordered list of servers serving one role
#[derive(Default)]
pub struct ServerPool {
    entries: RwLock<Vec<Arc<ServerEntry>>>,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ServerEntry>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().map(Arc::new).collect()),
        }
    }

    // Every mutation keeps the vector consistent, so a poisoned lock still
    // guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<ServerEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<ServerEntry>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the tail. Needs exclusive access, which the parser has.
    pub fn push(&mut self, entry: ServerEntry) -> Arc<ServerEntry> {
        let entry = Arc::new(entry);
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&entry));
        entry
    }

    /// The current first server
    pub fn head(&self) -> Option<Arc<ServerEntry>> {
        self.read().first().cloned()
    }

    /// All servers in their current order
    pub fn snapshot(&self) -> Vec<Arc<ServerEntry>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Move `bad` from the head to the tail.
    ///
    /// Does nothing unless `bad` is the very entry currently at the head and
    /// the pool has more than one entry. The relative order of the other
    /// entries is unchanged. Returns true if the pool was rotated.
    pub fn mark_bad(&self, bad: &Arc<ServerEntry>) -> bool {
        let mut entries = self.write();

        let is_head = entries.first().is_some_and(|head| Arc::ptr_eq(head, bad));
        if !is_head || entries.len() < 2 {
            return false;
        }

        let demoted = entries.remove(0);
        debug!(
            "Marking server {} bad, next is {}",
            demoted.hostname, entries[0].hostname
        );
        entries.push(demoted);
        true
    }
}

impl Clone for ServerPool {
    fn clone(&self) -> Self {
        Self {
            entries: RwLock::new(self.snapshot()),
        }
    }
}

impl fmt::Debug for ServerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().iter()).finish()
    }
}

impl Serialize for ServerPool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.snapshot();
        serializer.collect_seq(entries.iter().map(|entry| entry.as_ref()))
    }
}
