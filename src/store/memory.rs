use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RawCatalog, SessionStore};
use crate::RacewatchError;
use crate::session::{RawSessionRecord, SessionStatus};

/// In-process session store, used for demos and tests.
///
/// It counts fetches and can simulate an outage, which makes cache and live refresh behaviour
/// observable.
#[derive(Default)]
pub struct InMemoryStore {
    races: Mutex<RawCatalog>,
    unreachable: AtomicBool,
    full_fetches: AtomicUsize,
    session_fetches: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn races(&self) -> MutexGuard<'_, RawCatalog> {
        self.races.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, id: &str, record: RawSessionRecord) {
        self.races().insert(id.to_string(), record);
    }

    pub fn remove(&self, id: &str) -> Option<RawSessionRecord> {
        self.races().remove(id)
    }

    /// Change the status of a stored session. Returns false when the session does not exist.
    pub fn set_status(&self, id: &str, status: SessionStatus) -> bool {
        match self.races().get_mut(id) {
            Some(record) => {
                record.status = Some(status.as_str().to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of `fetch_all` calls so far, failed ones included.
    pub fn full_fetches(&self) -> usize {
        self.full_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_session` calls so far, failed ones included.
    pub fn session_fetches(&self) -> usize {
        self.session_fetches.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), RacewatchError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RacewatchError::StoreUnreachable {
                url: self.describe(),
                reason: "simulated outage".to_string(),
            });
        }
        Ok(())
    }
}

impl SessionStore for InMemoryStore {
    fn fetch_all(&self) -> Result<RawCatalog, RacewatchError> {
        self.full_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.races().clone())
    }

    fn fetch_session(&self, id: &str) -> Result<Option<RawSessionRecord>, RacewatchError> {
        self.session_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.races().get(id).cloned())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_fetches() {
        let store = InMemoryStore::new();
        store.insert("a", RawSessionRecord::new("TEST", SessionStatus::Live));
        assert_eq!(store.fetch_all().unwrap().len(), 1);
        assert!(store.fetch_session("a").unwrap().is_some());
        assert!(store.fetch_session("b").unwrap().is_none());
        assert_eq!(store.full_fetches(), 1);
        assert_eq!(store.session_fetches(), 2);
    }

    #[test]
    fn test_simulated_outage() {
        let store = InMemoryStore::new();
        store.set_unreachable(true);
        assert!(store.fetch_all().unwrap_err().is_retrieval());
        store.set_unreachable(false);
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_set_status() {
        let store = InMemoryStore::new();
        store.insert("a", RawSessionRecord::new("TEST", SessionStatus::Live));
        assert!(store.set_status("a", SessionStatus::Finished));
        assert!(!store.set_status("b", SessionStatus::Finished));
        let record = store.fetch_session("a").unwrap().unwrap();
        assert_eq!(record.status.as_deref(), Some("FINISHED"));
    }
}
