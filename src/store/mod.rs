pub mod file;
pub mod http;
pub mod memory;

use std::collections::BTreeMap;

use crate::RacewatchError;
use crate::session::RawSessionRecord;

pub use file::FileSessionStore;
pub use http::HttpSessionStore;
pub use memory::InMemoryStore;

/// All session records keyed by session id.
pub type RawCatalog = BTreeMap<String, RawSessionRecord>;

/// Read access to the remote store holding the session records.
///
/// The store is read-only from the point of view of racewatch. Implementations are shared between
/// the snapshot cache and the live controller, so they take `&self`.
pub trait SessionStore: Send + Sync {
    /// Fetch every session record.
    ///
    /// An empty store yields an empty map. Failing to reach the store is an error and must never
    /// be reported as an empty map.
    ///
    /// # Errors
    ///
    /// Returns a retrieval error (see [`RacewatchError::is_retrieval`]) when the store cannot be
    /// reached or answers with something that is not a session mapping.
    fn fetch_all(&self) -> Result<RawCatalog, RacewatchError>;

    /// Fetch a single session record, `None` when no such session exists.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::fetch_all`].
    fn fetch_session(&self, id: &str) -> Result<Option<RawSessionRecord>, RacewatchError>;

    /// Human readable location of the store, for logs and banners.
    fn describe(&self) -> String;
}
