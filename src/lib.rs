// Library interface for racewatch
// The dashboard binary and the integration tests both build on these modules

pub mod cache;
pub mod config;
pub mod errors;
pub mod live;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod view;
pub mod writer;

// Re-export commonly used types
pub use cache::SnapshotCache;
pub use config::AppConfig;
pub use errors::RacewatchError;
pub use live::{LiveRefreshController, LiveState, TickOutcome};
pub use session::{SessionCatalog, SessionRecord, SessionStatus};
pub use store::SessionStore;
pub use telemetry::{Sample, SessionStats, TelemetrySeries};
