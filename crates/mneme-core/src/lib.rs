pub mod hash;
pub mod record;
pub mod snapshot;
pub mod types;

pub use hash::content_fingerprint;
pub use record::{now_rfc3339, parse_timestamp, MemoryRecord};
pub use snapshot::{load_snapshot, SessionInfo, SessionSnapshot, SnapshotError, NO_BRANCH};
pub use types::*;
