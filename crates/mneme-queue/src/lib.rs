pub mod dedup;
pub mod paths;
pub mod queue;

pub use dedup::{is_duplicate, is_duplicate_at, DEDUP_SCAN_LINES};
pub use paths::{default_filters_file, default_queue_file, scripts_dir};
pub use queue::Queue;
