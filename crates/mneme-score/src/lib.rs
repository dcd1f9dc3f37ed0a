pub mod catalog;
pub mod patterns;
pub mod render;
pub mod significance;

pub use catalog::{load_catalog, merge_config, FilterCatalog, FilterConfig};
pub use patterns::extract;
pub use render::{insight_record, render_content, session_record, session_tags};
pub use significance::{score, total_lines_changed, Significance, WITHHELD_FILE_REASON};
