#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Response decoder and row validator.
pub mod decode;
/// CSV export.
pub mod export;
/// Report data model.
pub mod model;
/// Participation and camera roster lookups.
pub mod praise;
/// Terminal rendering.
pub mod render;
/// Roster ordering and Vietnamese collation.
pub mod sort;

pub use decode::{DecodeOptions, decode_report, decode_value};
pub use export::{to_csv, write_csv};
pub use model::{FeedbackCategory, GradingReport, GradingResult, Rank};
pub use praise::{CameraStatus, camera_status, is_praised};
pub use render::render_report;
pub use sort::{SortKey, SortOrder, SortPolicy, collate_vi};
