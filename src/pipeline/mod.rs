//! Pipeline entry points.
//!
//! - `detect`: decide which observed notices are new and record them
//! - `check`: one full collect, summarise and notify pass

pub mod check;
pub mod detect;

pub use check::{CONTENT_UNAVAILABLE, Pipeline};
pub use detect::{ChangeDetector, Detection, unseen};
