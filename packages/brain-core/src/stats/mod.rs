//! Read-only projections over a board's cards.
//!
//! Everything here is recomputed from scratch on each call and takes `today`
//! explicitly so results are reproducible.
pub mod burndown;
pub mod dashboard;
pub mod gantt;

use chrono::NaiveDate;

use crate::dates::Timestamp;

pub use burndown::{burndown, board_burndown, Burndown, BurndownPoint, MAX_WINDOW_DAYS};
pub use dashboard::{summarize, BoardSummary, ListStats};
pub use gantt::{gantt, GanttBar, GanttChart};

/// Calendar day (UTC) of a timestamp.
pub fn day_of(ts: &Timestamp) -> NaiveDate {
    ts.date_naive()
}

/// Percentage `part / whole`, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
