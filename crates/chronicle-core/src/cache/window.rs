//! Weekly issue windows.
//!
//! Cached artifacts are keyed by the Monday that starts the current week.
//! Sunday belongs to the week that started six days earlier.

use chrono::{Datelike, Duration, NaiveDate};

use crate::clock::Clock;

/// Returns the Monday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Returns the window identifier for `date`: `issue_<year>_<month>_<day>`
/// of the week's Monday, without zero padding.
pub fn issue_window_id(date: NaiveDate) -> String {
    let monday = week_start(date);
    format!(
        "issue_{}_{}_{}",
        monday.year(),
        monday.month(),
        monday.day()
    )
}

/// Window identifier for "now" according to the given clock.
pub fn current_window_id(clock: &dyn Clock) -> String {
    issue_window_id(clock.now().date_naive())
}
