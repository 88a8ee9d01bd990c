//! Wall-clock abstraction.

use chrono::{DateTime, Local};

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Formats a date the way panels display it (`M/D/YYYY`).
pub fn display_date(now: DateTime<Local>) -> String {
    now.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_date_has_no_padding() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        assert_eq!(display_date(now), "3/2/2026");
    }
}
