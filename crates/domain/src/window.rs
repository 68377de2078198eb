//! Query time windows with settlement-delay compensation.

use chrono::Duration;

use crate::report::ReportType;
use crate::time::{Timestamp, format_portal};

/// A `[start, end]` query window in portal wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    /// Window covering a single slot, padded by the report type's
    /// settlement delay.
    ///
    /// Querying `[slot, slot]` often returns nothing because the portal
    /// settles figures a few minutes after the boundary; the end of the
    /// window is pushed out accordingly.
    #[must_use]
    pub fn for_slot(slot: Timestamp, report_type: ReportType) -> Self {
        Self {
            start: slot,
            end: slot + report_type.settlement_delay(),
        }
    }

    /// Trailing window of `hours` ending at `now`, used for batched minute
    /// synchronization.
    #[must_use]
    pub fn trailing_hours(now: Timestamp, hours: i64) -> Self {
        Self {
            start: now - Duration::hours(hours),
            end: now,
        }
    }

    /// Window start in the portal's string format.
    #[must_use]
    pub fn start_str(&self) -> String {
        format_portal(self.start)
    }

    /// Window end in the portal's string format.
    #[must_use]
    pub fn end_str(&self) -> String {
        format_portal(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn should_pad_hour_slot_by_five_minutes() {
        let window = TimeWindow::for_slot(ts(11, 0), ReportType::Hour);
        assert_eq!(window.start, ts(11, 0));
        assert_eq!(window.end, ts(11, 5));
    }

    #[test]
    fn should_pad_minute_slot_by_two_minutes() {
        let window = TimeWindow::for_slot(ts(11, 30), ReportType::Minute);
        assert_eq!(window.end, ts(11, 32));
    }

    #[test]
    fn should_build_trailing_window() {
        let window = TimeWindow::trailing_hours(ts(12, 15), 2);
        assert_eq!(window.start, ts(10, 15));
        assert_eq!(window.end, ts(12, 15));
    }

    #[test]
    fn should_format_bounds_in_portal_convention() {
        let window = TimeWindow::for_slot(ts(11, 0), ReportType::Hour);
        assert_eq!(window.start_str(), "2025-06-01 11:00:00");
        assert_eq!(window.end_str(), "2025-06-01 11:05:00");
    }
}
