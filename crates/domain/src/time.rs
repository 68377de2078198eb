//! Time and timestamp helpers.
//!
//! The vendor portal works exclusively in local wall-clock time formatted as
//! `YYYY-MM-DD HH:MM:SS`, so the domain uses naive timestamps throughout and
//! formats/parses them with [`format_portal`] and [`parse_portal`].

use chrono::{Duration, Local, NaiveDateTime, Timelike};

/// Wall-clock timestamp as understood by the vendor portal.
pub type Timestamp = NaiveDateTime;

/// Format used by the portal API and the reading store.
pub const PORTAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Return the current local wall-clock time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now().naive_local()
}

/// Truncate a timestamp to the start of its hour.
#[must_use]
pub fn hour_floor(ts: Timestamp) -> Timestamp {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// The most recent hour slot whose data the portal can have settled:
/// the start of the previous hour.
#[must_use]
pub fn latest_settled_hour(now: Timestamp) -> Timestamp {
    hour_floor(now) - Duration::hours(1)
}

/// Format a timestamp in the portal's `YYYY-MM-DD HH:MM:SS` convention.
#[must_use]
pub fn format_portal(ts: Timestamp) -> String {
    ts.format(PORTAL_TIME_FORMAT).to_string()
}

/// Parse a timestamp in the portal's `YYYY-MM-DD HH:MM:SS` convention.
///
/// # Errors
///
/// Returns a [`chrono::ParseError`] when the string does not match the
/// portal format.
pub fn parse_portal(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, PORTAL_TIME_FORMAT)
}

/// All hour slots in `[from, to]`, inclusive, oldest first.
///
/// Both bounds are expected to be hour-aligned; `from > to` yields an
/// empty grid.
#[must_use]
pub fn hour_grid(from: Timestamp, to: Timestamp) -> Vec<Timestamp> {
    let mut slots = Vec::new();
    let mut cursor = from;
    while cursor <= to {
        slots.push(cursor);
        cursor += Duration::hours(1);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn should_floor_to_hour() {
        assert_eq!(hour_floor(ts(11, 37, 42)), ts(11, 0, 0));
        assert_eq!(hour_floor(ts(11, 0, 0)), ts(11, 0, 0));
    }

    #[test]
    fn should_resolve_latest_settled_hour() {
        assert_eq!(latest_settled_hour(ts(11, 37, 0)), ts(10, 0, 0));
        assert_eq!(latest_settled_hour(ts(11, 0, 0)), ts(10, 0, 0));
    }

    #[test]
    fn should_round_trip_portal_format() {
        let slot = ts(9, 5, 0);
        let formatted = format_portal(slot);
        assert_eq!(formatted, "2025-06-01 09:05:00");
        assert_eq!(parse_portal(&formatted).unwrap(), slot);
    }

    #[test]
    fn should_reject_malformed_portal_timestamp() {
        assert!(parse_portal("2025/06/01 09:05").is_err());
    }

    #[test]
    fn should_build_inclusive_hour_grid() {
        let grid = hour_grid(ts(10, 0, 0), ts(13, 0, 0));
        assert_eq!(grid, vec![ts(10, 0, 0), ts(11, 0, 0), ts(12, 0, 0), ts(13, 0, 0)]);
    }

    #[test]
    fn should_build_empty_grid_when_bounds_are_inverted() {
        assert!(hour_grid(ts(13, 0, 0), ts(10, 0, 0)).is_empty());
    }
}
