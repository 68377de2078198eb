//! Report types — the granularities the portal can be queried at.

use chrono::Duration;

/// Granularity of a data row.
///
/// `Day` exists in the portal API and is accepted by the client, but the
/// collection engine only schedules hour and minute reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    /// Hourly cumulative report.
    Hour,
    /// Minute-level averaged report.
    Minute,
    /// Daily report.
    Day,
}

impl ReportType {
    /// The numeric-string `dataType` code the portal expects.
    #[must_use]
    pub fn data_type_code(self) -> &'static str {
        match self {
            Self::Hour => "2061",
            Self::Minute => "2051",
            Self::Day => "2031",
        }
    }

    /// Server-side settlement lag for this report type.
    ///
    /// Hour figures are typically published within 5 minutes of the hour
    /// boundary, minute figures within 2 minutes of the minute.
    #[must_use]
    pub fn settlement_delay(self) -> Duration {
        match self {
            Self::Hour | Self::Day => Duration::minutes(5),
            Self::Minute => Duration::minutes(2),
        }
    }

    /// Width of one slot at this granularity.
    #[must_use]
    pub fn slot_duration(self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Minute => Duration::minutes(1),
            Self::Day => Duration::days(1),
        }
    }

    /// Human-readable label used in logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Day => "day",
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_report_types_to_portal_codes() {
        assert_eq!(ReportType::Hour.data_type_code(), "2061");
        assert_eq!(ReportType::Minute.data_type_code(), "2051");
        assert_eq!(ReportType::Day.data_type_code(), "2031");
    }

    #[test]
    fn should_apply_longer_delay_to_hour_reports() {
        assert_eq!(ReportType::Hour.settlement_delay(), Duration::minutes(5));
        assert_eq!(ReportType::Minute.settlement_delay(), Duration::minutes(2));
    }

    #[test]
    fn should_display_label() {
        assert_eq!(ReportType::Hour.to_string(), "hour");
        assert_eq!(ReportType::Minute.to_string(), "minute");
    }
}
