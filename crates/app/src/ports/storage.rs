//! Storage port — repository trait for persisted readings.

use std::collections::BTreeSet;
use std::future::Future;

use cems_domain::entry::Entry;
use cems_domain::error::CemsError;
use cems_domain::report::ReportType;
use cems_domain::time::Timestamp;
use cems_domain::window::TimeWindow;

/// Repository for validated readings, keyed by `(timestamp, device)` per
/// report type.
///
/// Saving an existing key overwrites the stored values (idempotent upsert);
/// there is never more than one reading per key. Downstream consumers
/// (reports, dashboards) read exclusively through this port.
pub trait ReadingRepository: Send + Sync {
    /// Upsert one validated entry for the device.
    ///
    /// The slot timestamp is taken from the entry's `time` field.
    fn save_reading(
        &self,
        device: &str,
        entry: &Entry,
        report_type: ReportType,
    ) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Most recent stored slot timestamp for the device, if any.
    fn last_timestamp(
        &self,
        device: &str,
        report_type: ReportType,
    ) -> impl Future<Output = Result<Option<Timestamp>, CemsError>> + Send;

    /// All stored slot timestamps for the device within `window` (inclusive).
    fn existing_timestamps(
        &self,
        device: &str,
        window: TimeWindow,
        report_type: ReportType,
    ) -> impl Future<Output = Result<BTreeSet<Timestamp>, CemsError>> + Send;
}
