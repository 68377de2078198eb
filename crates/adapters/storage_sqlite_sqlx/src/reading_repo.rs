//! `SQLite` implementation of [`ReadingRepository`].

use std::collections::BTreeSet;

use sqlx::SqlitePool;

use cems_app::ports::storage::ReadingRepository;
use cems_domain::entry::{Entry, SENTINEL, fields};
use cems_domain::error::CemsError;
use cems_domain::report::ReportType;
use cems_domain::time::{Timestamp, format_portal, parse_portal};
use cems_domain::window::TimeWindow;

use crate::error::StorageError;

const UPSERT: &str = r"
    INSERT INTO {table} (recorded_at, device, stop_status, flue_gas, dust, so2, nox, raw_entry)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (recorded_at, device) DO UPDATE SET
        stop_status = excluded.stop_status,
        flue_gas = excluded.flue_gas,
        dust = excluded.dust,
        so2 = excluded.so2,
        nox = excluded.nox,
        raw_entry = excluded.raw_entry
";

const SELECT_LAST: &str = "SELECT MAX(recorded_at) FROM {table} WHERE device = ?";

const SELECT_IN_WINDOW: &str = r"
    SELECT recorded_at FROM {table}
    WHERE device = ? AND recorded_at >= ? AND recorded_at <= ?
    ORDER BY recorded_at ASC
";

fn table(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Hour => "hour_readings",
        ReportType::Minute => "minute_readings",
        ReportType::Day => "day_readings",
    }
}

/// Substitute the table name into a SQL template. Table names cannot be
/// bound as parameters, and they come from a closed enum, never from input.
fn sql_for(template: &str, report_type: ReportType) -> String {
    template.replace("{table}", table(report_type))
}

/// First settled value among the cumulative and averaged variants of a
/// metric, parsed as a float. Unsettled or absent figures become `NULL`.
fn metric(entry: &Entry, cou_key: &str, avg_key: &str) -> Option<f64> {
    for key in [cou_key, avg_key] {
        if let Some(value) = entry.get(key) {
            if value != SENTINEL {
                return value.parse().ok();
            }
        }
    }
    None
}

/// `SQLite`-backed reading repository.
pub struct SqliteReadingRepository {
    pool: SqlitePool,
}

impl SqliteReadingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReadingRepository for SqliteReadingRepository {
    async fn save_reading(
        &self,
        device: &str,
        entry: &Entry,
        report_type: ReportType,
    ) -> Result<(), CemsError> {
        let recorded_at = entry.timestamp().ok_or(StorageError::MissingTimestamp)?;
        let raw_entry = serde_json::to_string(entry.values()).map_err(StorageError::from)?;

        let stop_status = entry
            .get(fields::STOP_STATUS)
            .filter(|status| *status != SENTINEL);

        sqlx::query(&sql_for(UPSERT, report_type))
            .bind(format_portal(recorded_at))
            .bind(device)
            .bind(stop_status)
            .bind(metric(entry, fields::FLUE_GAS_COU, fields::FLUE_GAS_COU))
            .bind(metric(entry, fields::DUST_COU, fields::DUST_AVG))
            .bind(metric(entry, fields::SO2_COU, fields::SO2_AVG))
            .bind(metric(entry, fields::NOX_COU, fields::NOX_AVG))
            .bind(raw_entry)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn last_timestamp(
        &self,
        device: &str,
        report_type: ReportType,
    ) -> Result<Option<Timestamp>, CemsError> {
        let latest: Option<String> = sqlx::query_scalar(&sql_for(SELECT_LAST, report_type))
            .bind(device)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        match latest {
            Some(raw) => match parse_portal(&raw) {
                Ok(ts) => Ok(Some(ts)),
                Err(err) => {
                    tracing::warn!(device, raw, %err, "stored timestamp is malformed");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn existing_timestamps(
        &self,
        device: &str,
        window: TimeWindow,
        report_type: ReportType,
    ) -> Result<BTreeSet<Timestamp>, CemsError> {
        let rows: Vec<String> = sqlx::query_scalar(&sql_for(SELECT_IN_WINDOW, report_type))
            .bind(device)
            .bind(window.start_str())
            .bind(window.end_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let mut timestamps = BTreeSet::new();
        for raw in rows {
            match parse_portal(&raw) {
                Ok(ts) => {
                    timestamps.insert(ts);
                }
                Err(err) => {
                    tracing::warn!(device, raw, %err, "skipping malformed stored timestamp");
                }
            }
        }
        Ok(timestamps)
    }
}
