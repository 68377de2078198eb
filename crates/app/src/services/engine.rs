//! Collection engine — backfill, minute sync, and the self-healing loop.
//!
//! Devices are processed sequentially within one pass; the engine is a
//! single perpetual control loop per process. Failed or unsettled slots are
//! never retried in-call — the next healing pass re-fetches exactly the
//! slots that are still missing.

use std::time::Duration as StdDuration;

use chrono::Duration;
use rand::Rng as _;

use cems_domain::device::{Device, DeviceRegistry};
use cems_domain::report::ReportType;
use cems_domain::time::{Timestamp, format_portal, hour_floor, hour_grid, latest_settled_hour, now};
use cems_domain::window::TimeWindow;

use crate::ports::data_client::{DataClient, FetchError};
use crate::ports::storage::ReadingRepository;
use crate::ports::token_provider::TokenProvider;

/// Scheduling knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How far back `sync_hourly` starts when a device has no stored data.
    pub backfill_hours: i64,
    /// Width of the self-healing scan window.
    pub heal_window_hours: i64,
    /// Width of the batched minute-sync window.
    pub minute_window_hours: i64,
    /// Minimum spacing between minute syncs inside the healing loop.
    pub minute_sync_interval: StdDuration,
    /// Bounds of the randomized sleep between healing iterations. The
    /// jitter keeps the polling rhythm from looking machine-generated to
    /// the portal's anti-scraping heuristics.
    pub idle_secs: (u64, u64),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backfill_hours: 24,
            heal_window_hours: 48,
            minute_window_hours: 2,
            minute_sync_interval: StdDuration::from_secs(180),
            idle_secs: (60, 300),
        }
    }
}

/// Orchestrates token lifecycle, data client, settlement validation, and the
/// reading store across all configured devices.
pub struct CollectionEngine<P, C, R> {
    tokens: P,
    client: C,
    store: R,
    devices: DeviceRegistry,
    config: EngineConfig,
}

impl<P, C, R> CollectionEngine<P, C, R>
where
    P: TokenProvider,
    C: DataClient,
    R: ReadingRepository,
{
    /// Create an engine over the given ports and device registry.
    pub fn new(tokens: P, client: C, store: R, devices: DeviceRegistry) -> Self {
        Self::with_config(tokens, client, store, devices, EngineConfig::default())
    }

    /// Create an engine with explicit scheduling knobs.
    pub fn with_config(
        tokens: P,
        client: C,
        store: R,
        devices: DeviceRegistry,
        config: EngineConfig,
    ) -> Self {
        Self {
            tokens,
            client,
            store,
            devices,
            config,
        }
    }

    /// Fetch one slot for one device and store it if it is settled.
    ///
    /// On an auth rejection the token is force-refreshed exactly once and
    /// the fetch retried exactly once. Returns `false` on any failure; an
    /// unsettled row is left for the healing scan, never retried here.
    pub async fn fetch_and_store(
        &self,
        slot: Timestamp,
        device: &Device,
        report_type: ReportType,
    ) -> bool {
        let window = TimeWindow::for_slot(slot, report_type);
        let slot_str = format_portal(slot);

        let Some(token) = self.tokens.access_token(false).await else {
            tracing::error!(device = %device.name, slot = %slot_str, "no access token available");
            return false;
        };

        let rows = match self.client.fetch(&token, device, window, report_type).await {
            Ok(rows) => rows,
            Err(FetchError::AuthRejected) => {
                tracing::warn!(
                    device = %device.name,
                    slot = %slot_str,
                    "credential rejected, forcing token refresh"
                );
                let Some(fresh) = self.tokens.access_token(true).await else {
                    tracing::error!("forced token refresh failed, check account status");
                    return false;
                };
                match self.client.fetch(&fresh, device, window, report_type).await {
                    Ok(rows) => rows,
                    Err(err) => {
                        tracing::warn!(device = %device.name, slot = %slot_str, %err, "retry after refresh failed");
                        return false;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(device = %device.name, slot = %slot_str, %err, "fetch failed");
                return false;
            }
        };

        let Some(entry) = rows.into_iter().next() else {
            tracing::debug!(device = %device.name, slot = %slot_str, "no data published yet");
            return false;
        };

        if !entry.is_settled() {
            tracing::warn!(
                device = %device.name,
                slot = %slot_str,
                report = %report_type,
                "metric not settled yet, leaving slot for the healing scan"
            );
            return false;
        }

        match self.store.save_reading(&device.name, &entry, report_type).await {
            Ok(()) => {
                tracing::info!(device = %device.name, slot = %slot_str, report = %report_type, "reading stored");
                true
            }
            Err(err) => {
                tracing::error!(device = %device.name, slot = %slot_str, %err, "failed to store reading");
                false
            }
        }
    }

    /// Walk each device's hourly history forward from its last stored slot.
    pub async fn sync_hourly(&self) {
        self.sync_hourly_at(now()).await;
    }

    async fn sync_hourly_at(&self, now: Timestamp) {
        tracing::info!("checking hourly history completeness");
        let latest = latest_settled_hour(now);

        for device in self.devices.iter() {
            let last = match self.store.last_timestamp(&device.name, ReportType::Hour).await {
                Ok(last) => last,
                Err(err) => {
                    tracing::error!(device = %device.name, %err, "failed to read last stored hour");
                    continue;
                }
            };

            let resume_from = last.unwrap_or(latest - Duration::hours(self.config.backfill_hours));
            let mut slot = resume_from + Duration::hours(1);

            while slot <= latest {
                if self.fetch_and_store(slot, device, ReportType::Hour).await {
                    slot += Duration::hours(1);
                } else {
                    // The portal has not published this slot yet; walking
                    // further would only produce a run of empty fetches.
                    tracing::warn!(
                        device = %device.name,
                        slot = %format_portal(slot),
                        "hourly backfill interrupted, resuming next pass"
                    );
                    break;
                }
            }
        }
    }

    /// Batched minute sync over the trailing window; returns the number of
    /// rows stored across all devices.
    pub async fn sync_minutes(&self) -> usize {
        self.sync_minutes_at(now()).await
    }

    async fn sync_minutes_at(&self, now: Timestamp) -> usize {
        let window = TimeWindow::trailing_hours(now, self.config.minute_window_hours);
        tracing::info!(
            from = %window.start_str(),
            to = %window.end_str(),
            "syncing minute readings"
        );

        let Some(token) = self.tokens.access_token(false).await else {
            tracing::error!("no access token available for minute sync");
            return 0;
        };

        let mut total = 0;
        for device in self.devices.iter() {
            let rows = match self
                .client
                .fetch(&token, device, window, ReportType::Minute)
                .await
            {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::warn!(device = %device.name, %err, "minute fetch failed");
                    continue;
                }
            };

            if rows.is_empty() {
                tracing::warn!(device = %device.name, "no minute rows in window");
                continue;
            }

            let fetched = rows.len();
            let mut stored = 0;
            for entry in rows {
                if !entry.is_settled() {
                    continue;
                }
                match self
                    .store
                    .save_reading(&device.name, &entry, ReportType::Minute)
                    .await
                {
                    Ok(()) => stored += 1,
                    Err(err) => {
                        tracing::error!(
                            device = %device.name,
                            slot = entry.raw_timestamp().unwrap_or("unknown"),
                            %err,
                            "failed to store minute reading"
                        );
                    }
                }
            }
            tracing::info!(device = %device.name, fetched, stored, "minute window processed");
            total += stored;
        }
        total
    }

    /// One self-healing pass: re-fetch every hour slot missing from the
    /// trailing window. Returns the number of slots attempted.
    pub async fn heal_hour_gaps(&self) -> usize {
        self.heal_hour_gaps_at(now()).await
    }

    async fn heal_hour_gaps_at(&self, now: Timestamp) -> usize {
        let anchor = hour_floor(now);
        let window = TimeWindow {
            start: anchor - Duration::hours(self.config.heal_window_hours),
            // Anything older than an hour should have settled by now.
            end: anchor - Duration::hours(1),
        };

        let mut attempted = 0;
        for device in self.devices.iter() {
            let existing = match self
                .store
                .existing_timestamps(&device.name, window, ReportType::Hour)
                .await
            {
                Ok(existing) => existing,
                Err(err) => {
                    tracing::error!(device = %device.name, %err, "failed to list stored hours");
                    continue;
                }
            };

            for slot in hour_grid(window.start, window.end) {
                if existing.contains(&slot) {
                    continue;
                }
                tracing::info!(
                    device = %device.name,
                    slot = %format_portal(slot),
                    "hourly gap detected, re-fetching"
                );
                attempted += 1;
                self.fetch_and_store(slot, device, ReportType::Hour).await;
            }
        }
        attempted
    }

    /// Run the collection service forever.
    ///
    /// Performs one hourly backfill and one minute sync up front, then loops:
    /// heal hourly gaps, re-run the minute sync when due, and sleep a
    /// randomized interval.
    pub async fn run(&self) -> ! {
        self.sync_hourly().await;
        self.sync_minutes().await;

        let mut last_minute_sync = std::time::Instant::now();
        tracing::info!("collection service started, entering gap-driven healing loop");

        loop {
            self.heal_hour_gaps().await;

            if last_minute_sync.elapsed() >= self.config.minute_sync_interval {
                self.sync_minutes().await;
                last_minute_sync = std::time::Instant::now();
            }

            let (min, max) = self.config.idle_secs;
            let wait = rand::thread_rng().gen_range(min..=max);
            tracing::info!(wait_secs = wait, "healing pass complete, sleeping");
            tokio::time::sleep(StdDuration::from_secs(wait)).await;
        }
    }
}
