//! Entry — one raw row returned by the portal, and the settlement rule.
//!
//! Rows are flat maps from vendor field keys to raw string values. The
//! portal uses `"-"` as a sentinel for "not yet settled / not applicable";
//! the settlement rule below is the single place that decides whether a row
//! may be persisted.

use std::collections::HashMap;

use crate::time::{Timestamp, parse_portal};

/// Sentinel value the portal uses for unsettled or absent figures.
pub const SENTINEL: &str = "-";

/// Vendor field keys used by the collector.
pub mod fields {
    /// Slot timestamp of the row.
    pub const TIME: &str = "time";
    /// DCS stop status ( `"-"` while the device is running).
    pub const STOP_STATUS: &str = "stop-stopDcsType";
    /// Flue gas volume, cumulative.
    pub const FLUE_GAS_COU: &str = "a00000-cou";
    /// Dust, cumulative / averaged.
    pub const DUST_COU: &str = "a34013-cou";
    pub const DUST_AVG: &str = "a34013-avg";
    /// SO₂, cumulative / averaged.
    pub const SO2_COU: &str = "a21002-cou";
    pub const SO2_AVG: &str = "a21002-avg";
    /// NOₓ, cumulative / averaged — the settlement-defining metric.
    pub const NOX_COU: &str = "a21026-cou";
    pub const NOX_AVG: &str = "a21026-avg";
}

/// One row fetched from the portal for a device and time window.
///
/// Ephemeral: an entry only lives between fetch and the validate/store
/// decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    values: HashMap<String, String>,
}

impl Entry {
    /// Raw value for a vendor field key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The slot timestamp carried in the row, if present and well-formed.
    #[must_use]
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.get(fields::TIME).and_then(|raw| parse_portal(raw).ok())
    }

    /// Raw slot timestamp string, for logging rows that fail to parse.
    #[must_use]
    pub fn raw_timestamp(&self) -> Option<&str> {
        self.get(fields::TIME)
    }

    /// The settlement-defining metric: the NOₓ cumulative figure if it is
    /// settled, else the NOₓ average, else the sentinel.
    #[must_use]
    pub fn resolved_metric(&self) -> &str {
        for key in [fields::NOX_COU, fields::NOX_AVG] {
            if let Some(value) = self.get(key) {
                if value != SENTINEL {
                    return value;
                }
            }
        }
        SENTINEL
    }

    /// Whether this row is settled and may be stored.
    ///
    /// A row is valid exactly when the resolved metric is not the `"-"`
    /// sentinel. Stop status is deliberately ignored: the portal emits the
    /// sentinel even for stopped devices, so an unsettled row is rejected
    /// regardless of device state and left for the gap scan to re-fetch.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.resolved_metric() != SENTINEL
    }

    /// Borrow all raw values, e.g. for snapshot persistence.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }
}

impl From<HashMap<String, String>> for Entry {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, String)> for Entry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
