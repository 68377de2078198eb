//! Device — a monitored boiler and its remote port identifier.

use std::collections::HashMap;

use crate::error::CemsError;

/// A monitored device as configured by the operator.
///
/// `name` is the operator-facing logical name used as the storage key;
/// `port_id` is the opaque identifier the portal expects in queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Logical name, unique within the registry (e.g. `NORTH_1`).
    pub name: String,
    /// Remote port identifier (opaque hex string from the portal).
    pub port_id: String,
}

impl Device {
    /// Create a device record.
    #[must_use]
    pub fn new(name: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port_id: port_id.into(),
        }
    }
}

/// Fixed set of devices the collector is responsible for.
///
/// Iteration order is the configuration order; nothing in the engine
/// depends on it.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Build a registry from `name -> port_id` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CemsError::Config`] when the registry is empty, a name or
    /// port id is blank, or a name appears twice.
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Result<Self, CemsError> {
        let mut devices = Vec::new();
        let mut seen: HashMap<String, ()> = HashMap::new();

        for (name, port_id) in pairs {
            if name.trim().is_empty() || port_id.trim().is_empty() {
                return Err(CemsError::Config(
                    "device name and port id must be non-empty".to_string(),
                ));
            }
            if seen.insert(name.clone(), ()).is_some() {
                return Err(CemsError::Config(format!("duplicate device name: {name}")));
            }
            devices.push(Device::new(name, port_id));
        }

        if devices.is_empty() {
            return Err(CemsError::Config("no devices configured".to_string()));
        }

        Ok(Self { devices })
    }

    /// Iterate over all configured devices.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Number of configured devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry is empty (never true for a constructed registry).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, port: &str) -> (String, String) {
        (name.to_string(), port.to_string())
    }

    #[test]
    fn should_build_registry_from_pairs() {
        let registry =
            DeviceRegistry::new([pair("NORTH_1", "6a4d38b9"), pair("SOUTH_2", "4e3f35e9")])
                .unwrap();
        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["NORTH_1", "SOUTH_2"]);
    }

    #[test]
    fn should_reject_empty_registry() {
        let err = DeviceRegistry::new([]).unwrap_err();
        assert!(err.to_string().contains("no devices"));
    }

    #[test]
    fn should_reject_duplicate_names() {
        let err =
            DeviceRegistry::new([pair("NORTH_1", "aa"), pair("NORTH_1", "bb")]).unwrap_err();
        assert!(err.to_string().contains("duplicate device name"));
    }

    #[test]
    fn should_reject_blank_name_or_port() {
        assert!(DeviceRegistry::new([pair(" ", "aa")]).is_err());
        assert!(DeviceRegistry::new([pair("NORTH_1", "")]).is_err());
    }
}
