//! ---
//! flk_section: "01-core-functionality"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Shared primitives and utilities for the bridge runtime."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
//! Vehicle identity and the per-vehicle topic namespace.
//!
//! The identifier is validated once at startup; everything derived from it
//! (client ids, topic names) can then assume it is topic-safe.

use std::fmt;

use crate::ConfigError;

/// Characters that may never appear in a vehicle identifier. `/` would add
/// topic levels, `+` and `#` are MQTT filter wildcards, and NUL is rejected
/// by brokers outright.
const FORBIDDEN_CHARS: &[char] = &['/', '+', '#', '\0'];

/// Validated vehicle identifier taken from the `VIN` environment variable.
///
/// Construction fails for blank identifiers and for identifiers containing
/// whitespace or topic metacharacters, so an unset variable can never leak
/// into the topic namespace as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleId(String);

impl VehicleId {
    /// Validate and normalise a raw identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingVehicleId);
        }
        if let Some(character) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(c))
        {
            return Err(ConfigError::InvalidVehicleId {
                id: trimmed.to_owned(),
                character,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Topic namespace scoping all bridge traffic to one vehicle.
///
/// Rendered as `vehicle/{id}`. Built once at startup and immutable for the
/// process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleNamespace(String);

impl VehicleNamespace {
    /// Derive the namespace for a validated vehicle identifier.
    pub fn new(vehicle: &VehicleId) -> Self {
        Self(format!("vehicle/{vehicle}"))
    }

    /// The namespace prefix without a trailing separator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifier() {
        let vehicle = VehicleId::new("ABC123").expect("valid id");
        assert_eq!(vehicle.as_str(), "ABC123");
        assert_eq!(VehicleNamespace::new(&vehicle).as_str(), "vehicle/ABC123");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let vehicle = VehicleId::new("  ABC123\n").expect("valid id");
        assert_eq!(vehicle.as_str(), "ABC123");
    }

    #[test]
    fn rejects_blank_identifier() {
        assert!(matches!(
            VehicleId::new(""),
            Err(ConfigError::MissingVehicleId)
        ));
        assert!(matches!(
            VehicleId::new("   "),
            Err(ConfigError::MissingVehicleId)
        ));
    }

    #[test]
    fn rejects_topic_metacharacters() {
        for raw in ["veh/1", "veh+1", "veh#1", "veh 1"] {
            let err = VehicleId::new(raw).expect_err("must be rejected");
            assert!(matches!(err, ConfigError::InvalidVehicleId { .. }), "{raw}");
        }
    }
}
