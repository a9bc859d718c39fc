//! ---
//! flk_section: "01-core-functionality"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Shared primitives and utilities for the bridge runtime."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
//! Core shared primitives for the fleetlink workspace.
//! This crate exposes environment-driven settings, the vehicle identity and
//! topic namespace, and the tracing initialisation used by the daemon.

pub mod config;
pub mod identity;
pub mod logging;

/// Errors raised while reading and validating the process configuration.
///
/// Every variant is fatal: the daemon reports it and exits before any
/// broker or orchestrator connection is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The vehicle identifier variable is unset or blank.
    #[error("VIN must be set to a non-empty vehicle identifier")]
    MissingVehicleId,
    /// The vehicle identifier contains a character that would corrupt
    /// MQTT topic names.
    #[error("vehicle identifier {id:?} contains forbidden character {character:?}")]
    InvalidVehicleId {
        /// The offending identifier as supplied.
        id: String,
        /// The first rejected character.
        character: char,
    },
    /// The broker port variable is not a valid TCP port.
    #[error("MQTT_BROKER_PORT value {value:?} is not a valid port number")]
    InvalidBrokerPort {
        /// The raw environment value.
        value: String,
    },
    /// The log format variable names an unknown format.
    #[error("FLEETLINK_LOG_FORMAT value {value:?} is not one of: json, pretty")]
    InvalidLogFormat {
        /// The raw environment value.
        value: String,
    },
    /// The metrics listen address cannot be parsed as a socket address.
    #[error("FLEETLINK_METRICS_ADDR value {value:?} is not a valid socket address")]
    InvalidMetricsAddr {
        /// The raw environment value.
        value: String,
    },
}

pub use config::{BridgeSettings, BrokerSettings, LoggingSettings};
pub use identity::{VehicleId, VehicleNamespace};
pub use logging::{init_tracing, LogFormat};
