//! ---
//! flk_section: "01-core-functionality"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Shared primitives and utilities for the bridge runtime."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
//! Environment-driven process settings.
//!
//! The bridge is configured exclusively through environment variables so it
//! can be dropped into a container without a config file. All validation
//! happens here, before any network connection is attempted; a bad value is
//! a startup failure, never a runtime surprise.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::identity::{VehicleId, VehicleNamespace};
use crate::logging::LogFormat;
use crate::ConfigError;

/// Broker host variable.
pub const BROKER_ADDR_ENV: &str = "MQTT_BROKER_ADDR";
/// Broker port variable.
pub const BROKER_PORT_ENV: &str = "MQTT_BROKER_PORT";
/// Vehicle identifier variable. Required.
pub const VEHICLE_ID_ENV: &str = "VIN";
/// Orchestrator control-plane gRPC endpoint variable.
pub const ORCHESTRATOR_ENDPOINT_ENV: &str = "ORCHESTRATOR_ENDPOINT";
/// Log output format variable (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "FLEETLINK_LOG_FORMAT";
/// Optional directory for daily-rolling log files.
pub const LOG_DIR_ENV: &str = "FLEETLINK_LOG_DIR";
/// Optional listen address for the Prometheus exporter.
pub const METRICS_ADDR_ENV: &str = "FLEETLINK_METRICS_ADDR";

fn default_broker_host() -> String {
    "localhost".to_owned()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_orchestrator_endpoint() -> String {
    "http://127.0.0.1:25551".to_owned()
}

/// MQTT broker connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker TCP port.
    pub port: u16,
}

impl fmt::Display for BrokerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Logging output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Format of the stdout layer.
    pub format: LogFormat,
    /// When set, a daily-rolling JSON log file is written here as well.
    pub directory: Option<PathBuf>,
}

/// Complete bridge configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// MQTT broker target.
    pub broker: BrokerSettings,
    /// Validated vehicle identifier.
    pub vehicle: VehicleId,
    /// Orchestrator control-plane endpoint, e.g. `http://127.0.0.1:25551`.
    pub orchestrator_endpoint: String,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Prometheus exporter listen address; `None` disables the exporter.
    pub metrics_addr: Option<SocketAddr>,
}

impl BridgeSettings {
    /// Resolve the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Topic namespace derived from the vehicle identifier.
    pub fn namespace(&self) -> VehicleNamespace {
        VehicleNamespace::new(&self.vehicle)
    }

    // Blank values are treated like unset ones for the optional variables;
    // a blank VIN is still a hard error.
    fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| get(name).filter(|value| !value.trim().is_empty());

        let host = present(BROKER_ADDR_ENV)
            .map(|value| value.trim().to_owned())
            .unwrap_or_else(default_broker_host);

        let port = match present(BROKER_PORT_ENV) {
            Some(raw) => {
                let value = raw.trim().to_owned();
                value
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidBrokerPort { value })?
            }
            None => default_broker_port(),
        };

        let vehicle = VehicleId::new(get(VEHICLE_ID_ENV).unwrap_or_default())?;

        let orchestrator_endpoint = present(ORCHESTRATOR_ENDPOINT_ENV)
            .map(|value| value.trim().to_owned())
            .unwrap_or_else(default_orchestrator_endpoint);

        let format = match present(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        let directory = present(LOG_DIR_ENV).map(|value| PathBuf::from(value.trim()));

        let metrics_addr = match present(METRICS_ADDR_ENV) {
            Some(raw) => {
                let value = raw.trim().to_owned();
                Some(
                    value
                        .parse::<SocketAddr>()
                        .map_err(|_| ConfigError::InvalidMetricsAddr { value })?,
                )
            }
            None => None,
        };

        Ok(Self {
            broker: BrokerSettings { host, port },
            vehicle,
            orchestrator_endpoint,
            logging: LoggingSettings { format, directory },
            metrics_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn applies_defaults_when_only_vin_is_set() {
        let settings =
            BridgeSettings::from_lookup(lookup(&[(VEHICLE_ID_ENV, "ABC123")])).expect("settings");
        assert_eq!(settings.broker.host, "localhost");
        assert_eq!(settings.broker.port, 1883);
        assert_eq!(settings.orchestrator_endpoint, "http://127.0.0.1:25551");
        assert_eq!(settings.logging.format, LogFormat::StructuredJson);
        assert_eq!(settings.logging.directory, None);
        assert_eq!(settings.metrics_addr, None);
        assert_eq!(settings.namespace().as_str(), "vehicle/ABC123");
    }

    #[test]
    fn reads_explicit_overrides() {
        let settings = BridgeSettings::from_lookup(lookup(&[
            (VEHICLE_ID_ENV, "TRUCK-7"),
            (BROKER_ADDR_ENV, "broker.fleet.internal"),
            (BROKER_PORT_ENV, "8883"),
            (ORCHESTRATOR_ENDPOINT_ENV, "http://10.0.0.5:25551"),
            (LOG_FORMAT_ENV, "pretty"),
            (LOG_DIR_ENV, "/var/log/fleetlink"),
            (METRICS_ADDR_ENV, "127.0.0.1:9400"),
        ]))
        .expect("settings");
        assert_eq!(settings.broker.to_string(), "broker.fleet.internal:8883");
        assert_eq!(settings.orchestrator_endpoint, "http://10.0.0.5:25551");
        assert_eq!(settings.logging.format, LogFormat::Pretty);
        assert_eq!(
            settings.logging.directory.as_deref(),
            Some(std::path::Path::new("/var/log/fleetlink"))
        );
        assert_eq!(
            settings.metrics_addr,
            Some("127.0.0.1:9400".parse().unwrap())
        );
    }

    #[test]
    fn missing_vehicle_id_is_fatal() {
        let err = BridgeSettings::from_lookup(lookup(&[(BROKER_ADDR_ENV, "localhost")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingVehicleId));
    }

    #[test]
    fn blank_vehicle_id_is_fatal() {
        let err = BridgeSettings::from_lookup(lookup(&[(VEHICLE_ID_ENV, "  ")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingVehicleId));
    }

    #[test]
    fn garbage_port_is_rejected() {
        let err = BridgeSettings::from_lookup(lookup(&[
            (VEHICLE_ID_ENV, "ABC123"),
            (BROKER_PORT_ENV, "not-a-port"),
        ]))
        .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidBrokerPort { .. }));
    }

    #[test]
    fn blank_optional_values_fall_back_to_defaults() {
        let settings = BridgeSettings::from_lookup(lookup(&[
            (VEHICLE_ID_ENV, "ABC123"),
            (BROKER_ADDR_ENV, ""),
            (BROKER_PORT_ENV, " "),
        ]))
        .expect("settings");
        assert_eq!(settings.broker.host, "localhost");
        assert_eq!(settings.broker.port, 1883);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = BridgeSettings::from_lookup(lookup(&[
            (VEHICLE_ID_ENV, "ABC123"),
            (LOG_FORMAT_ENV, "yaml"),
        ]))
        .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidLogFormat { .. }));
    }
}
