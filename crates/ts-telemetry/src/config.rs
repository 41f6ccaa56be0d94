//! Logging configuration, read from the process environment.
//!
//! | Variable | Effect | Default |
//! |---|---|---|
//! | `TS_LOG_LEVEL`, then `RUST_LOG` | `EnvFilter` directive | `info` |
//! | `TS_JSON_LOGS` | JSON lines instead of pretty output | on inside a container |
//! | `TS_CONSOLE_OUTPUT` | write logs to stdout at all | on |

/// Logging setup for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Process name, e.g. `ts-01-shard-store`.
    pub service_name: String,
    /// Two-digit subsystem id; `00` when the process is not a subsystem.
    pub subsystem_id: String,
    /// `EnvFilter` directive.
    pub log_level: String,
    /// Write logs to stdout.
    pub console_output: bool,
    /// JSON lines instead of pretty output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tri-shard".to_string(),
            subsystem_id: "00".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let in_container = ["KUBERNETES_SERVICE_HOST", "DOCKER_CONTAINER"]
            .iter()
            .any(|name| lookup(name).is_some());
        let defaults = Self::default();

        Self {
            log_level: lookup("TS_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("TS_CONSOLE_OUTPUT")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.console_output),
            json_logs: lookup("TS_JSON_LOGS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(in_container),
            ..defaults
        }
    }

    /// Environment config named after subsystem `id`.
    pub fn for_subsystem(id: &str, name: &str) -> Self {
        Self {
            subsystem_id: id.to_string(),
            service_name: format!("ts-{}-{}", id, name),
            ..Self::from_env()
        }
    }
}

/// `true/1/yes/on` or `false/0/no/off`, case-insensitive.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn test_ts_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("RUST_LOG", "warn"),
            ("TS_LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup_from(&[("RUST_LOG", "warn")]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_container_switches_json_on() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("DOCKER_CONTAINER", "1")]));
        assert!(config.json_logs);

        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("DOCKER_CONTAINER", "1"),
            ("TS_JSON_LOGS", "off"),
        ]));
        assert!(!config.json_logs);
    }

    #[test]
    fn test_unparseable_flag_keeps_default() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("TS_CONSOLE_OUTPUT", "maybe")]));
        assert!(config.console_output);
    }

    #[test]
    fn test_for_subsystem_names_service() {
        let config = TelemetryConfig::for_subsystem("03", "coordinator");
        assert_eq!(config.subsystem_id, "03");
        assert_eq!(config.service_name, "ts-03-coordinator");
    }
}
