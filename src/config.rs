/*
 * This file is part of Sensorloop.
 *
 * Copyright (C) 2025 Sensorloop contributors
 *
 * Sensorloop is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorloop is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorloop. If not, see <https://www.gnu.org/licenses/>.
 */

//! Runtime configuration
//!
//! Everything has a default, so running without a config file reproduces the
//! stock two-sensor setup. A file is looked up in this order: `--config`,
//! `$SENSORLOOP_CONFIG`, then `<config dir>/sensorloop/config.json`.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sl_error::{Result, SensorLoopError};

use crate::constants::{defaults, paths, timing};
use crate::sensor::SensorKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    pub name: String,
    pub kind: SensorKind,
    pub threshold: f64,
}

impl SensorConfig {
    pub fn new(name: impl Into<String>, kind: SensorKind, threshold: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            threshold,
        }
    }
}

fn default_sensors() -> Vec<SensorConfig> {
    vec![
        SensorConfig::new(defaults::TEMPERATURE_NAME, SensorKind::Temperature, defaults::TEMPERATURE_THRESHOLD),
        SensorConfig::new(defaults::HUMIDITY_NAME, SensorKind::Humidity, defaults::HUMIDITY_THRESHOLD),
    ]
}

fn default_log_path() -> PathBuf { PathBuf::from(paths::LOG_FILE) }
fn default_actuator_name() -> String { defaults::ACTUATOR_NAME.to_string() }
fn default_sense_period_ms() -> u64 { timing::SENSE_PERIOD_MS }
fn default_actuate_period_ms() -> u64 { timing::ACTUATE_PERIOD_MS }
fn default_log_period_ms() -> u64 { timing::LOG_PERIOD_MS }
fn default_command_period_ms() -> u64 { timing::COMMAND_PERIOD_MS }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Initial sensor set in registry order
    #[serde(default = "default_sensors")]
    pub sensors: Vec<SensorConfig>,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_actuator_name")]
    pub actuator_name: String,
    #[serde(default = "default_sense_period_ms")]
    pub sense_period_ms: u64,
    #[serde(default = "default_actuate_period_ms")]
    pub actuate_period_ms: u64,
    #[serde(default = "default_log_period_ms")]
    pub log_period_ms: u64,
    #[serde(default = "default_command_period_ms")]
    pub command_period_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sensors: default_sensors(),
            log_path: default_log_path(),
            actuator_name: default_actuator_name(),
            sense_period_ms: default_sense_period_ms(),
            actuate_period_ms: default_actuate_period_ms(),
            log_period_ms: default_log_period_ms(),
            command_period_ms: default_command_period_ms(),
        }
    }
}

impl RuntimeConfig {
    pub fn sense_period(&self) -> Duration { Duration::from_millis(self.sense_period_ms) }
    pub fn actuate_period(&self) -> Duration { Duration::from_millis(self.actuate_period_ms) }
    pub fn log_period(&self) -> Duration { Duration::from_millis(self.log_period_ms) }
    pub fn command_period(&self) -> Duration { Duration::from_millis(self.command_period_ms) }

    /// `(name, threshold)` pairs for seeding the registry
    pub fn thresholds(&self) -> Vec<(String, f64)> {
        self.sensors.iter().map(|s| (s.name.clone(), s.threshold)).collect()
    }
}

/// Check a config for problems that would only surface once tasks are running
pub fn validate_config(cfg: &RuntimeConfig) -> Result<()> {
    if cfg.sensors.is_empty() {
        return Err(SensorLoopError::invalid_config("sensors", "at least one sensor is required"));
    }
    let mut seen = HashSet::new();
    for s in &cfg.sensors {
        if s.name.trim().is_empty() {
            return Err(SensorLoopError::invalid_config("sensors.name", "sensor name is empty"));
        }
        if s.name.split_whitespace().count() != 1 {
            // Operator commands are whitespace separated
            return Err(SensorLoopError::invalid_config(
                "sensors.name",
                format!("{:?} contains whitespace", s.name),
            ));
        }
        if !seen.insert(s.name.as_str()) {
            return Err(SensorLoopError::DuplicateSensor(s.name.clone()));
        }
        if !s.threshold.is_finite() {
            return Err(SensorLoopError::invalid_config(
                format!("sensors.{}.threshold", s.name),
                "must be finite",
            ));
        }
    }
    for (field, value) in [
        ("sense_period_ms", cfg.sense_period_ms),
        ("actuate_period_ms", cfg.actuate_period_ms),
        ("log_period_ms", cfg.log_period_ms),
        ("command_period_ms", cfg.command_period_ms),
    ] {
        if value == 0 {
            return Err(SensorLoopError::invalid_config(field, "must be greater than zero"));
        }
    }
    if cfg.log_period_ms < cfg.sense_period_ms {
        return Err(SensorLoopError::invalid_config(
            "log_period_ms",
            "must not be shorter than sense_period_ms",
        ));
    }
    if cfg.log_path.as_os_str().is_empty() {
        return Err(SensorLoopError::invalid_config("log_path", "must not be empty"));
    }
    Ok(())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(paths::CONFIG_DIR_NAME).join(paths::CONFIG_FILE))
}

/// Pick the config file to load, if any.
///
/// An explicit path wins and must exist; the default location is optional.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Ok(p) = env::var(paths::CONFIG_ENV) {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    default_config_path().filter(|p| p.exists())
}

pub fn load_config_from(path: &Path) -> Result<RuntimeConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| SensorLoopError::config(format!("cannot read {}: {}", path.display(), e)))?;
    let cfg: RuntimeConfig = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    debug!(path = %path.display(), sensors = cfg.sensors.len(), "Loaded config");
    Ok(cfg)
}

/// Resolve and load the config, falling back to defaults when no file is found
pub fn load_config(explicit: Option<&Path>) -> Result<RuntimeConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            info!(path = %path.display(), "Using config file");
            load_config_from(&path)
        }
        None => {
            debug!("No config file, using defaults");
            Ok(RuntimeConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_stock_setup() {
        let cfg = RuntimeConfig::default();
        assert_eq!(
            cfg.thresholds(),
            vec![("Temperature".to_string(), 25.0), ("Humidity".to_string(), 30.0)]
        );
        assert_eq!(cfg.log_path, PathBuf::from("sensor_log.txt"));
        assert_eq!(cfg.command_period(), Duration::from_millis(100));
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str(r#"{"log_period_ms": 5000}"#).unwrap();
        assert_eq!(cfg.log_period_ms, 5000);
        assert_eq!(cfg.sensors.len(), 2);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<RuntimeConfig>(r#"{"bogus": 1}"#).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut cfg = RuntimeConfig::default();
        cfg.sensors.push(SensorConfig::new("Temperature", SensorKind::Temperature, 1.0));
        assert!(matches!(validate_config(&cfg), Err(SensorLoopError::DuplicateSensor(_))));

        let mut cfg = RuntimeConfig::default();
        cfg.sensors.clear();
        assert!(validate_config(&cfg).is_err());

        let mut cfg = RuntimeConfig::default();
        cfg.sensors[0].name = "Room Temp".into();
        assert!(validate_config(&cfg).is_err());

        let mut cfg = RuntimeConfig::default();
        cfg.log_period_ms = 500;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = RuntimeConfig::default();
        cfg.command_period_ms = 0;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = RuntimeConfig::default();
        cfg.sensors[1].threshold = f64::NAN;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"sensors": [{"name": "Greenhouse", "kind": "humidity", "threshold": 55.0}], "actuator_name": "Fan"}"#,
        )
        .unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.sensors, vec![SensorConfig::new("Greenhouse", SensorKind::Humidity, 55.0)]);
        assert_eq!(cfg.actuator_name, "Fan");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_selects_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.json");
        fs::write(&path, r#"{"sense_period_ms": 250, "log_period_ms": 250}"#).unwrap();
        env::set_var(paths::CONFIG_ENV, &path);
        let resolved = resolve_config_path(None);
        let cfg = load_config(None);
        env::remove_var(paths::CONFIG_ENV);
        assert_eq!(resolved, Some(path));
        assert_eq!(cfg.unwrap().sense_period_ms, 250);
    }

    #[test]
    #[serial]
    fn test_explicit_path_beats_env_var() {
        env::set_var(paths::CONFIG_ENV, "/nonexistent/env.json");
        let explicit = PathBuf::from("/tmp/explicit.json");
        let resolved = resolve_config_path(Some(&explicit));
        env::remove_var(paths::CONFIG_ENV);
        assert_eq!(resolved, Some(explicit));
    }
}
