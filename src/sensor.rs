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

//! Sensor sources
//!
//! A [`Sensor`] produces fresh readings on demand. Its live value and
//! threshold are registry state, so implementations only need a name and a
//! `read`. The two simulated sources stand in for real hardware.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sl_error::Result;

use crate::constants::simulation;

/// Read capability shared by every sensor source
pub trait Sensor: Send {
    fn name(&self) -> &str;

    /// Produce a fresh reading. May block; never called under the registry lock.
    fn read(&mut self) -> Result<f64>;
}

/// Kind of simulated source, as named in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Humidity,
}

impl SensorKind {
    pub fn base(self) -> f64 {
        match self {
            SensorKind::Temperature => simulation::TEMPERATURE_BASE,
            SensorKind::Humidity => simulation::HUMIDITY_BASE,
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorKind::Temperature => write!(f, "temperature"),
            SensorKind::Humidity => write!(f, "humidity"),
        }
    }
}

/// Randomised source: `base + (r mod 100) / 10`, i.e. within `[base, base + 10)`
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    name: String,
    kind: SensorKind,
}

impl SimulatedSensor {
    pub fn new(name: impl Into<String>, kind: SensorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn temperature(name: impl Into<String>) -> Self {
        Self::new(name, SensorKind::Temperature)
    }

    pub fn humidity(name: impl Into<String>) -> Self {
        Self::new(name, SensorKind::Humidity)
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }
}

impl Sensor for SimulatedSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> Result<f64> {
        let r = rand::rng().random_range(0..simulation::SPAN);
        Ok(self.kind.base() + f64::from(r) / simulation::SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_range() {
        let mut s = SimulatedSensor::temperature("Temperature");
        for _ in 0..500 {
            let v = s.read().unwrap();
            assert!((20.0..30.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_humidity_range() {
        let mut s = SimulatedSensor::humidity("Humidity");
        for _ in 0..500 {
            let v = s.read().unwrap();
            assert!((30.0..40.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_kind_serde_names() {
        let k: SensorKind = serde_json::from_str("\"humidity\"").unwrap();
        assert_eq!(k, SensorKind::Humidity);
        assert_eq!(serde_json::to_string(&SensorKind::Temperature).unwrap(), "\"temperature\"");
    }
}
