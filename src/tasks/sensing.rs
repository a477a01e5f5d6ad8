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

//! Sensing task: refresh every sensor and publish the readings

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use sl_error::{Result, SensorLoopError};

use super::Shutdown;
use crate::registry::{SensorId, SensorRegistry};
use crate::sensor::Sensor;

/// Outcome of one sweep
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepReport {
    pub recorded: usize,
    pub failed: Vec<String>,
}

pub struct SensingTask {
    registry: Arc<SensorRegistry>,
    sensors: Vec<(SensorId, Box<dyn Sensor>)>,
    period: Duration,
}

impl SensingTask {
    /// Bind each source to its registry record by name.
    ///
    /// Sources are swept in registry order regardless of the order given.
    pub fn new(
        registry: Arc<SensorRegistry>,
        sensors: Vec<Box<dyn Sensor>>,
        period: Duration,
    ) -> Result<Self> {
        let mut bound = Vec::with_capacity(sensors.len());
        for sensor in sensors {
            let id = registry
                .find_by_name(sensor.name())
                .map(|s| s.id)
                .ok_or_else(|| SensorLoopError::not_found(sensor.name()))?;
            if bound.iter().any(|(existing, _)| *existing == id) {
                return Err(SensorLoopError::DuplicateSensor(sensor.name().to_string()));
            }
            bound.push((id, sensor));
        }
        bound.sort_by_key(|(id, _)| *id);
        Ok(Self {
            registry,
            sensors: bound,
            period,
        })
    }

    /// Read every source, then record each value under its own lock acquisition.
    ///
    /// `read` runs with the registry unlocked, so a slow source delays only
    /// this task. A failing source keeps its previous value.
    pub fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();
        for (id, sensor) in self.sensors.iter_mut() {
            let value = match sensor.read() {
                Ok(v) => v,
                Err(e) => {
                    warn!(sensor = sensor.name(), error = %e, "Sensor read failed, keeping last value");
                    report.failed.push(sensor.name().to_string());
                    continue;
                }
            };
            match self.registry.record_value(*id, value) {
                Ok(()) => {
                    debug!(sensor = sensor.name(), value, "{} Value: {}", sensor.name(), value);
                    report.recorded += 1;
                }
                Err(e) => {
                    warn!(sensor = sensor.name(), error = %e, "Could not record reading");
                    report.failed.push(sensor.name().to_string());
                }
            }
        }
        report
    }

    pub fn run(mut self, shutdown: Shutdown) {
        info!(sensors = self.sensors.len(), period_ms = self.period.as_millis() as u64, "Sensing task started");
        loop {
            self.sweep();
            if !shutdown.sleep(self.period) {
                break;
            }
        }
        info!("Sensing task stopped");
    }
}
