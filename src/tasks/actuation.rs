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

//! Actuation task: threshold comparison and actuator drive
//!
//! Decisions are taken for all sensors inside one registry critical section,
//! so every comparison sees a consistent value/threshold pair. The actuator is
//! driven after the lock is released. The comparison is strictly greater-than
//! with no hysteresis; a value hovering around its threshold will toggle the
//! actuator every cycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, trace};

use super::Shutdown;
use crate::actuator::Actuator;
use crate::registry::SensorRegistry;

/// One on/off decision for one sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub sensor: String,
    pub value: f64,
    pub threshold: f64,
    pub state: bool,
}

pub struct ActuationTask {
    registry: Arc<SensorRegistry>,
    actuator: Arc<dyn Actuator>,
    period: Duration,
}

impl ActuationTask {
    pub fn new(registry: Arc<SensorRegistry>, actuator: Arc<dyn Actuator>, period: Duration) -> Self {
        Self {
            registry,
            actuator,
            period,
        }
    }

    /// Compare every sensor against its threshold
    pub fn decide(&self) -> Vec<Decision> {
        let guard = self.registry.lock();
        let mut decisions = Vec::with_capacity(guard.len());
        guard.for_each(|s| {
            decisions.push(Decision {
                sensor: s.name.to_string(),
                value: s.value,
                threshold: s.threshold,
                state: s.is_above_threshold(),
            })
        });
        decisions
    }

    /// Decide, then call `control` once per sensor in registry order
    pub fn cycle(&self) -> Vec<Decision> {
        let decisions = self.decide();
        for d in &decisions {
            trace!(sensor = %d.sensor, value = d.value, threshold = d.threshold, state = d.state, "Actuation decision");
            self.actuator.control(d.state);
        }
        decisions
    }

    pub fn run(self, shutdown: Shutdown) {
        info!(period_ms = self.period.as_millis() as u64, "Actuation task started");
        loop {
            self.cycle();
            if !shutdown.sleep(self.period) {
                break;
            }
        }
        info!("Actuation task stopped");
    }
}
