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

//! Command processor: applies queued threshold updates to the registry
//!
//! A batch is drained from the channel first; each entry then takes the
//! registry lock on its own. The two locks are never held together. An
//! unknown sensor name is reported and skipped, the rest of the batch still
//! applies.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::Shutdown;
use crate::channel::{CommandChannel, ThresholdCommand};
use crate::registry::SensorRegistry;

/// Outcome of one drained batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrainReport {
    pub applied: Vec<ThresholdCommand>,
    /// Sensor names that matched nothing in the registry
    pub not_found: Vec<String>,
}

impl DrainReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.not_found.is_empty()
    }
}

pub struct CommandProcessor {
    registry: Arc<SensorRegistry>,
    channel: Arc<CommandChannel>,
    period: Duration,
}

impl CommandProcessor {
    pub fn new(registry: Arc<SensorRegistry>, channel: Arc<CommandChannel>, period: Duration) -> Self {
        Self {
            registry,
            channel,
            period,
        }
    }

    fn apply(&self, command: ThresholdCommand, report: &mut DrainReport) {
        match self.registry.update_threshold(&command.sensor, command.threshold) {
            Ok(previous) => {
                info!(
                    sensor = %command.sensor,
                    previous,
                    threshold = command.threshold,
                    "Threshold for {} updated to {}",
                    command.sensor,
                    command.threshold
                );
                report.applied.push(command);
            }
            Err(e) => {
                error!(sensor = %command.sensor, "{}", e);
                report.not_found.push(command.sensor);
            }
        }
    }

    /// Apply whatever is queued right now, without waiting
    pub fn process_pending(&self) -> DrainReport {
        let mut report = DrainReport::default();
        self.channel.drain_all(|c| self.apply(c, &mut report));
        report
    }

    /// Wait up to one period for commands, then apply them
    pub fn process_next(&self) -> DrainReport {
        let mut report = DrainReport::default();
        self.channel.wait_drain_all(self.period, |c| self.apply(c, &mut report));
        report
    }

    /// Runs until shutdown. Once the channel is closed and empty the loop
    /// falls back to sleeping between checks.
    pub fn run(self, shutdown: Shutdown) {
        info!(period_ms = self.period.as_millis() as u64, "Command processor started");
        while !shutdown.is_triggered() {
            self.process_next();
            if self.channel.is_closed() && self.channel.is_empty() && !shutdown.sleep(self.period) {
                break;
            }
        }
        // Commands accepted before shutdown are still applied.
        self.process_pending();
        info!("Command processor stopped");
    }
}
