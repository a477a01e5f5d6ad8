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

//! Logging task: periodic registry snapshots to the sensor log
//!
//! The snapshot is copied under the registry lock and written after the lock
//! is released, so slow storage never stalls the other tasks. Failing to open
//! the log ends this task only; a failed append loses that interval and the
//! task carries on.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use sl_error::Result;

use super::Shutdown;
use crate::logger::SensorLog;
use crate::registry::SensorRegistry;

pub struct LoggingTask {
    registry: Arc<SensorRegistry>,
    path: PathBuf,
    period: Duration,
}

impl LoggingTask {
    pub fn new(registry: Arc<SensorRegistry>, path: impl Into<PathBuf>, period: Duration) -> Self {
        Self {
            registry,
            path: path.into(),
            period,
        }
    }

    /// Snapshot the registry and append one block to `log`
    pub fn cycle<W: Write>(&self, log: &mut SensorLog<W>) -> Result<()> {
        let snapshot = self.registry.snapshot();
        log.append(&snapshot)
    }

    /// Open the log file and run until shutdown.
    ///
    /// Returns the open error if the sink is unavailable.
    pub fn run(self, shutdown: Shutdown) -> Result<()> {
        let log = match SensorLog::open(&self.path) {
            Ok(log) => log,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Could not open log file, logging task exiting");
                return Err(e);
            }
        };
        self.run_with(log, shutdown);
        Ok(())
    }

    /// Run against an already opened sink
    pub fn run_with<W: Write>(&self, mut log: SensorLog<W>, shutdown: Shutdown) {
        info!(path = %log.path().display(), period_ms = self.period.as_millis() as u64, "Logging task started");
        loop {
            if let Err(e) = self.cycle(&mut log) {
                warn!(error = %e, "Log write failed, skipping this interval");
            }
            if !shutdown.sleep(self.period) {
                break;
            }
        }
        info!(blocks = log.blocks_written(), "Logging task stopped");
    }
}
