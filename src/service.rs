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

//! Service wiring
//!
//! Builds the shared registry, command channel and actuator from a
//! [`RuntimeConfig`], then starts one thread per task. Shared state is passed
//! to each task as an `Arc` at spawn time; nothing is global.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use sl_error::Result;

use crate::actuator::{Actuator, LedController};
use crate::channel::CommandChannel;
use crate::config::{validate_config, RuntimeConfig};
use crate::registry::SensorRegistry;
use crate::sensor::{Sensor, SimulatedSensor};
use crate::tasks::{ActuationTask, CommandProcessor, InputCapture, LoggingTask, SensingTask, Shutdown};

pub struct Service {
    config: RuntimeConfig,
    registry: Arc<SensorRegistry>,
    channel: Arc<CommandChannel>,
    actuator: Arc<dyn Actuator>,
    sensors: Vec<Box<dyn Sensor>>,
}

impl Service {
    /// Simulated sensors and an LED actuator, as described by `config`
    pub fn from_config(config: RuntimeConfig) -> Result<Self> {
        let sensors: Vec<Box<dyn Sensor>> = config
            .sensors
            .iter()
            .map(|s| Box::new(SimulatedSensor::new(s.name.clone(), s.kind)) as Box<dyn Sensor>)
            .collect();
        let actuator = Arc::new(LedController::new(config.actuator_name.clone()));
        Self::with_parts(config, sensors, actuator)
    }

    /// Caller-supplied sensor sources and actuator
    pub fn with_parts(
        config: RuntimeConfig,
        sensors: Vec<Box<dyn Sensor>>,
        actuator: Arc<dyn Actuator>,
    ) -> Result<Self> {
        validate_config(&config)?;
        let registry = Arc::new(SensorRegistry::new(config.thresholds())?);
        Ok(Self {
            config,
            registry,
            channel: Arc::new(CommandChannel::new()),
            actuator,
            sensors,
        })
    }

    pub fn registry(&self) -> Arc<SensorRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn channel(&self) -> Arc<CommandChannel> {
        Arc::clone(&self.channel)
    }

    /// Start the periodic tasks.
    ///
    /// One sensing sweep runs before any thread starts, so actuation and
    /// logging never see the placeholder startup values.
    pub fn start(self, shutdown: Shutdown) -> Result<ServiceHandles> {
        let cfg = self.config;

        let mut sensing = SensingTask::new(Arc::clone(&self.registry), self.sensors, cfg.sense_period())?;
        let primed = sensing.sweep();
        info!(recorded = primed.recorded, failed = primed.failed.len(), "Initial sensor sweep complete");

        let actuation = ActuationTask::new(Arc::clone(&self.registry), Arc::clone(&self.actuator), cfg.actuate_period());
        let logging = LoggingTask::new(Arc::clone(&self.registry), cfg.log_path.clone(), cfg.log_period());
        let processor = CommandProcessor::new(Arc::clone(&self.registry), Arc::clone(&self.channel), cfg.command_period());

        let mut threads = Vec::with_capacity(4);
        threads.push(spawn_named("sensing", {
            let shutdown = shutdown.clone();
            move || sensing.run(shutdown)
        })?);
        threads.push(spawn_named("actuation", {
            let shutdown = shutdown.clone();
            move || actuation.run(shutdown)
        })?);
        threads.push(spawn_named("logging", {
            let shutdown = shutdown.clone();
            move || {
                // The open failure has already been reported; only this task ends.
                let _ = logging.run(shutdown);
            }
        })?);
        threads.push(spawn_named("commands", {
            let shutdown = shutdown.clone();
            move || processor.run(shutdown)
        })?);

        info!(threads = threads.len(), "Threads started");
        Ok(ServiceHandles {
            registry: self.registry,
            channel: self.channel,
            shutdown,
            threads,
        })
    }
}

fn spawn_named<F>(name: &'static str, f: F) -> Result<(&'static str, JoinHandle<()>)>
where
    F: FnOnce() + Send + 'static,
{
    let handle = thread::Builder::new().name(name.to_string()).spawn(f)?;
    Ok((name, handle))
}

/// Running service: shared state plus the periodic task threads
pub struct ServiceHandles {
    registry: Arc<SensorRegistry>,
    channel: Arc<CommandChannel>,
    shutdown: Shutdown,
    threads: Vec<(&'static str, JoinHandle<()>)>,
}

impl ServiceHandles {
    pub fn registry(&self) -> Arc<SensorRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn channel(&self) -> Arc<CommandChannel> {
        Arc::clone(&self.channel)
    }

    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Start input capture on its own thread.
    ///
    /// When input ends the channel is closed and shutdown is requested. The
    /// thread may stay blocked in a read after shutdown, so callers usually
    /// do not join it.
    pub fn spawn_input<R, W>(&self, input: R, output: W) -> Result<JoinHandle<()>>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let capture = InputCapture::new(Arc::clone(&self.channel));
        let channel = Arc::clone(&self.channel);
        let shutdown = self.shutdown.clone();
        let (_, handle) = spawn_named("input", move || {
            if let Err(e) = capture.run(input, output, &shutdown) {
                error!(error = %e, "Input capture failed");
            }
            channel.close();
            shutdown.trigger();
        })?;
        Ok(handle)
    }

    /// Ask every task to stop and refuse further commands
    pub fn stop(&self) {
        self.shutdown.trigger();
        self.channel.close();
    }

    /// Wait for the periodic tasks to finish
    pub fn join(self) {
        for (name, handle) in self.threads {
            if handle.join().is_err() {
                error!(task = name, "Task panicked");
            }
        }
    }
}
