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

//! Sensorloop - concurrent sensor monitoring loop
//!
//! Independent periodic tasks read sensors, drive an actuator from threshold
//! comparisons and log snapshots, while an operator adjusts thresholds
//! through a command queue.
//!
//! Shared state is split into two exclusion domains: the [`SensorRegistry`]
//! (one coarse lock over every sensor) and the [`CommandChannel`] (its own
//! lock). No code path holds both.

pub mod actuator;
pub mod channel;
pub mod config;
pub mod constants;
pub mod logger;
pub mod registry;
pub mod sensor;
pub mod service;
pub mod tasks;

#[cfg(test)]
pub mod test_utils;

pub use actuator::{Actuator, LedController};
pub use channel::{CommandChannel, ThresholdCommand};
pub use config::{load_config, RuntimeConfig, SensorConfig};
pub use registry::{SensorId, SensorRegistry, SensorSnapshot};
pub use sensor::{Sensor, SensorKind, SimulatedSensor};
pub use service::{Service, ServiceHandles};
pub use tasks::Shutdown;

pub use sl_error::{Result, SensorLoopError};
