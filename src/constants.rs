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

//! Constants and default values for Sensorloop
//!
//! Periods, default sensor set and file names live here so the tasks and
//! the config layer agree on one set of defaults.

use std::time::Duration;

/// Task cadence defaults
pub mod timing {
    use super::Duration;

    /// Sensing sweep period
    pub const SENSE_PERIOD_MS: u64 = 1000;

    /// Actuation decision period
    pub const ACTUATE_PERIOD_MS: u64 = 1000;

    /// Log snapshot period (must not be shorter than the sensing period)
    pub const LOG_PERIOD_MS: u64 = 2000;

    /// Command drain period; also the longest the processor waits for input
    pub const COMMAND_PERIOD_MS: u64 = 100;

    /// Granularity of shutdown checks while a periodic task sleeps
    pub const SHUTDOWN_POLL: Duration = Duration::from_millis(50);
}

/// Default sensor set and actuator
pub mod defaults {
    pub const TEMPERATURE_NAME: &str = "Temperature";
    pub const TEMPERATURE_THRESHOLD: f64 = 25.0;

    pub const HUMIDITY_NAME: &str = "Humidity";
    pub const HUMIDITY_THRESHOLD: f64 = 30.0;

    pub const ACTUATOR_NAME: &str = "LED";
}

/// Simulated sensor ranges: base + (r mod SPAN) / SCALE
pub mod simulation {
    pub const TEMPERATURE_BASE: f64 = 20.0;
    pub const HUMIDITY_BASE: f64 = 30.0;
    pub const SPAN: u32 = 100;
    pub const SCALE: f64 = 10.0;
}

/// File names and environment variables
pub mod paths {
    /// Log sink, relative to the working directory
    pub const LOG_FILE: &str = "sensor_log.txt";

    /// Config directory name under the user config dir
    pub const CONFIG_DIR_NAME: &str = "sensorloop";

    /// Config file name
    pub const CONFIG_FILE: &str = "config.json";

    /// Environment variable overriding the config path
    pub const CONFIG_ENV: &str = "SENSORLOOP_CONFIG";

    /// Environment variable holding the tracing filter
    pub const LOG_LEVEL_ENV: &str = "SENSORLOOP_LOG";
}

/// Log sink layout
pub mod log_format {
    /// Line written after each snapshot block
    pub const SEPARATOR: &str = "----";
}

/// Operator-facing text
pub mod operator {
    pub const PROMPT: &str = "Enter sensor name and new threshold (e.g., Temperature 25): ";
    pub const INVALID_INPUT: &str = "Invalid input. Please try again.";
    pub const USAGE: &str = "You can now enter commands in the format: <SensorName> <NewThreshold>";
}
