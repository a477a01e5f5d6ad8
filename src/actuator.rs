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

//! Actuators
//!
//! An [`Actuator`] receives one on/off decision per sensor per actuation
//! cycle. It is a side-effect sink with no state the tasks need to protect.

use tracing::info;

/// Drive capability. Must return promptly.
#[cfg_attr(test, mockall::automock)]
pub trait Actuator: Send + Sync {
    fn control(&self, state: bool);
}

/// Indicator light that reports its state through the log
#[derive(Debug, Clone)]
pub struct LedController {
    name: String,
}

impl LedController {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text emitted for a given state, e.g. "LED is ON"
    pub fn describe(&self, state: bool) -> String {
        format!("{} is {}", self.name, if state { "ON" } else { "OFF" })
    }
}

impl Default for LedController {
    fn default() -> Self {
        Self::new(crate::constants::defaults::ACTUATOR_NAME)
    }
}

impl Actuator for LedController {
    fn control(&self, state: bool) {
        info!(actuator = %self.name, state, "{}", self.describe(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_describe() {
        let led = LedController::default();
        assert_eq!(led.describe(true), "LED is ON");
        assert_eq!(led.describe(false), "LED is OFF");
    }

    #[test]
    fn test_mock_actuator_records_calls() {
        let mut mock = MockActuator::new();
        mock.expect_control().withf(|s| *s).times(1).return_const(());
        let actuator: &dyn Actuator = &mock;
        actuator.control(true);
    }
}
