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

/*
 * Test utilities shared by the unit test modules
 */

#[cfg(test)]
pub mod test_utils {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::actuator::Actuator;
    use crate::registry::SensorRegistry;
    use crate::sensor::Sensor;
    use sl_error::Result;

    /// Registry seeded with the stock Temperature(25.0) / Humidity(30.0) pair
    pub fn seeded_registry() -> Arc<SensorRegistry> {
        Arc::new(SensorRegistry::new([("Temperature", 25.0), ("Humidity", 30.0)]).unwrap())
    }

    /// Record a value by sensor name
    pub fn set_value(reg: &SensorRegistry, name: &str, value: f64) {
        let id = reg.find_by_name(name).unwrap().id;
        reg.record_value(id, value).unwrap();
    }

    /// Actuator that remembers every call
    #[derive(Debug, Default)]
    pub struct RecordingActuator {
        calls: Mutex<Vec<bool>>,
    }

    impl RecordingActuator {
        pub fn calls(&self) -> Vec<bool> {
            self.calls.lock().clone()
        }
    }

    impl Actuator for RecordingActuator {
        fn control(&self, state: bool) {
            self.calls.lock().push(state);
        }
    }

    /// Sensor that sleeps before returning a constant
    pub struct SlowSensor {
        pub name: String,
        pub delay: Duration,
        pub value: f64,
    }

    impl Sensor for SlowSensor {
        fn name(&self) -> &str {
            &self.name
        }

        fn read(&mut self) -> Result<f64> {
            thread::sleep(self.delay);
            Ok(self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use crate::sensor::Sensor;
    use std::time::Duration;

    #[test]
    fn test_seeded_registry() {
        let reg = seeded_registry();
        assert_eq!(reg.len(), 2);
        set_value(&reg, "Humidity", 31.0);
        assert_eq!(reg.find_by_name("Humidity").unwrap().value, 31.0);
    }

    #[test]
    fn test_slow_sensor_returns_value() {
        let mut s = SlowSensor { name: "Slow".into(), delay: Duration::from_millis(1), value: 7.0 };
        assert_eq!(s.read().unwrap(), 7.0);
    }
}
