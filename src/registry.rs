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

//! Sensor registry
//!
//! Holds the live value/threshold state of every sensor behind one coarse
//! lock. Records live in a fixed-index arena addressed by [`SensorId`], with a
//! name index for command lookup. Nothing outside this module ever holds a
//! reference into the arena past the lifetime of a [`RegistryGuard`]; callers
//! receive [`SensorSnapshot`] copies instead.
//!
//! Lock ordering: the registry lock is never acquired while the command
//! channel lock is held (see `channel.rs`).

use std::collections::HashMap;

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use sl_error::{Result, SensorLoopError};

/// Stable handle for a sensor record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(usize);

impl SensorId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owned copy of one sensor's state, taken under the registry lock
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    pub id: SensorId,
    pub name: String,
    pub value: f64,
    pub threshold: f64,
    /// Number of readings recorded since startup
    pub readings: u64,
}

impl SensorSnapshot {
    /// Actuation decision: strictly greater than, no hysteresis
    pub fn is_above_threshold(&self) -> bool {
        self.value > self.threshold
    }
}

/// Borrowed view handed to [`RegistryGuard::for_each`] visitors
#[derive(Debug, Clone, Copy)]
pub struct SensorView<'a> {
    pub id: SensorId,
    pub name: &'a str,
    pub value: f64,
    pub threshold: f64,
    pub readings: u64,
}

impl SensorView<'_> {
    pub fn is_above_threshold(&self) -> bool {
        self.value > self.threshold
    }

    pub fn to_snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            id: self.id,
            name: self.name.to_string(),
            value: self.value,
            threshold: self.threshold,
            readings: self.readings,
        }
    }
}

#[derive(Debug)]
struct SensorRecord {
    name: String,
    value: f64,
    threshold: f64,
    readings: u64,
}

impl SensorRecord {
    fn view(&self, index: usize) -> SensorView<'_> {
        SensorView {
            id: SensorId(index),
            name: &self.name,
            value: self.value,
            threshold: self.threshold,
            readings: self.readings,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    records: Vec<SensorRecord>,
    index: HashMap<String, usize>,
}

/// Shared sensor state, one exclusion domain for the whole collection
#[derive(Debug)]
pub struct SensorRegistry {
    inner: Mutex<RegistryInner>,
}

impl SensorRegistry {
    /// Build a registry from `(name, threshold)` pairs in creation order.
    ///
    /// Values start at 0.0. Empty or duplicate names are rejected so a
    /// threshold command can never land on the wrong sensor.
    pub fn new<I, S>(sensors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut inner = RegistryInner::default();
        for (name, threshold) in sensors {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(SensorLoopError::invalid_config("sensors.name", "sensor name is empty"));
            }
            if inner.index.contains_key(&name) {
                return Err(SensorLoopError::DuplicateSensor(name));
            }
            inner.index.insert(name.clone(), inner.records.len());
            inner.records.push(SensorRecord {
                name,
                value: 0.0,
                threshold,
                readings: 0,
            });
        }
        debug!(sensors = inner.records.len(), "Sensor registry created");
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Acquire the registry lock for a multi-step critical section
    pub fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            inner: self.inner.lock(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids and names in registry order
    pub fn entries(&self) -> Vec<(SensorId, String)> {
        let guard = self.lock();
        let mut out = Vec::with_capacity(guard.len());
        guard.for_each(|s| out.push((s.id, s.name.to_string())));
        out
    }

    pub fn find_by_name(&self, name: &str) -> Option<SensorSnapshot> {
        self.lock().find_by_name(name)
    }

    pub fn update_threshold(&self, name: &str, threshold: f64) -> Result<f64> {
        self.lock().update_threshold(name, threshold)
    }

    pub fn record_value(&self, id: SensorId, value: f64) -> Result<()> {
        self.lock().record_value(id, value)
    }

    /// Copy of every sensor, consistent as of one lock acquisition
    pub fn snapshot(&self) -> Vec<SensorSnapshot> {
        self.lock().snapshot()
    }
}

/// Scoped access to the registry; the lock is released on drop
pub struct RegistryGuard<'a> {
    inner: MutexGuard<'a, RegistryInner>,
}

impl RegistryGuard<'_> {
    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }

    /// Visit every sensor in creation order
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(SensorView<'_>),
    {
        for (i, record) in self.inner.records.iter().enumerate() {
            visitor(record.view(i));
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<SensorSnapshot> {
        let &i = self.inner.index.get(name)?;
        self.inner.records.get(i).map(|r| r.view(i).to_snapshot())
    }

    /// Set a new threshold, returning the previous one
    pub fn update_threshold(&mut self, name: &str, threshold: f64) -> Result<f64> {
        let i = *self
            .inner
            .index
            .get(name)
            .ok_or_else(|| SensorLoopError::not_found(name))?;
        let record = &mut self.inner.records[i];
        let previous = record.threshold;
        record.threshold = threshold;
        Ok(previous)
    }

    /// Publish a fresh reading
    pub fn record_value(&mut self, id: SensorId, value: f64) -> Result<()> {
        let record = self
            .inner
            .records
            .get_mut(id.0)
            .ok_or_else(|| SensorLoopError::not_found(id.to_string()))?;
        record.value = value;
        record.readings += 1;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<SensorSnapshot> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|s| out.push(s.to_snapshot()));
        out
    }
}
