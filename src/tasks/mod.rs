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

//! Periodic and blocking tasks
//!
//! Every task runs on its own OS thread. Periodic tasks do one cycle, then
//! sleep for their period in short slices so a shutdown request is noticed
//! within [`timing::SHUTDOWN_POLL`].

pub mod actuation;
pub mod command;
pub mod input;
pub mod logging;
pub mod sensing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::timing;

pub use actuation::ActuationTask;
pub use command::{CommandProcessor, DrainReport};
pub use input::{parse_command, InputCapture, InputSummary};
pub use logging::LoggingTask;
pub use sensing::{SensingTask, SweepReport};

/// Process-wide stop request, cloned into every task
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `period`, waking early on shutdown.
    ///
    /// Returns false if shutdown was requested.
    pub fn sleep(&self, period: Duration) -> bool {
        let deadline = Instant::now() + period;
        loop {
            if self.is_triggered() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(timing::SHUTDOWN_POLL));
        }
    }
}
