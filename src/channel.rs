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

//! Command channel
//!
//! Unbounded FIFO of threshold updates between the input capture task (single
//! producer) and the command processor (single consumer). It has its own lock,
//! independent of the sensor registry. Draining takes the whole queue in one
//! critical section and runs the handler afterwards, so the channel lock is
//! never held while a handler touches the registry.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use sl_error::{Result, SensorLoopError};

/// Operator request to change one sensor's threshold
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCommand {
    pub sensor: String,
    pub threshold: f64,
}

impl ThresholdCommand {
    pub fn new(sensor: impl Into<String>, threshold: f64) -> Self {
        Self {
            sensor: sensor.into(),
            threshold,
        }
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    queue: VecDeque<ThresholdCommand>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct CommandChannel {
    state: Mutex<ChannelState>,
    ready: Condvar,
}

impl CommandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. Never blocks; fails only after [`close`](Self::close).
    pub fn enqueue(&self, command: ThresholdCommand) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SensorLoopError::ChannelClosed);
        }
        trace!(sensor = %command.sensor, threshold = command.threshold, "Command enqueued");
        state.queue.push_back(command);
        drop(state);
        self.ready.notify_one();
        Ok(())
    }

    /// Remove every queued command in FIFO order
    pub fn drain(&self) -> Vec<ThresholdCommand> {
        self.state.lock().queue.drain(..).collect()
    }

    /// Drain the queue, then hand each command to `handler` with the lock released.
    ///
    /// Returns the number of commands handled.
    pub fn drain_all<F>(&self, handler: F) -> usize
    where
        F: FnMut(ThresholdCommand),
    {
        let batch = self.drain();
        let count = batch.len();
        batch.into_iter().for_each(handler);
        count
    }

    /// Like [`drain_all`](Self::drain_all), but first waits up to `timeout` for
    /// a command to arrive. Returns early when the channel is closed.
    pub fn wait_drain_all<F>(&self, timeout: Duration, handler: F) -> usize
    where
        F: FnMut(ThresholdCommand),
    {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.queue.is_empty() && !state.closed {
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        let batch: Vec<ThresholdCommand> = state.queue.drain(..).collect();
        drop(state);
        let count = batch.len();
        batch.into_iter().for_each(handler);
        count
    }

    /// Refuse further commands and wake any waiting consumer.
    ///
    /// Commands already queued can still be drained.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_yields_fifo_and_empties() {
        let channel = CommandChannel::new();
        for i in 0..5 {
            channel.enqueue(ThresholdCommand::new(format!("s{}", i), f64::from(i))).unwrap();
        }
        let mut seen = Vec::new();
        let n = channel.drain_all(|c| seen.push(c.sensor));
        assert_eq!(n, 5);
        assert_eq!(seen, vec!["s0", "s1", "s2", "s3", "s4"]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_drain_empty_channel() {
        let channel = CommandChannel::new();
        assert_eq!(channel.drain_all(|_| panic!("no commands expected")), 0);
    }

    #[test]
    fn test_handler_runs_without_channel_lock() {
        // Re-entering the channel from the handler would deadlock if the
        // lock were still held.
        let channel = CommandChannel::new();
        channel.enqueue(ThresholdCommand::new("Temperature", 30.0)).unwrap();
        channel.drain_all(|_| {
            assert_eq!(channel.len(), 0);
            channel.enqueue(ThresholdCommand::new("Humidity", 40.0)).unwrap();
        });
        assert_eq!(channel.drain(), vec![ThresholdCommand::new("Humidity", 40.0)]);
    }

    #[test]
    fn test_enqueue_after_close_fails() {
        let channel = CommandChannel::new();
        channel.enqueue(ThresholdCommand::new("a", 1.0)).unwrap();
        channel.close();
        assert!(matches!(
            channel.enqueue(ThresholdCommand::new("b", 2.0)),
            Err(SensorLoopError::ChannelClosed)
        ));
        assert_eq!(channel.drain().len(), 1);
    }

    #[test]
    fn test_wait_drain_times_out_when_idle() {
        let channel = CommandChannel::new();
        let start = Instant::now();
        let n = channel.wait_drain_all(Duration::from_millis(30), |_| {});
        assert_eq!(n, 0);
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_wait_drain_wakes_on_enqueue() {
        let channel = Arc::new(CommandChannel::new());
        let producer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                channel.enqueue(ThresholdCommand::new("Temperature", 30.0)).unwrap();
            })
        };
        let mut got = Vec::new();
        let mut total = 0;
        let start = Instant::now();
        while total == 0 && start.elapsed() < Duration::from_secs(5) {
            total += channel.wait_drain_all(Duration::from_secs(1), |c| got.push(c));
        }
        producer.join().unwrap();
        assert_eq!(got, vec![ThresholdCommand::new("Temperature", 30.0)]);
    }

    #[test]
    fn test_wait_drain_returns_on_close() {
        let channel = Arc::new(CommandChannel::new());
        let closer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                channel.close();
            })
        };
        let start = Instant::now();
        channel.wait_drain_all(Duration::from_secs(10), |_| {});
        closer.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(channel.is_closed());
    }
}
