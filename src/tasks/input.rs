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

//! Input capture: operator commands from a line-oriented reader
//!
//! Each line is `<name> <threshold>`. Valid lines are queued on the command
//! channel and confirmed; anything else is reported and discarded. Reads
//! block with no timeout, so the shutdown flag is only seen between lines.
//! End of input ends the task.

use std::io::{BufRead, ErrorKind, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use sl_error::{Result, SensorLoopError};

use super::Shutdown;
use crate::channel::{CommandChannel, ThresholdCommand};
use crate::constants::operator;

/// Parse one line of operator input
pub fn parse_command(line: &str) -> Result<ThresholdCommand> {
    let mut parts = line.split_whitespace();
    let name = parts
        .next()
        .ok_or_else(|| SensorLoopError::parse(line, "empty line"))?;
    let raw = parts
        .next()
        .ok_or_else(|| SensorLoopError::parse(line, "missing threshold"))?;
    if parts.next().is_some() {
        return Err(SensorLoopError::parse(line, "expected exactly two fields"));
    }
    let threshold: f64 = raw
        .parse()
        .map_err(|_| SensorLoopError::parse(line, format!("{:?} is not a number", raw)))?;
    if !threshold.is_finite() {
        return Err(SensorLoopError::parse(line, "threshold must be finite"));
    }
    Ok(ThresholdCommand::new(name, threshold))
}

/// Counts from one input session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputSummary {
    pub queued: usize,
    pub rejected: usize,
}

pub struct InputCapture {
    channel: Arc<CommandChannel>,
}

impl InputCapture {
    pub fn new(channel: Arc<CommandChannel>) -> Self {
        Self { channel }
    }

    /// Prompt, read and queue commands until end of input, shutdown, or a
    /// closed channel.
    pub fn run<R, W>(&self, mut input: R, mut output: W, shutdown: &Shutdown) -> Result<InputSummary>
    where
        R: BufRead,
        W: Write,
    {
        let mut summary = InputSummary::default();
        let mut line = String::new();
        info!("Input capture started");
        while !shutdown.is_triggered() {
            write!(output, "{}", operator::PROMPT)?;
            output.flush()?;

            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => {
                    debug!("End of operator input");
                    break;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!(error = %e, "Unreadable operator input");
                    writeln!(output, "{}", operator::INVALID_INPUT)?;
                    summary.rejected += 1;
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }

            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(command) => {
                    let (name, threshold) = (command.sensor.clone(), command.threshold);
                    if let Err(e) = self.channel.enqueue(command) {
                        warn!(error = %e, "Command dropped, input capture stopping");
                        break;
                    }
                    writeln!(output, "Command queued: {} with threshold {}", name, threshold)?;
                    output.flush()?;
                    summary.queued += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    writeln!(output, "{}", operator::INVALID_INPUT)?;
                    summary.rejected += 1;
                }
            }
        }
        info!(queued = summary.queued, rejected = summary.rejected, "Input capture stopped");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_command("Temperature 25").unwrap(), ThresholdCommand::new("Temperature", 25.0));
        assert_eq!(parse_command("  Humidity\t40.5 \n").unwrap(), ThresholdCommand::new("Humidity", 40.5));
        assert_eq!(parse_command("Temperature -3.5").unwrap().threshold, -3.5);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "Temperature", "Temperature abc", "Temperature 25 extra", "Temperature NaN", "Humidity inf"] {
            let err = parse_command(bad).unwrap_err();
            assert!(matches!(err, SensorLoopError::Parse { .. }), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_run_queues_valid_and_reports_invalid() {
        let channel = Arc::new(CommandChannel::new());
        let capture = InputCapture::new(Arc::clone(&channel));
        let input = Cursor::new("Temperature 30\nnonsense\n\nHumidity 40\n");
        let mut out = Vec::new();

        let summary = capture.run(input, &mut out, &Shutdown::new()).unwrap();
        assert_eq!(summary, InputSummary { queued: 2, rejected: 1 });
        assert_eq!(
            channel.drain(),
            vec![ThresholdCommand::new("Temperature", 30.0), ThresholdCommand::new("Humidity", 40.0)]
        );

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Command queued: Temperature with threshold 30"));
        assert!(text.contains(operator::INVALID_INPUT));
        assert!(text.starts_with(operator::PROMPT));
    }

    #[test]
    fn test_run_skips_non_utf8_line() {
        let channel = Arc::new(CommandChannel::new());
        let capture = InputCapture::new(Arc::clone(&channel));
        let mut bytes = vec![0xff, 0xfe, b'\n'];
        bytes.extend_from_slice(b"Temperature 31\n");
        let summary = capture.run(Cursor::new(bytes), Vec::new(), &Shutdown::new()).unwrap();
        assert_eq!(summary, InputSummary { queued: 1, rejected: 1 });
    }

    #[test]
    fn test_run_stops_when_channel_closed() {
        let channel = Arc::new(CommandChannel::new());
        channel.close();
        let capture = InputCapture::new(Arc::clone(&channel));
        let summary = capture
            .run(Cursor::new("Temperature 30\nHumidity 40\n"), Vec::new(), &Shutdown::new())
            .unwrap();
        assert_eq!(summary.queued, 0);
    }

    #[test]
    fn test_run_honours_shutdown_before_reading() {
        let channel = Arc::new(CommandChannel::new());
        let capture = InputCapture::new(Arc::clone(&channel));
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut out = Vec::new();
        capture.run(Cursor::new("Temperature 30\n"), &mut out, &shutdown).unwrap();
        assert!(out.is_empty());
        assert!(channel.is_empty());
    }
}
