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

//! Sensor log sink
//!
//! Append-only text log of registry snapshots. Each block is one
//! `"<name>: <value>"` line per sensor followed by a `"----"` separator, and
//! the writer is flushed after every block.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sl_error::{Result, SensorLoopError};

use crate::constants::log_format;
use crate::registry::SensorSnapshot;

/// Format one snapshot block, separator included
pub fn format_block(snapshot: &[SensorSnapshot]) -> String {
    let mut out = String::new();
    for s in snapshot {
        out.push_str(&format!("{}: {}\n", s.name, s.value));
    }
    out.push_str(log_format::SEPARATOR);
    out.push('\n');
    out
}

pub struct SensorLog<W: Write = BufWriter<File>> {
    path: PathBuf,
    writer: W,
    blocks: u64,
}

impl SensorLog {
    /// Open `path` for appending, creating it and its parent directory if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let _ = fs::create_dir_all(parent);
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SensorLoopError::SinkUnavailable {
                path: path.clone(),
                source,
            })?;
        Ok(Self::from_writer(path, BufWriter::new(file)))
    }
}

impl<W: Write> SensorLog<W> {
    /// Wrap an arbitrary writer; `path` is only used in error reports
    pub fn from_writer(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
            blocks: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks successfully written since open
    pub fn blocks_written(&self) -> u64 {
        self.blocks
    }

    /// Append one block and flush
    pub fn append(&mut self, snapshot: &[SensorSnapshot]) -> Result<()> {
        let block = format_block(snapshot);
        self.writer
            .write_all(block.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|source| SensorLoopError::TransientWrite {
                path: self.path.clone(),
                source,
            })?;
        self.blocks += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SensorRegistry;
    use std::io;
    use tempfile::TempDir;

    fn snapshot() -> Vec<SensorSnapshot> {
        let reg = SensorRegistry::new([("Temperature", 25.0), ("Humidity", 30.0)]).unwrap();
        let entries = reg.entries();
        reg.record_value(entries[0].0, 26.5).unwrap();
        reg.record_value(entries[1].0, 35.0).unwrap();
        reg.snapshot()
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_block_layout() {
        assert_eq!(format_block(&snapshot()), "Temperature: 26.5\nHumidity: 35\n----\n");
    }

    #[test]
    fn test_append_to_file_accumulates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("sensor_log.txt");
        let mut log = SensorLog::open(&path).unwrap();
        log.append(&snapshot()).unwrap();
        log.append(&snapshot()).unwrap();
        assert_eq!(log.blocks_written(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("----").count(), 2);
        assert!(content.starts_with("Temperature: 26.5\n"));
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sensor_log.txt");
        fs::write(&path, "previous run\n").unwrap();
        SensorLog::open(&path).unwrap().append(&snapshot()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous run\n"));
    }

    #[test]
    fn test_open_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = SensorLog::open(dir.path()).err().unwrap();
        assert!(matches!(err, SensorLoopError::SinkUnavailable { .. }));
    }

    #[test]
    fn test_write_failure_is_transient() {
        let mut log = SensorLog::from_writer("broken.txt", FailingWriter);
        let err = log.append(&snapshot()).unwrap_err();
        assert!(matches!(err, SensorLoopError::TransientWrite { .. }));
        assert_eq!(log.blocks_written(), 0);
    }
}
