//! Append-only audit file.
//!
//! One line per [`AuditEvent`], prefixed with a local timestamp:
//!
//! ```text
//! 2026-03-14 09:12:44,518:Simulation Started
//! 2026-03-14 09:12:46,733:Read weight for P1: 3 kg
//! 2026-03-14 09:12:46,733:Actuator: moving P1 to output belt 1
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use sortline_core::AuditEvent;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Writes timestamped audit lines to any sink.
#[derive(Debug)]
pub struct AuditLog<W: Write> {
    out: W,
    lines: u64,
}

impl AuditLog<BufWriter<File>> {
    /// Open `path` for appending (creating it if needed) and write the
    /// start marker.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> AuditLog<W> {
    /// Wrap `out` and write the start marker.
    pub fn new(out: W) -> io::Result<Self> {
        let mut log = Self { out, lines: 0 };
        log.write_line("Simulation Started")?;
        Ok(log)
    }

    /// Append one event.
    pub fn record(&mut self, event: &AuditEvent) -> io::Result<()> {
        self.write_line(event)
    }

    /// Append every event in order.
    pub fn record_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a AuditEvent>,
    ) -> io::Result<()> {
        for event in events {
            self.record(event)?;
        }
        Ok(())
    }

    /// Lines written so far, start marker included.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and return the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_line(&mut self, body: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{}:{body}", Local::now().format(TIMESTAMP_FORMAT))?;
        self.lines += 1;
        Ok(())
    }
}
