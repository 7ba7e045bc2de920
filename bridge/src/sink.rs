//! Output sinks for re-entrant entry points

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory sink whose clones share one buffer
///
/// Hand one clone to a [`LibraryEntry`](crate::LibraryEntry) and keep the
/// other to read the output afterwards.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Return the captured bytes and reset the buffer
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.lock())
    }

    // A writer that panicked mid-write still left valid bytes behind.
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that turns each output line into an `info` log record
#[derive(Debug)]
pub struct LogSink {
    target: String,
    pending: Vec<u8>,
}

impl LogSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            pending: Vec::new(),
        }
    }

    fn emit(&self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        log::info!(target: self.target.as_str(), "{}", line.trim_end_matches('\r'));
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("argv_bridge::output")
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.emit(&line[..end]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
        Ok(())
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
