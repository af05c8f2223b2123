// ## 📂 File: `src/meter/mod.rs`

//! meter/mod.rs
//! Counting proxy over an optional reader and an optional writer.
//!
//! Every transfer entry point delegates to the bound endpoint and advances the
//! matching counter by the bytes actually moved:
//!
//! | entry point          | endpoint | counter |
//! |----------------------|----------|---------|
//! | [`Meter::read`]      | reader   | read    |
//! | [`Meter::write_to`]  | reader   | read    |
//! | [`Meter::write`]     | writer   | write   |
//! | [`Meter::read_from`] | writer   | write   |
//!
//! A direction with no endpoint fails with `ClosedEndpoint`. Endpoint errors
//! pass through untouched.

pub mod copy;
pub mod counters;

pub use counters::{ByteCounters, MeterSnapshot};

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::endpoint::{Close, Nil, Shared};
use crate::error::{Cause, ValveError};
use crate::meter::copy::copy_counted;
use crate::meter::counters::as_count;
use crate::types::{Op, Transfer};

/// Counts the bytes read from `R` and written to `W`.
#[derive(Debug)]
pub struct Meter<R = Nil, W = Nil> {
    reader: Option<R>,
    writer: Option<W>,
    counters: Arc<ByteCounters>,
}

impl<R> Meter<R, Nil> {
    /// Read-only meter.
    pub fn reader(reader: R) -> Self {
        Self::from_parts(Some(reader), None)
    }
}

impl<W> Meter<Nil, W> {
    /// Write-only meter.
    pub fn writer(writer: W) -> Self {
        Self::from_parts(None, Some(writer))
    }
}

impl<T> Meter<Shared<T>, Shared<T>> {
    /// Meter over one endpoint used for both reading and writing.
    pub fn read_write(endpoint: T) -> Self {
        let shared = Shared::new(endpoint);
        Self::new(shared.clone(), shared)
    }
}

impl Meter<Nil, Nil> {
    /// Meter with no endpoints; every transfer fails with `ClosedEndpoint`.
    pub fn detached() -> Self {
        Self::from_parts(None, None)
    }
}

impl<R, W> Meter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self::from_parts(Some(reader), Some(writer))
    }

    pub fn from_parts(reader: Option<R>, writer: Option<W>) -> Self {
        Self {
            reader,
            writer,
            counters: Arc::new(ByteCounters::new()),
        }
    }

    pub fn can_read(&self) -> bool {
        self.reader.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.writer.is_some()
    }

    pub fn get_reader(&self) -> Option<&R> {
        self.reader.as_ref()
    }

    pub fn get_writer(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    /// Bytes moved through the returned reference are not counted.
    pub fn get_reader_mut(&mut self) -> Option<&mut R> {
        self.reader.as_mut()
    }

    /// Bytes moved through the returned reference are not counted.
    pub fn get_writer_mut(&mut self) -> Option<&mut W> {
        self.writer.as_mut()
    }

    pub fn into_parts(self) -> (Option<R>, Option<W>) {
        (self.reader, self.writer)
    }

    /// Shared handle to the counters, usable from other threads while the
    /// meter is busy transferring.
    pub fn counters(&self) -> Arc<ByteCounters> {
        Arc::clone(&self.counters)
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        self.counters.snapshot()
    }

    // ================= Counters =================

    /// Total bytes read and written.
    pub fn count(&self) -> (i64, i64) {
        (self.count_read(), self.count_write())
    }

    pub fn count_read(&self) -> i64 {
        self.counters.read()
    }

    pub fn count_write(&self) -> i64 {
        self.counters.write()
    }

    /// Adds to both counters and returns the new values.
    pub fn add_count(&self, read: i64, write: i64) -> (i64, i64) {
        (self.add_count_read(read), self.add_count_write(write))
    }

    pub fn add_count_read(&self, n: i64) -> i64 {
        self.counters.add_read(n)
    }

    pub fn add_count_write(&self, n: i64) -> i64 {
        self.counters.add_write(n)
    }

    pub fn set_count(&self, read: i64, write: i64) {
        self.set_count_read(read);
        self.set_count_write(write);
    }

    pub fn set_count_read(&self, n: i64) {
        self.counters.set_read(n);
    }

    pub fn set_count_write(&self, n: i64) {
        self.counters.set_write(n);
    }

    pub fn reset_count(&self) {
        self.set_count(0, 0);
    }

    pub fn reset_count_read(&self) {
        self.set_count_read(0);
    }

    pub fn reset_count_write(&self) {
        self.set_count_write(0);
    }
}

// ================= Reading side =================

impl<R: Read, W> Meter<R, W> {
    /// Reads into `buf` and counts the bytes returned.
    pub fn read(&mut self, buf: &mut [u8]) -> Transfer<usize> {
        let Some(reader) = self.reader.as_mut() else {
            return Transfer::refused(ValveError::closed_endpoint());
        };
        match reader.read(buf) {
            Ok(n) => {
                self.counters.add_read(as_count(n as u64));
                Transfer::done(n)
            }
            Err(e) => Transfer::failed(0, e.into()),
        }
    }

    /// Drains the reader into `sink` until EOF or error.
    pub fn write_to<D: Write + ?Sized>(&mut self, sink: &mut D) -> Transfer<u64> {
        self.drain_to(sink, None)
    }

    pub(crate) fn drain_to<D: Write + ?Sized>(&mut self, sink: &mut D, limit: Option<u64>) -> Transfer<u64> {
        let Some(reader) = self.reader.as_mut() else {
            return Transfer::refused(ValveError::closed_endpoint());
        };
        let (n, err) = copy_counted(reader, sink, limit);
        self.counters.add_read(as_count(n));
        tracing::trace!(op = %Op::Read, bytes = n, "drained reader into sink");
        Transfer::new(n, err.map(ValveError::from))
    }
}

// ================= Writing side =================

impl<R, W: Write> Meter<R, W> {
    /// Writes from `buf` and counts the bytes accepted.
    pub fn write(&mut self, buf: &[u8]) -> Transfer<usize> {
        let Some(writer) = self.writer.as_mut() else {
            return Transfer::refused(ValveError::closed_endpoint());
        };
        match writer.write(buf) {
            Ok(n) => {
                self.counters.add_write(as_count(n as u64));
                Transfer::done(n)
            }
            Err(e) => Transfer::failed(0, e.into()),
        }
    }

    /// Drains `source` into the writer until EOF or error.
    pub fn read_from<S: Read + ?Sized>(&mut self, source: &mut S) -> Transfer<u64> {
        self.drain_from(source, None)
    }

    pub(crate) fn drain_from<S: Read + ?Sized>(&mut self, source: &mut S, limit: Option<u64>) -> Transfer<u64> {
        let Some(writer) = self.writer.as_mut() else {
            return Transfer::refused(ValveError::closed_endpoint());
        };
        let (n, err) = copy_counted(source, writer, limit);
        self.counters.add_write(as_count(n));
        tracing::trace!(op = %Op::Write, bytes = n, "drained source into writer");
        Transfer::new(n, err.map(ValveError::from))
    }

    /// Flushes the writer; a meter without one has nothing to flush.
    pub fn flush(&mut self) -> Result<(), ValveError> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush().map_err(ValveError::from),
            None => Ok(()),
        }
    }
}

// ================= Close =================

impl<R: Close, W: Close> Meter<R, W> {
    /// Closes the reader, then the writer, joining every failure into one
    /// `Close` error. Counters stay readable afterwards.
    pub fn close(&mut self) -> Result<(), ValveError> {
        let mut failures = Vec::new();
        if let Some(reader) = self.reader.as_mut() {
            if let Err(e) = reader.close() {
                failures.push(ValveError::from(e));
            }
        }
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.close() {
                failures.push(ValveError::from(e));
            }
        }
        match ValveError::join(Cause::Close, failures) {
            None => Ok(()),
            Some(err) => {
                tracing::debug!(failures = err.wrapped().len(), "endpoint close failed");
                Err(err)
            }
        }
    }
}

// ================= std::io adapters =================

impl<R: Read, W> Read for Meter<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Meter::read(self, buf).into_io()
    }
}

impl<R, W: Write> Write for Meter<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Meter::write(self, buf).into_io()
    }

    fn flush(&mut self) -> io::Result<()> {
        Meter::flush(self).map_err(io::Error::from)
    }
}

impl<R: Close, W: Close> Close for Meter<R, W> {
    fn close(&mut self) -> io::Result<()> {
        Meter::close(self).map_err(io::Error::from)
    }
}
