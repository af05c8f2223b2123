// ## 📂 File: `src/limit/mod.rs`

//! limit/mod.rs
//! Capacity-limited proxy: a [`Meter`] plus one byte ceiling per direction.
//!
//! Before delegating, a limit compares the request with the capacity left
//! under the ceiling:
//! - `Unlimited` ceiling: delegate unchanged.
//! - nothing left: refuse with 0 bytes and a `LimitError`, endpoint untouched.
//! - request too large: shrink it to what is left and report the shrunken
//!   count together with a `LimitError`, unless the endpoint itself failed,
//!   in which case the endpoint's error is returned instead.
//!
//! Drains cannot see the length of their source, so a drain refused at an
//! exhausted ceiling reports `requested = 0`. A bounded drain that stops at
//! the ceiling reports no error; one whose source ends first reports
//! `UnexpectedEof` with the bytes it did move.
//!
//! Check, truncate, transfer, and count are separate steps: under concurrent
//! ceiling or counter updates a ceiling is a best-effort bound.

pub mod ceilings;

pub use ceilings::Ceilings;

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::config::LimitConfig;
use crate::endpoint::{Close, Nil, Shared};
use crate::error::{LimitError, ValveError};
use crate::limit::ceilings::remaining;
use crate::meter::Meter;
use crate::types::{Ceiling, Op, Transfer};

/// Restricts the cumulative bytes read from `R` and written to `W`.
#[derive(Debug)]
pub struct Limit<R = Nil, W = Nil> {
    meter: Meter<R, W>,
    ceilings: Arc<Ceilings>,
}

impl<R> Limit<R, Nil> {
    pub fn reader(reader: R, read_max: impl Into<Ceiling>) -> Self {
        Self::from_meter(Meter::reader(reader), read_max, Ceiling::Unlimited)
    }
}

impl<W> Limit<Nil, W> {
    pub fn writer(writer: W, write_max: impl Into<Ceiling>) -> Self {
        Self::from_meter(Meter::writer(writer), Ceiling::Unlimited, write_max)
    }
}

impl<T> Limit<Shared<T>, Shared<T>> {
    pub fn read_write(endpoint: T, read_max: impl Into<Ceiling>, write_max: impl Into<Ceiling>) -> Self {
        Self::from_meter(Meter::read_write(endpoint), read_max, write_max)
    }
}

impl Limit<Nil, Nil> {
    pub fn detached() -> Self {
        Self::from_meter(Meter::detached(), Ceiling::Unlimited, Ceiling::Unlimited)
    }
}

impl<R, W> Limit<R, W> {
    pub fn new(reader: R, read_max: impl Into<Ceiling>, writer: W, write_max: impl Into<Ceiling>) -> Self {
        Self::from_meter(Meter::new(reader, writer), read_max, write_max)
    }

    pub fn from_meter(meter: Meter<R, W>, read_max: impl Into<Ceiling>, write_max: impl Into<Ceiling>) -> Self {
        Self {
            meter,
            ceilings: Arc::new(Ceilings::new(read_max.into(), write_max.into())),
        }
    }

    pub fn with_config(meter: Meter<R, W>, config: &LimitConfig) -> Self {
        Self::from_meter(meter, config.read_max, config.write_max)
    }

    pub fn can_read(&self) -> bool {
        self.meter.can_read()
    }

    pub fn can_write(&self) -> bool {
        self.meter.can_write()
    }

    pub fn meter(&self) -> &Meter<R, W> {
        &self.meter
    }

    /// Transfers made directly on the meter bypass the ceilings.
    pub fn meter_mut(&mut self) -> &mut Meter<R, W> {
        &mut self.meter
    }

    pub fn into_meter(self) -> Meter<R, W> {
        self.meter
    }

    /// Shared handle to the ceilings, for adjusting them from elsewhere.
    pub fn ceilings(&self) -> Arc<Ceilings> {
        Arc::clone(&self.ceilings)
    }

    pub fn config(&self) -> LimitConfig {
        LimitConfig {
            read_max: self.max_count_read(),
            write_max: self.max_count_write(),
        }
    }

    pub fn count(&self) -> (i64, i64) {
        self.meter.count()
    }

    pub fn count_read(&self) -> i64 {
        self.meter.count_read()
    }

    pub fn count_write(&self) -> i64 {
        self.meter.count_write()
    }

    // ================= Ceilings =================

    pub fn max_count(&self) -> (Ceiling, Ceiling) {
        (self.max_count_read(), self.max_count_write())
    }

    pub fn max_count_read(&self) -> Ceiling {
        self.ceilings.read()
    }

    pub fn max_count_write(&self) -> Ceiling {
        self.ceilings.write()
    }

    pub fn set_max_count(&self, read: impl Into<Ceiling>, write: impl Into<Ceiling>) {
        self.set_max_count_read(read);
        self.set_max_count_write(write);
    }

    pub fn set_max_count_read(&self, read: impl Into<Ceiling>) {
        self.ceilings.set_read(read.into());
    }

    pub fn set_max_count_write(&self, write: impl Into<Ceiling>) {
        self.ceilings.set_write(write.into());
    }

    /// Bytes left before each ceiling; `None` for an unlimited direction.
    pub fn remaining_count(&self) -> (Option<i64>, Option<i64>) {
        (self.remaining_count_read(), self.remaining_count_write())
    }

    /// Read ceiling minus bytes read; negative once the ceiling is lowered
    /// below what was already consumed.
    pub fn remaining_count_read(&self) -> Option<i64> {
        remaining(self.max_count_read(), self.count_read())
    }

    pub fn remaining_count_write(&self) -> Option<i64> {
        remaining(self.max_count_write(), self.count_write())
    }

    // ================= Limit errors =================

    /// The error a short read of `accepted` out of `requested` bytes reports.
    pub fn read_limit_error(&self, requested: u64, accepted: u64) -> ValveError {
        self.limit_error(Op::Read, requested, accepted)
    }

    /// The error a short write of `accepted` out of `requested` bytes reports.
    pub fn write_limit_error(&self, requested: u64, accepted: u64) -> ValveError {
        self.limit_error(Op::Write, requested, accepted)
    }

    fn limit_error(&self, op: Op, requested: u64, accepted: u64) -> ValveError {
        LimitError::new(self.ceilings(), op, requested, accepted).into()
    }

    /// Grants at most `rem` of `requested` bytes. Returns the granted amount
    /// and the error to report if the call otherwise succeeds, or the refusal
    /// when nothing is left.
    fn admit(&self, op: Op, requested: u64, rem: i64) -> Result<(u64, Option<ValveError>), ValveError> {
        if rem <= 0 {
            tracing::debug!(op = %op, requested, remaining = rem, "ceiling exhausted, refusing transfer");
            return Err(self.limit_error(op, requested, 0));
        }
        let rem = rem as u64;
        if requested > rem {
            tracing::debug!(op = %op, requested, accepted = rem, "truncating transfer at ceiling");
            return Ok((rem, Some(self.limit_error(op, requested, rem))));
        }
        Ok((requested, None))
    }
}

/// Endpoint errors win over the pending limit error.
fn settle(t: Transfer<usize>, pending: Option<ValveError>) -> Transfer<usize> {
    match t.error {
        Some(_) => t,
        None => Transfer::new(t.count, pending),
    }
}

// ================= Reading side =================

impl<R: Read, W> Limit<R, W> {
    pub fn read(&mut self, buf: &mut [u8]) -> Transfer<usize> {
        if !self.can_read() {
            return Transfer::refused(ValveError::closed_endpoint());
        }
        let Some(rem) = self.remaining_count_read() else {
            return self.meter.read(buf);
        };
        let (granted, pending) = match self.admit(Op::Read, buf.len() as u64, rem) {
            Ok(grant) => grant,
            Err(refusal) => return Transfer::refused(refusal),
        };
        let t = self.meter.read(&mut buf[..granted as usize]);
        settle(t, pending)
    }

    /// Drains the reader into `sink`, stopping at the read ceiling.
    pub fn write_to<D: Write + ?Sized>(&mut self, sink: &mut D) -> Transfer<u64> {
        if !self.can_read() {
            return Transfer::refused(ValveError::closed_endpoint());
        }
        let Some(rem) = self.remaining_count_read() else {
            return self.meter.write_to(sink);
        };
        match self.admit(Op::Read, 0, rem) {
            Ok(_) => self.meter.drain_to(sink, Some(rem as u64)),
            Err(refusal) => Transfer::refused(refusal),
        }
    }
}

// ================= Writing side =================

impl<R, W: Write> Limit<R, W> {
    pub fn write(&mut self, buf: &[u8]) -> Transfer<usize> {
        if !self.can_write() {
            return Transfer::refused(ValveError::closed_endpoint());
        }
        let Some(rem) = self.remaining_count_write() else {
            return self.meter.write(buf);
        };
        let (granted, pending) = match self.admit(Op::Write, buf.len() as u64, rem) {
            Ok(grant) => grant,
            Err(refusal) => return Transfer::refused(refusal),
        };
        let t = self.meter.write(&buf[..granted as usize]);
        settle(t, pending)
    }

    /// Drains `source` into the writer, stopping at the write ceiling.
    pub fn read_from<S: Read + ?Sized>(&mut self, source: &mut S) -> Transfer<u64> {
        if !self.can_write() {
            return Transfer::refused(ValveError::closed_endpoint());
        }
        let Some(rem) = self.remaining_count_write() else {
            return self.meter.read_from(source);
        };
        match self.admit(Op::Write, 0, rem) {
            Ok(_) => self.meter.drain_from(source, Some(rem as u64)),
            Err(refusal) => Transfer::refused(refusal),
        }
    }

    pub fn flush(&mut self) -> Result<(), ValveError> {
        self.meter.flush()
    }
}

impl<R: Close, W: Close> Limit<R, W> {
    /// Closes the underlying meter's endpoints.
    pub fn close(&mut self) -> Result<(), ValveError> {
        self.meter.close()
    }
}

// ================= std::io adapters =================

impl<R: Read, W> Read for Limit<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Limit::read(self, buf).into_io()
    }
}

impl<R, W: Write> Write for Limit<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Limit::write(self, buf).into_io()
    }

    fn flush(&mut self) -> io::Result<()> {
        Limit::flush(self).map_err(io::Error::from)
    }
}

impl<R: Close, W: Close> Close for Limit<R, W> {
    fn close(&mut self) -> io::Result<()> {
        Limit::close(self).map_err(io::Error::from)
    }
}
