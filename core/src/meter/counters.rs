// ### `src/meter/counters.rs`

//! meter/counters.rs
//! Atomic byte counters shared between a meter and any observers.
//!
//! Summary: two independent `i64` counters. Each add/load/store is atomic on
//! its own; combined operations are plain pairs with no joint atomicity.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

/// Cumulative read and write byte counts.
#[derive(Debug, Default)]
pub struct ByteCounters {
    read: AtomicI64,
    write: AtomicI64,
}

// Counters carry no ordering relationship with the bytes they describe.
const ORD: Ordering = Ordering::Relaxed;

impl ByteCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> i64 {
        self.read.load(ORD)
    }

    pub fn write(&self) -> i64 {
        self.write.load(ORD)
    }

    /// Adds `n` to the read count and returns the new value.
    pub fn add_read(&self, n: i64) -> i64 {
        saturating_add(&self.read, n)
    }

    /// Adds `n` to the write count and returns the new value.
    pub fn add_write(&self, n: i64) -> i64 {
        saturating_add(&self.write, n)
    }

    pub fn set_read(&self, n: i64) {
        self.read.store(n, ORD);
    }

    pub fn set_write(&self, n: i64) {
        self.write.store(n, ORD);
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            read: self.read(),
            write: self.write(),
        }
    }
}

/// Point-in-time copy of a meter's counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    pub read: i64,
    pub write: i64,
}

impl MeterSnapshot {
    pub fn total(&self) -> i64 {
        self.read.saturating_add(self.write)
    }
}

// Counters pin at the i64 bounds instead of wrapping.
fn saturating_add(cell: &AtomicI64, n: i64) -> i64 {
    let prev = cell
        .fetch_update(ORD, ORD, |v| Some(v.saturating_add(n)))
        .unwrap_or_else(|v| v);
    prev.saturating_add(n)
}

/// Saturating `u64` to counter conversion for transfer sizes.
pub(crate) fn as_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
