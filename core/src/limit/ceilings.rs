// ### `src/limit/ceilings.rs`

//! limit/ceilings.rs
//! Per-direction byte ceilings, shared between a limit, its errors, and any
//! controller that adjusts them at runtime.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::Ceiling;

#[derive(Debug)]
pub struct Ceilings {
    read: AtomicI64,
    write: AtomicI64,
}

const ORD: Ordering = Ordering::Relaxed;

impl Ceilings {
    pub fn new(read: Ceiling, write: Ceiling) -> Self {
        Self {
            read: AtomicI64::new(read.to_raw()),
            write: AtomicI64::new(write.to_raw()),
        }
    }

    pub fn read(&self) -> Ceiling {
        Ceiling::from_raw(self.read.load(ORD))
    }

    pub fn write(&self) -> Ceiling {
        Ceiling::from_raw(self.write.load(ORD))
    }

    /// Takes effect on the next transfer.
    pub fn set_read(&self, ceiling: Ceiling) {
        self.read.store(ceiling.to_raw(), ORD);
    }

    /// Takes effect on the next transfer.
    pub fn set_write(&self, ceiling: Ceiling) {
        self.write.store(ceiling.to_raw(), ORD);
    }
}

impl Default for Ceilings {
    fn default() -> Self {
        Self::new(Ceiling::Unlimited, Ceiling::Unlimited)
    }
}

/// Capacity left under `ceiling` after `count` bytes; `None` when unlimited.
pub(crate) fn remaining(ceiling: Ceiling, count: i64) -> Option<i64> {
    ceiling.bytes().map(|max| Ceiling::Bytes(max).to_raw().saturating_sub(count))
}
