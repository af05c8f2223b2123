// ## 📂 File: `src/types.rs`

//! types.rs
//! Shared value types: operation kinds, ceilings, and transfer outcomes.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_CEILING, UNLIMITED_RAW};
use crate::error::ValveError;

// ================= Operation kinds =================

/// Kind of I/O operation, used to label errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Read,
    Write,
    Close,
    ReadWrite,
    Invalid,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Read => "read",
            Op::Write => "write",
            Op::Close => "close",
            Op::ReadWrite => "read/write",
            Op::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ================= Ceilings =================

/// Maximum cumulative bytes allowed in one direction.
///
/// Serialises as an integer, with `null` standing for [`Ceiling::Unlimited`].
/// Finite values above [`MAX_CEILING`] are clamped when stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Ceiling {
    #[default]
    Unlimited,
    Bytes(u64),
}

impl Ceiling {
    pub fn is_unlimited(self) -> bool {
        matches!(self, Ceiling::Unlimited)
    }

    /// Finite byte count, `None` when unlimited.
    pub fn bytes(self) -> Option<u64> {
        match self {
            Ceiling::Unlimited => None,
            Ceiling::Bytes(n) => Some(n),
        }
    }

    pub(crate) fn to_raw(self) -> i64 {
        match self {
            Ceiling::Unlimited => UNLIMITED_RAW,
            Ceiling::Bytes(n) => n.min(MAX_CEILING) as i64,
        }
    }

    pub(crate) fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Ceiling::Unlimited
        } else {
            Ceiling::Bytes(raw as u64)
        }
    }
}

impl From<u64> for Ceiling {
    fn from(n: u64) -> Self {
        Ceiling::Bytes(n)
    }
}

impl From<Option<u64>> for Ceiling {
    fn from(n: Option<u64>) -> Self {
        n.map_or(Ceiling::Unlimited, Ceiling::Bytes)
    }
}

impl From<Ceiling> for Option<u64> {
    fn from(c: Ceiling) -> Self {
        c.bytes()
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::Unlimited => f.write_str("unlimited"),
            Ceiling::Bytes(n) => write!(f, "{} bytes", n),
        }
    }
}

// ================= Transfer outcome =================

/// Outcome of a single transfer call.
///
/// A transfer can move bytes *and* fail: `count` is always the exact number
/// of bytes that crossed the endpoint, `error` is whatever cut the call short.
#[must_use = "a transfer may carry an error alongside its byte count"]
#[derive(Debug)]
pub struct Transfer<N> {
    pub count: N,
    pub error: Option<ValveError>,
}

impl<N> Transfer<N> {
    pub fn new(count: N, error: Option<ValveError>) -> Self {
        Self { count, error }
    }

    pub fn done(count: N) -> Self {
        Self { count, error: None }
    }

    pub fn failed(count: N, error: ValveError) -> Self {
        Self { count, error: Some(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (N, Option<ValveError>) {
        (self.count, self.error)
    }

    /// Drops the byte count when an error is present.
    pub fn into_result(self) -> Result<N, ValveError> {
        match self.error {
            None => Ok(self.count),
            Some(e) => Err(e),
        }
    }
}

impl<N: Default> Transfer<N> {
    /// Refused before any endpoint was touched.
    pub(crate) fn refused(error: ValveError) -> Self {
        Self::failed(N::default(), error)
    }
}

impl Transfer<usize> {
    /// `std::io` view: bytes moved win over a simultaneous error, which the
    /// next call reports again (a ceiling stays exhausted, an endpoint stays
    /// broken).
    pub(crate) fn into_io(self) -> io::Result<usize> {
        match self.error {
            Some(e) if self.count == 0 => Err(e.into()),
            _ => Ok(self.count),
        }
    }
}
