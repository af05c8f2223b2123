// ## 📂 File: `src/error/types.rs`

//! error/types.rs
//! Domain causes raised by meters and limits.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::error::causal::{Causal, Equivalent};
use crate::limit::Ceilings;
use crate::types::{Ceiling, Op};

/// Error returned by every meter and limit operation.
pub type ValveError = Causal<Cause>;

/// Base cause of a [`ValveError`].
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    /// The direction has no bound endpoint.
    #[error("closed endpoint")]
    ClosedEndpoint,

    /// A ceiling refused or truncated the transfer.
    #[error(transparent)]
    Limit(LimitError),

    /// Reported by the wrapped endpoint itself.
    #[error(transparent)]
    Io(io::Error),

    /// One or more bound endpoints failed to close; failures are wrapped.
    #[error("close failed")]
    Close,
}

impl Equivalent for Cause {
    fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Cause::ClosedEndpoint, Cause::ClosedEndpoint) => true,
            (Cause::Close, Cause::Close) => true,
            (Cause::Limit(a), Cause::Limit(b)) => a == b,
            (Cause::Io(a), Cause::Io(b)) => a.kind() == b.kind() && a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

// ================= Limit error =================

/// Short transfer caused by a byte ceiling.
///
/// Holds the owning limit's ceilings, so the rendered message reports the
/// ceiling as it stands when the error is displayed.
#[derive(Clone, Debug)]
pub struct LimitError {
    ceilings: Arc<Ceilings>,
    op: Op,
    requested: u64,
    accepted: u64,
}

impl LimitError {
    pub(crate) fn new(ceilings: Arc<Ceilings>, op: Op, requested: u64, accepted: u64) -> Self {
        Self {
            ceilings,
            op,
            requested,
            accepted,
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    /// Bytes the caller asked to move.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Bytes the ceiling let through.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Current ceiling for this error's direction.
    pub fn ceiling(&self) -> Option<Ceiling> {
        match self.op {
            Op::Read => Some(self.ceilings.read()),
            Op::Write => Some(self.ceilings.write()),
            _ => None,
        }
    }
}

impl PartialEq for LimitError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ceilings, &other.ceilings)
            && self.op == other.op
            && self.requested == other.requested
            && self.accepted == other.accepted
    }
}

impl Eq for LimitError {}

impl fmt::Display for LimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(ceiling) = self.ceiling() else {
            return f.write_str("invalid operation");
        };
        write!(
            f,
            "short {op}: {} of {} bytes (cumulative {op} limit = {})",
            self.accepted,
            self.requested,
            ceiling,
            op = self.op,
        )
    }
}

impl std::error::Error for LimitError {}

// ================= ValveError helpers =================

impl Causal<Cause> {
    pub fn closed_endpoint() -> Self {
        Self::new(Cause::ClosedEndpoint)
    }

    pub fn is_closed_endpoint(&self) -> bool {
        matches!(self.cause(), Cause::ClosedEndpoint)
    }

    pub fn limit(&self) -> Option<&LimitError> {
        match self.cause() {
            Cause::Limit(e) => Some(e),
            _ => None,
        }
    }

    pub fn io_error(&self) -> Option<&io::Error> {
        match self.cause() {
            Cause::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Causal<Cause> {
    fn from(e: io::Error) -> Self {
        Self::new(Cause::Io(e))
    }
}

impl From<LimitError> for Causal<Cause> {
    fn from(e: LimitError) -> Self {
        Self::new(Cause::Limit(e))
    }
}

impl From<Causal<Cause>> for io::Error {
    fn from(err: Causal<Cause>) -> Self {
        if err.wrapped().is_empty() && err.io_error().is_some() {
            return match err.into_cause() {
                Cause::Io(e) => e,
                other => io::Error::other(other),
            };
        }
        if err.is_closed_endpoint() {
            return io::Error::new(io::ErrorKind::BrokenPipe, err);
        }
        if err.limit().is_some() {
            return io::Error::new(io::ErrorKind::QuotaExceeded, err);
        }
        io::Error::other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceilings(read: u64, write: u64) -> Arc<Ceilings> {
        Arc::new(Ceilings::new(Ceiling::Bytes(read), Ceiling::Bytes(write)))
    }

    #[test]
    fn renders_read_and_write_ceilings() {
        let c = ceilings(5, 9);
        let read = LimitError::new(c.clone(), Op::Read, 13, 5);
        let write = LimitError::new(c, Op::Write, 13, 0);

        assert_eq!(read.to_string(), "short read: 5 of 13 bytes (cumulative read limit = 5 bytes)");
        assert_eq!(write.to_string(), "short write: 0 of 13 bytes (cumulative write limit = 9 bytes)");
    }

    #[test]
    fn renders_ceiling_current_at_display_time() {
        let c = ceilings(5, 5);
        let err = LimitError::new(c.clone(), Op::Read, 8, 5);
        c.set_read(Ceiling::Unlimited);
        assert_eq!(err.to_string(), "short read: 5 of 8 bytes (cumulative read limit = unlimited)");
    }

    #[test]
    fn non_directional_op_renders_invalid_operation() {
        for op in [Op::Close, Op::ReadWrite, Op::Invalid] {
            let err = LimitError::new(ceilings(1, 1), op, 1, 0);
            assert_eq!(err.to_string(), "invalid operation");
            assert!(err.ceiling().is_none());
        }
    }

    #[test]
    fn limit_equivalence_requires_same_owner() {
        let a = ceilings(5, 5);
        let b = ceilings(5, 5);
        let x = Cause::Limit(LimitError::new(a.clone(), Op::Read, 13, 5));
        let y = Cause::Limit(LimitError::new(a, Op::Read, 13, 5));
        let z = Cause::Limit(LimitError::new(b, Op::Read, 13, 5));

        assert!(x.equivalent(&y));
        assert!(!x.equivalent(&z));
    }

    #[test]
    fn io_equivalence_compares_kind_and_message() {
        let a = Cause::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let b = Cause::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let c = Cause::Io(io::Error::new(io::ErrorKind::BrokenPipe, "other"));
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&c));
        assert!(!a.equivalent(&Cause::ClosedEndpoint));
    }

    #[test]
    fn io_conversion_returns_original_error() {
        let err = ValveError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::TimedOut);
        assert_eq!(back.to_string(), "slow");
    }

    #[test]
    fn limit_maps_to_quota_exceeded() {
        let err = ValveError::from(LimitError::new(ceilings(5, 5), Op::Write, 13, 0));
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::QuotaExceeded);
        let inner = back.get_ref().and_then(|e| e.downcast_ref::<ValveError>()).unwrap();
        assert_eq!(inner.limit().unwrap().requested(), 13);
    }

    #[test]
    fn close_failure_maps_to_other() {
        let err = ValveError::join(Cause::Close, [ValveError::from(io::Error::from(io::ErrorKind::TimedOut))]).unwrap();
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn closed_endpoint_maps_to_broken_pipe() {
        let back: io::Error = ValveError::closed_endpoint().into();
        assert_eq!(back.kind(), io::ErrorKind::BrokenPipe);
    }
}
