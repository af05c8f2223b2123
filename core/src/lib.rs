//! valve-core
//!
//! Byte-counting and byte-ceiling decorators for `Read` / `Write` endpoints.
//! No transports, no buffering, no background work.
//!
//! - [`Meter`] counts the bytes moved through a reader and a writer.
//! - [`Limit`] wraps a meter and caps the cumulative bytes per direction,
//!   truncating requests that would cross the ceiling and reporting the
//!   truncated count together with a [`LimitError`].

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod endpoint;
pub mod error;

// Proxies
pub mod meter;
pub mod limit;

pub use config::{ConfigError, LimitConfig};
pub use endpoint::{Close, Nil, Shared};
pub use error::{Causal, Cause, Equivalent, LimitError, ValveError};
pub use limit::{Ceilings, Limit};
pub use meter::{ByteCounters, Meter, MeterSnapshot};
pub use types::{Ceiling, Op, Transfer};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::endpoint::Close;
    pub use crate::limit::Limit;
    pub use crate::meter::Meter;
    pub use crate::types::{Ceiling, Transfer};
}
