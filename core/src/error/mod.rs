//! error/mod.rs
//! Error taxonomy: a generic causal wrapper plus the causes this crate raises.
//!
//! - `ClosedEndpoint`: the direction has no endpoint bound.
//! - `Limit`: a ceiling refused or truncated the transfer.
//! - `Io`: whatever the wrapped endpoint reported, untouched.
//! - `Close`: joined failures from closing several endpoints.

pub mod causal;
pub mod types;

pub use causal::{Causal, Equivalent};
pub use types::{Cause, LimitError, ValveError};
