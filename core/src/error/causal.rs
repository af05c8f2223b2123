// ## 📂 File: `src/error/causal.rs`

//! error/causal.rs
//! Generic causal error wrapper.
//!
//! Summary: a base cause, the moment it was raised, and any number of wrapped
//! errors. Equivalence checks walk the wrapped tree and compare causes only,
//! never timestamps. Knows nothing about meters or limits.

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Causal equivalence between two causes.
pub trait Equivalent {
    fn equivalent(&self, other: &Self) -> bool;
}

/// An error value with a timestamp and a list of wrapped errors.
#[derive(Debug)]
pub struct Causal<C> {
    when: DateTime<Utc>,
    cause: C,
    wrapped: Vec<Causal<C>>,
}

impl<C> Causal<C> {
    pub fn new(cause: C) -> Self {
        Self {
            when: Utc::now(),
            cause,
            wrapped: Vec::new(),
        }
    }

    /// Replaces the wrapped errors of `self` with `errs`.
    pub fn wrap<I>(mut self, errs: I) -> Self
    where
        I: IntoIterator<Item = Causal<C>>,
    {
        self.wrapped = errs.into_iter().collect();
        self
    }

    /// Joins `errs` under a single `cause`; `None` when there is nothing to join.
    pub fn join<I>(cause: C, errs: I) -> Option<Self>
    where
        I: IntoIterator<Item = Causal<C>>,
    {
        let joined = Self::new(cause).wrap(errs);
        if joined.wrapped.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }

    pub fn cause(&self) -> &C {
        &self.cause
    }

    pub fn wrapped(&self) -> &[Causal<C>] {
        &self.wrapped
    }

    pub fn into_cause(self) -> C {
        self.cause
    }
}

impl<C: Equivalent> Causal<C> {
    /// True when `self`, or any error wrapped beneath it, has a cause
    /// equivalent to `target`.
    pub fn is_caused_by(&self, target: &C) -> bool {
        self.cause.equivalent(target) || self.wrapped.iter().any(|w| w.is_caused_by(target))
    }

    /// Equivalence against another causal error: its base cause must appear
    /// somewhere in `self`'s tree. Its own wrapped errors are not consulted.
    pub fn is(&self, target: &Causal<C>) -> bool {
        self.is_caused_by(&target.cause)
    }
}

// ================= Rendering =================

#[derive(Serialize)]
struct Rendered {
    when: String,
    what: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    wrap: Vec<String>,
}

impl<C: fmt::Display> Causal<C> {
    /// Structured JSON rendering: `{"when", "what", "wrap"}`.
    pub fn render(&self) -> String {
        let doc = Rendered {
            when: self.when.format("%Y-%m-%d %H:%M:%S").to_string(),
            what: self.cause.to_string(),
            wrap: self.wrapped.iter().map(|w| w.to_string()).collect(),
        };
        serde_json::to_string(&doc).unwrap_or_else(|_| doc.what)
    }
}

impl<C: fmt::Display> fmt::Display for Causal<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.render());
        }
        write!(f, "{}", self.cause)?;
        if !self.wrapped.is_empty() {
            f.write_str(": [")?;
            for (i, w) in self.wrapped.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                write!(f, "{}", w)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl<C: StdError + 'static> StdError for Causal<C> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.wrapped.first() {
            Some(w) => Some(w as &(dyn StdError + 'static)),
            None => self.cause.source(),
        }
    }
}
