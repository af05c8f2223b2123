// ## 📂 File: `src/constants.rs`

//! constants.rs
//! Sizes and sentinels shared by the meter and limit layers.

/// Chunk size of the counted copy loop behind every drain (8 KiB).
///
/// Matches the buffer `std::io::copy` uses, so a metered drain issues the
/// same number of endpoint calls as an unmetered one.
pub const COPY_CHUNK_SIZE: usize = 8 * 1024;

/// Atomic encoding of [`Ceiling::Unlimited`](crate::types::Ceiling::Unlimited).
// Any negative raw value decodes as unlimited; this is the one we store.
pub(crate) const UNLIMITED_RAW: i64 = -1;

/// Largest finite ceiling that survives the round trip through `i64` storage.
pub const MAX_CEILING: u64 = i64::MAX as u64;
