//! Error types for the whole crate.
//!
//! Every fallible boundary in `mokaccino` returns [`Error`]. The two
//! conditions the original prospective-search design treats as ordinary
//! control flow — an absent metadata blob, and a term nobody indexed — are
//! deliberately *not* variants here: they surface as `None`/empty results at
//! the call site instead of as errors.

use std::fmt;

/// Why a query was rejected at index time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The DNF had no clauses at all.
    EmptyDnf,
    /// A clause had no terms.
    EmptyClause { position: usize },
    /// More clauses than the configured mask width allows.
    TooManyClauses { clause_count: usize, max_clauses: usize },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::EmptyDnf => write!(f, "query has zero clauses"),
            MalformedReason::EmptyClause { position } => {
                write!(f, "clause at position {position} has zero terms")
            }
            MalformedReason::TooManyClauses {
                clause_count,
                max_clauses,
            } => write!(
                f,
                "query has {clause_count} clauses, mask width only supports {max_clauses}"
            ),
        }
    }
}

/// Top level error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raised at index time: empty DNF, empty clause, or too many clauses.
    #[error("query {qid} is malformed: {reason}")]
    MalformedQuery { qid: u32, reason: MalformedReason },

    /// A `Store` implementation reported a read/write/open/close failure.
    /// Never retried by the engine; propagated unchanged to the caller.
    #[error("store I/O failed: {0}")]
    StoreIo(#[from] StoreIoError),

    /// The triple buffer's tracked write count disagrees with the backing
    /// file's size once mapped. Fatal for the current `build` call.
    #[error("triple buffer corrupted: wrote {written} bytes, file on disk is {on_disk} bytes")]
    BufferCorruption { written: u64, on_disk: u64 },
}

/// Wraps whatever a concrete [`crate::models::store::Store`] backend uses
/// for its own errors, so callers match on one [`Error`] regardless of
/// which backend they picked.
#[derive(Debug, thiserror::Error)]
pub enum StoreIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("posting bytes for key were not a multiple of 8 bytes (got {0})")]
    MisalignedPosting(usize),

    #[cfg(feature = "rocks")]
    #[error("rocksdb error: {0}")]
    Rocks(#[from] rocksdb::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
