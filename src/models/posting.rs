//! The wire format shared by the `R` and `T` posting tables.
//!
//! Both posting flavors are stored as the same physical 8-byte little-endian
//! `(qid, mask)` pair; only the keyspace prefix says which interpretation
//! applies. See [`Prefix`].

use bytemuck::{Pod, Zeroable};

/// One posting row: `(qid, mask)`.
///
/// For an `R`-row, `mask` is the query's `full_mask` (a 1-bit per non-rare
/// clause position). For a `T`-row, `mask` is `!(1 << p)` for the clause
/// position `p` this row clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Posting {
    pub qid: i32,
    pub mask: i32,
}

impl Posting {
    pub fn new(qid: i32, mask: i32) -> Self {
        Self { qid, mask }
    }
}

/// Which posting table a term belongs to.
///
/// `R` seeds candidates (the rare clause); `T` clears bits as non-rare
/// clauses are confirmed present in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Prefix {
    #[strum(serialize = "R")]
    Rare,
    #[strum(serialize = "T")]
    Term,
}

impl Prefix {
    /// The single ASCII byte this prefix occupies in a store key.
    pub fn as_byte(self) -> u8 {
        match self {
            Prefix::Rare => b'R',
            Prefix::Term => b'T',
        }
    }
}

/// Encode a sequence of postings as the packed little-endian byte sequence
/// that every [`crate::models::store::Store`] backend is required to store
/// under `prefix || term`.
pub fn encode(rows: &[Posting]) -> Vec<u8> {
    bytemuck::cast_slice(rows).to_vec()
}

/// Decode a byte sequence previously produced by [`encode`].
///
/// Returns [`crate::error::StoreIoError::MisalignedPosting`] if the length
/// is not a multiple of 8 bytes — the invariant every backend's wire format
/// must uphold.
pub fn decode(bytes: &[u8]) -> Result<Vec<Posting>, crate::error::StoreIoError> {
    if bytes.len() % std::mem::size_of::<Posting>() != 0 {
        return Err(crate::error::StoreIoError::MisalignedPosting(bytes.len()));
    }
    Ok(bytemuck::cast_slice(bytes).to_vec())
}
