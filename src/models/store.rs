//! C4: the abstract persistent map the builder writes into and the matcher
//! reads from.
//!
//! The engine is parametric in the store. Three backends ship with this
//! crate: [`memory::MemoryStore`] (always available), and two optional,
//! feature-gated on-disk backends mirroring the original's
//! `GDBMStore`/`TCHStore` pair — [`rocks::RocksStore`] (feature `rocks`) and
//! [`sqlite::SqliteStore`] (feature `sqlite`). New backends plug in by
//! implementing [`Store`]; the only subtle contract is that
//! [`Store::iter_postings`] must skip metadata rows (prefix `_`).

use crate::error::Result;
use crate::models::posting::{Posting, Prefix};

pub mod memory;
#[cfg(feature = "rocks")]
pub mod rocks;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Abstract persistent map backing the index.
///
/// `write_posts` is an idempotent overwrite. `read_posts`/`get_data` return
/// empty/`None` for absent keys rather than erroring — an unindexed term or
/// a query with no stored metadata are not failures (spec §7,
/// `UnknownTerm`/`MissingMetadata`).
pub trait Store {
    fn write_posts(&mut self, prefix: Prefix, term: &str, rows: &[Posting]) -> Result<()>;

    fn read_posts(&self, prefix: Prefix, term: &str) -> Result<Vec<Posting>>;

    fn set_data(&mut self, qid: u32, bytes: &[u8]) -> Result<()>;

    fn get_data(&self, qid: u32) -> Result<Option<Vec<u8>>>;

    /// Every posting row ever written, grouped by `(prefix, term)`. Used
    /// only by the index re-creator (C6); never by the matcher.
    fn iter_postings(&self) -> Result<Vec<(Prefix, String, Vec<Posting>)>>;

    /// Durability boundary for write-mode stores. Idempotent.
    fn close(&mut self) -> Result<()>;
}

/// `prefix || term`, the key family for posting rows (spec §6).
pub(crate) fn posting_key(prefix: Prefix, term: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(term.len() + 1);
    key.push(prefix.as_byte());
    key.extend_from_slice(term.as_bytes());
    key
}

/// `"_" || qid_as_ascii_decimal`, the key family for per-query metadata.
pub(crate) fn data_key(qid: u32) -> Vec<u8> {
    format!("_{qid}").into_bytes()
}
