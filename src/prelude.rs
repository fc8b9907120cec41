//! The pieces most callers need, re-exported from one place.

pub use crate::error::{Error, MalformedReason, Result, StoreIoError};
pub use crate::models::document::{Document, MatchDocument};
pub use crate::models::index_builder::{BuildReport, IndexBuilder, IndexConfig, MAX_CLAUSES};
pub use crate::models::matcher::Matcher;
pub use crate::models::meta::{QueryMeta, RangeFilter};
pub use crate::models::posting::{Posting, Prefix};
pub use crate::models::query::Query;
pub use crate::models::recreate::{recreate, RecreatedQuery};
pub use crate::models::store::memory::MemoryStore;
pub use crate::models::store::Store;

#[cfg(feature = "rocks")]
pub use crate::models::store::rocks::RocksStore;

#[cfg(feature = "sqlite")]
pub use crate::models::store::sqlite::SqliteStore;
