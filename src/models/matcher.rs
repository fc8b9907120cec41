//! C5: bitmask-AND-to-zero candidate resolution plus range-filter
//! evaluation.

use hashbrown::HashMap;
use tracing::trace;

use crate::error::Result;
use crate::models::document::MatchDocument;
use crate::models::meta::QueryMeta;
use crate::models::posting::Prefix;
use crate::models::store::Store;

/// Matches documents against queries indexed by an [`IndexBuilder`](crate::models::index_builder::IndexBuilder).
///
/// Read-only: a `Matcher` is only meant to be opened against a store that
/// was fully built and [`Store::close`]d. Opening one against a store still
/// in write mode is unspecified, same as the engine it mirrors.
pub struct Matcher<'s, S> {
    store: &'s S,
}

impl<'s, S: Store> Matcher<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns every matching query id, eagerly collected. Emission order
    /// is unspecified; sort at the call site if you need one.
    pub fn matches(&self, document: &impl MatchDocument) -> Result<Vec<u32>> {
        let candidates = self.resolve_candidates(document)?;
        let mut out = Vec::new();
        for (&qid, &mask) in &candidates {
            if mask != 0 {
                continue;
            }
            if self.passes_filters(qid, document)? {
                out.push(qid);
            }
        }
        Ok(out)
    }

    /// Phase 1 (seed) + phase 2 (refine): builds the candidate map of
    /// `qid -> remaining mask`. A query is present in the map iff its rare
    /// clause was hit; `mask == 0` iff every non-rare clause was also hit.
    fn resolve_candidates(&self, document: &impl MatchDocument) -> Result<HashMap<u32, i32>> {
        let terms: Vec<&str> = document.iter_terms().collect();
        let unique_terms: hashbrown::HashSet<&str> = terms.iter().copied().collect();

        let mut candidates: HashMap<u32, i32> = HashMap::new();
        for &term in &unique_terms {
            for posting in self.store.read_posts(Prefix::Rare, term)? {
                // Invariant #1: every R-row for a given qid carries the
                // same full_mask, so a later write for the same qid from
                // another rare-clause term is a no-op overwrite.
                candidates.insert(posting.qid as u32, posting.mask);
            }
        }
        trace!(n_candidates = candidates.len(), "seed phase complete");

        for &term in &unique_terms {
            for posting in self.store.read_posts(Prefix::Term, term)? {
                let qid = posting.qid as u32;
                if let Some(mask) = candidates.get_mut(&qid) {
                    *mask &= posting.mask;
                }
            }
        }
        trace!(n_candidates = candidates.len(), "refine phase complete");

        Ok(candidates)
    }

    fn passes_filters(&self, qid: u32, document: &impl MatchDocument) -> Result<bool> {
        let meta_bytes = self.store.get_data(qid)?;
        let meta = meta_bytes
            .as_deref()
            .and_then(QueryMeta::from_bytes)
            .unwrap_or_default();
        Ok(meta.accepts(document.range_filters()))
    }
}

#[cfg(not(feature = "serde"))]
impl QueryMeta {
    fn from_bytes(_bytes: &[u8]) -> Option<Self> {
        // Without the `serde` feature there is no recognized metadata
        // shape to decode; treat every blob as "no filters, accept" —
        // `MissingMetadata` behavior extended to "unparseable metadata".
        Some(Self::default())
    }
}
