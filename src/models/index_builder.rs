//! C3: compiles a query corpus into the two-tier `R`/`T` posting structure.

use hstats::Hstats;
use itertools::Itertools;
use tracing::{debug, info_span};

use crate::error::{Error, MalformedReason, Result};
use crate::models::posting::{Posting, Prefix};
use crate::models::query::Query;
use crate::models::store::Store;
use crate::models::term_interner::TermInterner;
use crate::models::triple_buffer::{Triple, TripleBuffer};

/// Per-build configuration.
///
/// The posting wire format fixes the mask at 32 bits (spec §6), which in
/// turn fixes the clause-count ceiling at 31 (one bit per non-rare clause;
/// bit 31 is reserved so the all-clear check stays a simple `== 0`).
/// Implementations wanting to index deeper queries would need to widen both
/// this limit *and* the `Posting` wire type together — this crate does not
/// do so, and documents the 31-clause ceiling as a fixed choice rather than
/// a configurable one.
#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    max_clauses: usize,
}

/// The hard ceiling imposed by a 32-bit, one-bit-per-clause mask.
pub const MAX_CLAUSES: usize = 31;

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_clauses: MAX_CLAUSES,
        }
    }
}

impl IndexConfig {
    /// Narrows the clause-count ceiling below the hard maximum. Panics if
    /// `n` exceeds what the mask width supports.
    pub fn with_max_clauses(mut self, n: usize) -> Self {
        assert!(n <= MAX_CLAUSES, "mask width only supports {MAX_CLAUSES} clauses");
        self.max_clauses = n;
        self
    }

    pub fn max_clauses(&self) -> usize {
        self.max_clauses
    }
}

/// Structured summary of one [`IndexBuilder::build`] call — the typed
/// replacement for `psearch`'s scraped `log.info("loaded %s/%s queries...")`
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    pub queries_loaded: u32,
    pub queries_total: u32,
    pub unique_terms: u32,
    pub total_triples: u64,
}

#[derive(Default)]
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Runs the five build phases (spill, partition, rare-clause selection,
    /// posting emission, write) against `store`.
    ///
    /// Aborts on the first malformed query, leaving `store` in an
    /// implementation-defined (possibly partially written) state — callers
    /// are expected to discard it, matching the engine's documented
    /// call-granularity atomicity.
    pub fn build(
        &self,
        queries: impl IntoIterator<Item = Query>,
        store: &mut impl Store,
    ) -> Result<BuildReport> {
        let _span = info_span!("index_build").entered();

        let mut interner = TermInterner::new();
        let mut buffer = TripleBuffer::new()?;
        let mut queries_total = 0u32;
        let mut queries_loaded = 0u32;
        let mut clauses_per_query: Hstats<f64> = Hstats::new(0.0, 50.0, 25);

        for query in queries {
            queries_total += 1;
            self.validate(&query)?;
            clauses_per_query.add(query.dnf().len() as f64);

            let qtriples: Vec<Triple> = query
                .dnf()
                .iter()
                .enumerate()
                .flat_map(|(pos, clause)| {
                    clause.iter().unique().map(move |term| (pos, term))
                })
                .map(|(pos, term)| Triple {
                    qid: query.qid() as i32,
                    tid: interner.intern(term) as i32,
                    pos: pos as i32,
                })
                .collect();
            buffer.append_sequence(qtriples)?;
            store.set_data(query.qid(), query.meta())?;
            queries_loaded += 1;
        }
        debug!(queries_loaded, queries_total, "spill phase complete");
        debug!(%clauses_per_query, "clause count distribution");

        let view = buffer.finish()?;
        let triples = view.sorted_by_qid_pos();
        debug!(total_triples = triples.len(), "partition phase complete");

        let mut rare_rows: Vec<(i32, i32, i32)> = Vec::new();
        let mut term_rows: Vec<(i32, i32, i32)> = Vec::new();

        for qid_group in triples.chunk_by(|a, b| a.qid == b.qid) {
            let qid = qid_group[0].qid;
            let clause_term_ids: Vec<Vec<u32>> = qid_group
                .chunk_by(|a, b| a.pos == b.pos)
                .map(|pos_group| pos_group.iter().map(|t| t.tid as u32).collect())
                .collect();

            let pos_freq: Vec<u64> = clause_term_ids
                .iter()
                .map(|terms| terms.iter().map(|&tid| interner.termfreq(tid) as u64).sum())
                .collect();
            let min_freq = *pos_freq.iter().min().expect("validated non-empty dnf");
            let rare_pos = pos_freq
                .iter()
                .position(|&f| f == min_freq)
                .expect("min_freq came from this slice");

            let mut full_mask: i32 = 0;
            for (pos, terms) in clause_term_ids.iter().enumerate() {
                if pos == rare_pos {
                    continue;
                }
                let bit = 1i32 << pos;
                full_mask |= bit;
                let inv_bit = !bit;
                for &tid in terms {
                    term_rows.push((tid as i32, qid, inv_bit));
                }
            }
            for &tid in &clause_term_ids[rare_pos] {
                rare_rows.push((tid as i32, qid, full_mask));
            }
        }

        let termmap = interner.finish();
        debug!(unique_terms = termmap.len(), "rare-clause selection complete");

        write_terms(Prefix::Rare, &mut rare_rows, &termmap, store)?;
        write_terms(Prefix::Term, &mut term_rows, &termmap, store)?;
        debug!("write phase complete");

        Ok(BuildReport {
            queries_loaded,
            queries_total,
            unique_terms: termmap.len() as u32,
            total_triples: triples.len() as u64,
        })
    }

    fn validate(&self, query: &Query) -> Result<()> {
        if query.dnf().is_empty() {
            return Err(Error::MalformedQuery {
                qid: query.qid(),
                reason: MalformedReason::EmptyDnf,
            });
        }
        if query.dnf().len() > self.config.max_clauses() {
            return Err(Error::MalformedQuery {
                qid: query.qid(),
                reason: MalformedReason::TooManyClauses {
                    clause_count: query.dnf().len(),
                    max_clauses: self.config.max_clauses(),
                },
            });
        }
        for (position, clause) in query.dnf().iter().enumerate() {
            if clause.is_empty() {
                return Err(Error::MalformedQuery {
                    qid: query.qid(),
                    reason: MalformedReason::EmptyClause { position },
                });
            }
        }
        Ok(())
    }
}

/// Sorts `rows` by `(tid, qid)`, groups by `tid`, and writes one posting
/// list per distinct term (write phase, step 5 of the distilled spec).
fn write_terms(
    prefix: Prefix,
    rows: &mut [(i32, i32, i32)],
    termmap: &[Box<str>],
    store: &mut impl Store,
) -> Result<()> {
    rows.sort_by_key(|&(tid, qid, _mask)| (tid, qid));
    for group in rows.chunk_by(|a, b| a.0 == b.0) {
        let tid = group[0].0;
        let term = &termmap[tid as usize];
        let postings: Vec<Posting> = group.iter().map(|&(_, qid, mask)| Posting::new(qid, mask)).collect();
        store.write_posts(prefix, term, &postings)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::memory::MemoryStore;

    #[test]
    fn rejects_empty_dnf() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        let err = builder.build([Query::new(0, vec![])], &mut store).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedQuery {
                reason: MalformedReason::EmptyDnf,
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_clause() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        let q = Query::new(0, vec![vec!["a".into()], vec![]]);
        let err = builder.build([q], &mut store).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedQuery {
                reason: MalformedReason::EmptyClause { position: 1 },
                ..
            }
        ));
    }

    #[test]
    fn rejects_too_many_clauses() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        let dnf: Vec<Vec<String>> = (0..32).map(|i| vec![format!("t{i}")]).collect();
        let err = builder.build([Query::new(0, dnf)], &mut store).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedQuery {
                reason: MalformedReason::TooManyClauses { .. },
                ..
            }
        ));
    }

    #[test]
    fn single_clause_query_gets_zero_mask() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        let q = Query::new(0, vec![vec!["A1".into(), "A2".into()]]);
        builder.build([q], &mut store).unwrap();

        let r = store.read_posts(Prefix::Rare, "A1").unwrap();
        assert_eq!(r, vec![Posting::new(0, 0)]);
        assert!(store.read_posts(Prefix::Term, "A1").unwrap().is_empty());
    }

    #[test]
    fn duplicate_terms_in_one_clause_emit_once() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        let q = Query::new(0, vec![vec!["A".into(), "A".into()]]);
        builder.build([q], &mut store).unwrap();
        assert_eq!(store.read_posts(Prefix::Rare, "A").unwrap().len(), 1);
    }

    #[test]
    fn rare_clause_full_mask_has_k_minus_one_bits() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        // Clause B (1 term) is rarer than clause A (2 terms): chosen as rare.
        let q = Query::new(
            0,
            vec![
                vec!["A1".into(), "A2".into()],
                vec!["B1".into()],
                vec!["C1".into()],
            ],
        );
        builder.build([q], &mut store).unwrap();
        let rare = store.read_posts(Prefix::Rare, "B1").unwrap();
        assert_eq!(rare.len(), 1);
        assert_eq!(rare[0].mask.count_ones(), 2); // k - 1 = 3 - 1
    }

    #[test]
    fn build_report_counts() {
        let builder = IndexBuilder::default();
        let mut store = MemoryStore::new();
        let report = builder
            .build(
                [
                    Query::new(0, vec![vec!["a".into()]]),
                    Query::new(1, vec![vec!["b".into()]]),
                ],
                &mut store,
            )
            .unwrap();
        assert_eq!(report.queries_loaded, 2);
        assert_eq!(report.queries_total, 2);
        assert_eq!(report.unique_terms, 2);
        assert_eq!(report.total_triples, 2);
    }
}
