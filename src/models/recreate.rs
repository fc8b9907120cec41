//! C6: reconstructs the original DNF corpus from a built index —
//! diagnostic/debugging tool, not used by the match path.
//!
//! Grounded on the original's `pdump.recreate_queries`/`first_zero`, which
//! applies the same bit scan to every posting row regardless of which table
//! (`R` or `T`) it came from: `position = first_zero(mask)`, then each
//! row's term is appended to `query[position]`. For an `R`-row `mask` is
//! `full_mask` (zero exactly at the rare clause's own position); for a
//! `T`-row `mask` is `!(1<<p)` (zero exactly at position `p`). The same
//! formula recovers the true DNF position either way, so clause order —
//! rare clause included — round-trips exactly, not just "rare clause
//! first, remaining clauses in some order".

use hashbrown::HashMap;

use crate::error::Result;
use crate::models::store::Store;

/// One recreated query: its id and its original DNF clauses, in their
/// original position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecreatedQuery {
    pub qid: u32,
    pub dnf: Vec<Vec<String>>,
}

/// Index of the lowest zero bit in `mask`, i.e. the lowest clause position
/// this posting's term does *not* clear. Mirrors the original's manual
/// `first_zero` bit scan as `(!mask).trailing_zeros()`.
fn first_zero(mask: i32) -> u32 {
    (!mask).trailing_zeros()
}

pub fn recreate(store: &impl Store) -> Result<Vec<RecreatedQuery>> {
    let mut clauses: HashMap<u32, HashMap<u32, Vec<String>>> = HashMap::new();

    for (_prefix, term, postings) in store.iter_postings()? {
        for posting in postings {
            let qid = posting.qid as u32;
            // `first_zero` recovers this posting's true DNF position
            // uniformly, whether it came from the `R` or `T` table.
            let pos = first_zero(posting.mask);
            clauses
                .entry(qid)
                .or_default()
                .entry(pos)
                .or_default()
                .push(term.clone());
        }
    }

    let mut out: Vec<RecreatedQuery> = Vec::new();
    for (qid, by_pos) in clauses {
        let mut positions: Vec<u32> = by_pos.keys().copied().collect();
        positions.sort_unstable();
        let dnf = positions.into_iter().map(|p| by_pos[&p].clone()).collect();
        out.push(RecreatedQuery { qid, dnf });
    }
    out.sort_by_key(|q| q.qid);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::index_builder::IndexBuilder;
    use crate::models::query::Query;
    use crate::models::store::memory::MemoryStore;

    #[test]
    fn single_clause_query_recreates_exactly() {
        let mut store = MemoryStore::new();
        let q = Query::new(0, vec![vec!["A1".into(), "A2".into()]]);
        IndexBuilder::default().build([q], &mut store).unwrap();

        let got = recreate(&store).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].qid, 0);
        let mut rare: Vec<&str> = got[0].dnf[0].iter().map(String::as_str).collect();
        rare.sort_unstable();
        assert_eq!(rare, vec!["A1", "A2"]);
    }

    #[test]
    fn multi_clause_query_recovers_all_clauses() {
        let mut store = MemoryStore::new();
        let q = Query::new(
            0,
            vec![
                vec!["A1".into(), "A2".into()],
                vec!["B1".into(), "B2".into()],
            ],
        );
        IndexBuilder::default().build([q], &mut store).unwrap();

        let got = recreate(&store).unwrap();
        assert_eq!(got[0].dnf.len(), 2);
        let mut all_terms: Vec<&str> = got[0]
            .dnf
            .iter()
            .flat_map(|c| c.iter().map(String::as_str))
            .collect();
        all_terms.sort_unstable();
        assert_eq!(all_terms, vec!["A1", "A2", "B1", "B2"]);
    }

    #[test]
    fn rare_clause_in_the_middle_is_recreated_at_its_true_position() {
        let mut store = MemoryStore::new();
        // Q0's middle clause ([Y]) is rarest, not its first — X and Z are
        // each inflated by a second query so their summed term frequency
        // beats Y's, forcing the rare-clause pivot onto position 1.
        let q0 = Query::new(
            0,
            vec![vec!["X".into()], vec!["Y".into()], vec!["Z".into()]],
        );
        let q1 = Query::new(1, vec![vec!["X".into()], vec!["W".into()]]);
        let q2 = Query::new(2, vec![vec!["Z".into()], vec!["V".into()]]);
        IndexBuilder::default().build([q0, q1, q2], &mut store).unwrap();

        let got = recreate(&store).unwrap();
        let q0 = got.iter().find(|r| r.qid == 0).unwrap();
        assert_eq!(
            q0.dnf,
            vec![vec!["X".to_string()], vec!["Y".to_string()], vec!["Z".to_string()]],
        );
    }

    #[test]
    fn multiple_queries_stay_separated() {
        let mut store = MemoryStore::new();
        let q0 = Query::new(0, vec![vec!["x".into()]]);
        let q1 = Query::new(1, vec![vec!["y".into()]]);
        IndexBuilder::default().build([q0, q1], &mut store).unwrap();

        let got = recreate(&store).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].qid, 0);
        assert_eq!(got[1].qid, 1);
    }
}
