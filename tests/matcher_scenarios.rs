// Concrete matcher scenarios S1-S6.

use mokaccino::prelude::*;

fn q0() -> Query {
    Query::new(
        0,
        vec![
            vec!["A1".into(), "A2".into()],
            vec!["B1".into(), "B2".into()],
        ],
    )
}

fn q1() -> Query {
    Query::new(1, vec![vec!["B2".into()], vec!["C1".into(), "C2".into()]])
}

fn q2(filters: Vec<RangeFilter>) -> Query {
    let meta = QueryMeta::new(filters);
    Query::new(2, vec![vec!["B2".into()]]).with_meta(meta.to_bytes())
}

#[test]
fn s1_matching_terms_across_both_clauses() {
    let mut store = MemoryStore::new();
    IndexBuilder::default().build([q0()], &mut store).unwrap();
    let matcher = Matcher::new(&store);

    let hits = matcher
        .matches(&Document::new().with_term("A2").with_term("B1"))
        .unwrap();
    assert_eq!(hits, vec![0]);
}

#[test]
fn s2_missing_one_clause_entirely() {
    let mut store = MemoryStore::new();
    IndexBuilder::default().build([q0()], &mut store).unwrap();
    let matcher = Matcher::new(&store);

    let hits = matcher
        .matches(&Document::new().with_term("A1").with_term("A2"))
        .unwrap();
    assert!(hits.is_empty());
}

#[test]
fn s3_multiple_queries_both_satisfied() {
    let mut store = MemoryStore::new();
    IndexBuilder::default().build([q0(), q1()], &mut store).unwrap();
    let matcher = Matcher::new(&store);

    let mut hits = matcher
        .matches(
            &Document::new()
                .with_term("A2")
                .with_term("B2")
                .with_term("B3")
                .with_term("C1"),
        )
        .unwrap();
    hits.sort();
    assert_eq!(hits, vec![0, 1]);
}

#[test]
fn s4_range_filter_within_bounds() {
    let mut store = MemoryStore::new();
    IndexBuilder::default()
        .build([q2(vec![RangeFilter::new("F3", 10.0, Some(20.0))])], &mut store)
        .unwrap();
    let matcher = Matcher::new(&store);

    let hits = matcher
        .matches(
            &Document::new()
                .with_term("X")
                .with_term("B2")
                .with_range_value("F3", 15.0),
        )
        .unwrap();
    assert_eq!(hits, vec![2]);
}

#[test]
fn s5_range_filter_out_of_bounds() {
    let mut store = MemoryStore::new();
    IndexBuilder::default()
        .build([q2(vec![RangeFilter::new("F3", 10.0, Some(20.0))])], &mut store)
        .unwrap();
    let matcher = Matcher::new(&store);

    let hits = matcher
        .matches(&Document::new().with_term("B2").with_range_value("F3", 25.0))
        .unwrap();
    assert!(hits.is_empty());
}

#[test]
fn s6_rare_clause_missed_never_seeds_a_candidate() {
    let mut store = MemoryStore::new();
    IndexBuilder::default().build([q0()], &mut store).unwrap();
    let matcher = Matcher::new(&store);

    // Only one of the two clauses is satisfied here, whichever was picked
    // as the rare (seeding) clause — either the candidate is never seeded,
    // or it's seeded but never cleared to zero. Either way: no match.
    let hits = matcher.matches(&Document::new().with_term("B1")).unwrap();
    assert!(hits.is_empty());
}
