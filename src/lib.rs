//! `mokaccino`: prospective (reverse) search over a corpus of boolean
//! queries in disjunctive normal form.
//!
//! Build an index once from a batch of [`models::query::Query`] values via
//! [`models::index_builder::IndexBuilder`], then match streaming documents
//! against it with [`models::matcher::Matcher`]. See [`prelude`] for the
//! pieces most callers need.

pub mod error;
pub mod models;
pub mod prelude;
