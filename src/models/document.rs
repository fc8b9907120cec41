//! The matcher's input document shape (spec §6) and an ergonomic, builder
//! styled concrete [`Document`], mirroring the teacher's own `Document`.

use hashbrown::HashMap;

use crate::models::types::OurStr;

/// What the matcher actually consumes from a document. Implement this
/// directly if your own document type already has the right shape; use
/// [`Document`] otherwise.
pub trait MatchDocument {
    /// Every term occurring in the document, once per occurrence across all
    /// text fields. Duplicates are tolerated — the matcher de-duplicates.
    /// Field-restricted ("term filter") terms are yielded already prefixed
    /// as `"field:value"`.
    fn iter_terms(&self) -> impl Iterator<Item = &str>;

    /// Numeric values available for range-filter evaluation, keyed by
    /// field name. Only consulted for queries whose metadata decodes to a
    /// `filters` list.
    fn range_filters(&self) -> &HashMap<String, Vec<f64>>;
}

/// A document to percolate through a set of indexed queries.
///
/// Holds text-search terms, term-filter field/values (folded into the same
/// term stream as `"field:value"`), and numeric range-filter values.
///
/// # Example
///
/// ```
/// use mokaccino::prelude::Document;
///
/// let d = Document::new()
///     .with_term("A2")
///     .with_term("B1")
///     .with_term_filter("category", "chairs")
///     .with_range_value("price", 42.0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Document {
    terms: Vec<OurStr>,
    range_filters: HashMap<String, Vec<f64>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain text term.
    pub fn with_term<T: Into<OurStr>>(mut self, term: T) -> Self {
        self.terms.push(term.into());
        self
    }

    /// Adds every term from an iterable of text terms.
    pub fn with_terms<T: Into<OurStr>>(mut self, terms: impl IntoIterator<Item = T>) -> Self {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Adds a field-restricted term, folded into the term stream as
    /// `"field:value"` — the term-filter prefixing convention (spec P4).
    pub fn with_term_filter(mut self, field: &str, value: &str) -> Self {
        self.terms.push(format!("{field}:{value}").into());
        self
    }

    /// Adds a numeric value for range-filter evaluation against `field`.
    pub fn with_range_value(mut self, field: &str, value: f64) -> Self {
        self.range_filters
            .entry(field.to_string())
            .or_default()
            .push(value);
        self
    }
}

impl MatchDocument for Document {
    fn iter_terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_ref())
    }

    fn range_filters(&self) -> &HashMap<String, Vec<f64>> {
        &self.range_filters
    }
}
