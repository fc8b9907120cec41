//! C11: the recognized `filters` shape for per-query metadata.
//!
//! The engine itself only ever sees opaque bytes (`set_data`/`get_data`);
//! `QueryMeta` is the supported convention for producing those bytes. It is
//! gated behind the `serde` Cargo feature, same as the teacher's own
//! `serde`-derived types.

/// A single range filter: `lower < v AND (upper is absent OR upper > v)`
/// for at least one value `v` of `field` in the document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeFilter {
    pub field: String,
    pub lower: f64,
    pub upper: Option<f64>,
}

impl RangeFilter {
    pub fn new(field: impl Into<String>, lower: f64, upper: Option<f64>) -> Self {
        Self {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Does any value in `values` satisfy this filter?
    ///
    /// An empty `values` slice never satisfies a filter, regardless of how
    /// open its bounds are — this asymmetry is deliberate and observable.
    pub fn accepts(&self, values: &[f64]) -> bool {
        values
            .iter()
            .any(|&v| self.lower < v && self.upper.is_none_or(|upper| upper > v))
    }
}

/// The well-known per-query metadata shape this crate recognizes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryMeta {
    #[cfg_attr(feature = "serde", serde(default))]
    pub filters: Vec<RangeFilter>,
}

impl QueryMeta {
    pub fn new(filters: Vec<RangeFilter>) -> Self {
        Self { filters }
    }

    /// A query passes iff every filter has at least one satisfying value.
    /// A query with zero filters always passes.
    pub fn accepts(&self, range_filters: &hashbrown::HashMap<String, Vec<f64>>) -> bool {
        self.filters.iter().all(|f| {
            let values = range_filters.get(&f.field).map(Vec::as_slice).unwrap_or(&[]);
            f.accepts(values)
        })
    }

    #[cfg(feature = "serde")]
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("QueryMeta serializes infallibly")
    }

    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return Some(Self::default());
        }
        serde_json::from_slice(bytes).ok()
    }
}
