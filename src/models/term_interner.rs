//! C1: compact term-ID assignment, build-time only.

use hashbrown::HashMap;

/// Assigns a stable small integer to every distinct term seen during one
/// indexing session, and tracks how many times each term occurred.
///
/// There is no eviction and no shared ownership across threads: the
/// interner is a pure build-time arena, discarded once
/// [`IndexBuilder::build`](crate::models::index_builder::IndexBuilder::build)
/// returns.
#[derive(Debug, Default)]
pub struct TermInterner {
    forward: HashMap<Box<str>, u32>,
    termfreqs: Vec<u32>,
}

impl TermInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a stable id for `term`, allocating a new one if this is the
    /// first time it's been seen, and bumps its frequency count either way.
    ///
    /// Amortized O(1).
    pub fn intern(&mut self, term: &str) -> u32 {
        if let Some(&tid) = self.forward.get(term) {
            self.termfreqs[tid as usize] += 1;
            return tid;
        }
        let tid = self.termfreqs.len() as u32;
        self.forward.insert(term.into(), tid);
        self.termfreqs.push(1);
        tid
    }

    pub fn termfreq(&self, tid: u32) -> u32 {
        self.termfreqs[tid as usize]
    }

    pub fn len(&self) -> usize {
        self.termfreqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.termfreqs.is_empty()
    }

    /// Materializes the reverse mapping `tid -> term`, once, for posting
    /// emission. Tids are dense from zero so a plain `Vec` indexed by tid
    /// doubles as the reverse map.
    pub fn finish(self) -> Vec<Box<str>> {
        let mut reverse: Vec<Box<str>> = vec!["".into(); self.termfreqs.len()];
        for (term, tid) in self.forward {
            reverse[tid as usize] = term;
        }
        reverse
    }
}
