//! C2: append-only spill store for `(qid, tid, pos)` triples.
//!
//! The buffer always spills to a temporary, memory-mapped file rather than
//! growing a `Vec` in RAM, keeping the building path's memory bounded for
//! large corpora — the same tradeoff `psearch` made with
//! `tempfile.TemporaryFile` + `numpy.memmap`.

use bytemuck::{Pod, Zeroable};
use std::io::Write;

use crate::error::Error;

/// One `(qid, tid, pos)` record, 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Triple {
    pub qid: i32,
    pub tid: i32,
    pub pos: i32,
}

/// Append-only sink for [`Triple`] records.
///
/// Order is preserved within a single query's append sequence; callers may
/// interleave different queries' triples across calls to [`Self::append_sequence`]
/// as long as each query's own triples stay internally ordered by position.
pub struct TripleBuffer {
    file: tempfile::NamedTempFile,
    written: u64,
}

impl TripleBuffer {
    /// Acquires a scoped temporary file. Released on drop, on every exit
    /// path, whether [`Self::finish`] is ever called or not.
    pub fn new() -> Result<Self, Error> {
        let file = tempfile::Builder::new()
            .prefix("mokaccino-triples")
            .tempfile()
            .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(Self { file, written: 0 })
    }

    /// Appends a sequence of triples, preserving their relative order.
    pub fn append_sequence(
        &mut self,
        seq: impl IntoIterator<Item = Triple>,
    ) -> Result<(), Error> {
        for triple in seq {
            let bytes = bytemuck::bytes_of(&triple);
            self.file
                .write_all(bytes)
                .map_err(|e| Error::StoreIo(e.into()))?;
            self.written += bytes.len() as u64;
        }
        Ok(())
    }

    /// Finalizes the buffer into a read-only, memory-mapped, sortable view.
    ///
    /// Fails with [`Error::BufferCorruption`] if the tracked write count and
    /// the file's final size disagree.
    pub fn finish(mut self) -> Result<TripleView, Error> {
        self.file.flush().map_err(|e| Error::StoreIo(e.into()))?;
        let on_disk = self
            .file
            .as_file()
            .metadata()
            .map_err(|e| Error::StoreIo(e.into()))?
            .len();
        if on_disk != self.written {
            return Err(Error::BufferCorruption {
                written: self.written,
                on_disk,
            });
        }
        if on_disk == 0 {
            return Ok(TripleView { mmap: None });
        }
        // Safety: the temp file is exclusively owned by this buffer and not
        // written to again after this point.
        let mmap = unsafe { memmap2::Mmap::map(self.file.as_file()) }
            .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(TripleView { mmap: Some(mmap) })
    }
}

/// A read-only, sortable view over the spilled triples.
pub struct TripleView {
    mmap: Option<memmap2::Mmap>,
}

impl TripleView {
    /// A sorted copy of the triples, sorted by `(qid, pos)` so a caller can
    /// group by qid and then by position in one pass (the "partition phase"
    /// of the index builder).
    pub fn sorted_by_qid_pos(&self) -> Vec<Triple> {
        let mut triples = self.as_slice().to_vec();
        triples.sort_by_key(|t| (t.qid, t.pos));
        triples
    }

    pub fn as_slice(&self) -> &[Triple] {
        match &self.mmap {
            Some(mmap) => bytemuck::cast_slice(mmap),
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_round_trips() {
        let buf = TripleBuffer::new().unwrap();
        let view = buf.finish().unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn preserves_order_within_append_sequence() {
        let mut buf = TripleBuffer::new().unwrap();
        buf.append_sequence([
            Triple { qid: 0, tid: 1, pos: 0 },
            Triple { qid: 0, tid: 2, pos: 0 },
            Triple { qid: 0, tid: 3, pos: 1 },
        ])
        .unwrap();
        let view = buf.finish().unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.as_slice()[0].tid, 1);
        assert_eq!(view.as_slice()[2].pos, 1);
    }

    #[test]
    fn sorts_by_qid_then_pos() {
        let mut buf = TripleBuffer::new().unwrap();
        buf.append_sequence([
            Triple { qid: 1, tid: 9, pos: 0 },
            Triple { qid: 0, tid: 5, pos: 1 },
            Triple { qid: 0, tid: 4, pos: 0 },
        ])
        .unwrap();
        let view = buf.finish().unwrap();
        let sorted = view.sorted_by_qid_pos();
        let keys: Vec<_> = sorted.iter().map(|t| (t.qid, t.pos)).collect();
        assert_eq!(keys, vec![(0, 0), (0, 1), (1, 0)]);
    }
}
