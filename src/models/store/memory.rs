//! An in-RAM [`Store`], the engine's reference backend. Mirrors the
//! original's `MemoryStore`: an entire copy of the index is held in memory,
//! and optionally flushed to — and reloaded from — a file, a Rust-native
//! stand-in for the original's `cPickle`-based `readmode` round-trip.

use hashbrown::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, StoreIoError};
use crate::models::posting::{decode, encode, Posting, Prefix};
use crate::models::store::Store;

/// In-memory store. If constructed with [`MemoryStore::with_file`], its
/// contents are written out as a flat length-prefixed binary record stream
/// on [`Store::close`]; [`MemoryStore::open`] reads that same stream back.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: HashMap<(Prefix, String), Vec<Posting>>,
    data: HashMap<u32, Vec<u8>>,
    flush_to: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When closed, serializes `posts` and `data` to `path`.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            flush_to: Some(path.into()),
            ..Self::default()
        }
    }

    /// Reloads a store previously written by [`Store::close`] on a
    /// [`MemoryStore::with_file`]-constructed instance. The returned store
    /// is not itself flush-on-close; call [`MemoryStore::with_file`] again
    /// if you want to write it back out.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = std::fs::File::open(path).map_err(|e| Error::StoreIo(e.into()))?;

        let mut posts = HashMap::new();
        for _ in 0..read_u32(&mut file)? {
            let prefix = read_prefix(&mut file)?;
            let term = read_string(&mut file)?;
            let rows = read_postings(&mut file)?;
            posts.insert((prefix, term), rows);
        }

        let mut data = HashMap::new();
        for _ in 0..read_u32(&mut file)? {
            let qid = read_u32(&mut file)?;
            let bytes = read_bytes(&mut file)?;
            data.insert(qid, bytes);
        }

        Ok(Self {
            posts,
            data,
            flush_to: None,
        })
    }
}

impl Store for MemoryStore {
    fn write_posts(&mut self, prefix: Prefix, term: &str, rows: &[Posting]) -> Result<()> {
        self.posts.insert((prefix, term.to_string()), rows.to_vec());
        Ok(())
    }

    fn read_posts(&self, prefix: Prefix, term: &str) -> Result<Vec<Posting>> {
        Ok(self
            .posts
            .get(&(prefix, term.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn set_data(&mut self, qid: u32, bytes: &[u8]) -> Result<()> {
        self.data.insert(qid, bytes.to_vec());
        Ok(())
    }

    fn get_data(&self, qid: u32) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(&qid).cloned())
    }

    fn iter_postings(&self) -> Result<Vec<(Prefix, String, Vec<Posting>)>> {
        Ok(self
            .posts
            .iter()
            .map(|((prefix, term), rows)| (*prefix, term.clone(), rows.clone()))
            .collect())
    }

    fn close(&mut self) -> Result<()> {
        let Some(path) = self.flush_to.take() else {
            return Ok(());
        };
        let mut file = std::fs::File::create(path).map_err(|e| Error::StoreIo(e.into()))?;

        write_u32(&mut file, self.posts.len() as u32)?;
        for ((prefix, term), rows) in &self.posts {
            write_prefix(&mut file, *prefix)?;
            write_string(&mut file, term)?;
            write_postings(&mut file, rows)?;
        }

        write_u32(&mut file, self.data.len() as u32)?;
        for (qid, bytes) in &self.data {
            write_u32(&mut file, *qid)?;
            write_bytes(&mut file, bytes)?;
        }
        Ok(())
    }
}

// Flat binary record stream read by `MemoryStore::open`, written by
// `Store::close`: every field is explicitly length-prefixed so terms and
// metadata blobs may contain arbitrary bytes.

fn write_u32(w: &mut impl Write, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes()).map_err(|e| Error::StoreIo(e.into()))
}

fn read_u32(r: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|e| Error::StoreIo(e.into()))?;
    Ok(u32::from_le_bytes(buf))
}

fn write_bytes(w: &mut impl Write, bytes: &[u8]) -> Result<()> {
    write_u32(w, bytes.len() as u32)?;
    w.write_all(bytes).map_err(|e| Error::StoreIo(e.into()))
}

fn read_bytes(r: &mut impl Read) -> Result<Vec<u8>> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(|e| Error::StoreIo(e.into()))?;
    Ok(buf)
}

fn write_string(w: &mut impl Write, s: &str) -> Result<()> {
    write_bytes(w, s.as_bytes())
}

fn read_string(r: &mut impl Read) -> Result<String> {
    let bytes = read_bytes(r)?;
    String::from_utf8(bytes).map_err(|e| {
        Error::StoreIo(StoreIoError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })
}

fn write_prefix(w: &mut impl Write, prefix: Prefix) -> Result<()> {
    w.write_all(&[prefix.as_byte()]).map_err(|e| Error::StoreIo(e.into()))
}

fn read_prefix(r: &mut impl Read) -> Result<Prefix> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).map_err(|e| Error::StoreIo(e.into()))?;
    match buf[0] {
        b'R' => Ok(Prefix::Rare),
        b'T' => Ok(Prefix::Term),
        other => Err(Error::StoreIo(StoreIoError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unknown posting prefix byte {other}"),
        )))),
    }
}

fn write_postings(w: &mut impl Write, rows: &[Posting]) -> Result<()> {
    write_u32(w, rows.len() as u32)?;
    w.write_all(&encode(rows)).map_err(|e| Error::StoreIo(e.into()))
}

fn read_postings(r: &mut impl Read) -> Result<Vec<Posting>> {
    let n_rows = read_u32(r)? as usize;
    let mut buf = vec![0u8; n_rows * std::mem::size_of::<Posting>()];
    r.read_exact(&mut buf).map_err(|e| Error::StoreIo(e.into()))?;
    decode(&buf).map_err(Error::StoreIo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_term_reads_empty() {
        let store = MemoryStore::new();
        assert!(store.read_posts(Prefix::Rare, "nope").unwrap().is_empty());
    }

    #[test]
    fn missing_metadata_reads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get_data(42).unwrap(), None);
    }

    #[test]
    fn write_then_read() {
        let mut store = MemoryStore::new();
        let rows = vec![Posting::new(1, 2), Posting::new(3, 4)];
        store.write_posts(Prefix::Rare, "a", &rows).unwrap();
        assert_eq!(store.read_posts(Prefix::Rare, "a").unwrap(), rows);
        // Overwrite is idempotent, not additive.
        let rows2 = vec![Posting::new(9, 9)];
        store.write_posts(Prefix::Rare, "a", &rows2).unwrap();
        assert_eq!(store.read_posts(Prefix::Rare, "a").unwrap(), rows2);
    }

    #[test]
    fn iter_postings_skips_nothing_but_data() {
        let mut store = MemoryStore::new();
        store
            .write_posts(Prefix::Rare, "a", &[Posting::new(0, 0)])
            .unwrap();
        store.set_data(0, b"meta").unwrap();
        let all = store.iter_postings().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1, "a");
    }

    #[test]
    fn close_then_open_round_trips_postings_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");

        let mut store = MemoryStore::with_file(&path);
        store
            .write_posts(Prefix::Rare, "a", &[Posting::new(0, 3), Posting::new(1, 0)])
            .unwrap();
        store.write_posts(Prefix::Term, "b", &[Posting::new(0, !1)]).unwrap();
        store.set_data(0, b"{\"filters\":[]}").unwrap();
        store.close().unwrap();

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(
            reopened.read_posts(Prefix::Rare, "a").unwrap(),
            vec![Posting::new(0, 3), Posting::new(1, 0)],
        );
        assert_eq!(reopened.read_posts(Prefix::Term, "b").unwrap(), vec![Posting::new(0, !1)]);
        assert_eq!(reopened.get_data(0).unwrap(), Some(b"{\"filters\":[]}".to_vec()));
    }

    #[test]
    fn close_with_no_file_is_a_no_op() {
        let mut store = MemoryStore::new();
        store.write_posts(Prefix::Rare, "a", &[Posting::new(0, 0)]).unwrap();
        store.close().unwrap();
        assert_eq!(store.read_posts(Prefix::Rare, "a").unwrap(), vec![Posting::new(0, 0)]);
    }
}
