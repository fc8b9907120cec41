//! On-disk [`Store`] backed by `rocksdb` — the teacher-corpus pick for a
//! large-scale persistent key/value store (feature `rocks`).

use std::path::Path;

use crate::error::{Error, Result, StoreIoError};
use crate::models::posting::{decode, encode, Posting, Prefix};
use crate::models::store::{data_key, posting_key, Store};

pub struct RocksStore {
    db: rocksdb::DB,
}

impl RocksStore {
    /// Opens (creating if missing) `path` for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let db = rocksdb::DB::open(&opts, path).map_err(|e| Error::StoreIo(e.into()))?;
        Ok(Self { db })
    }

    /// Opens `path` read-only. Opening a `RocksStore` still open for
    /// writing elsewhere is unspecified, matching the engine's documented
    /// shared-resource policy.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let opts = rocksdb::Options::default();
        let db = rocksdb::DB::open_for_read_only(&opts, path, false)
            .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(Self { db })
    }
}

fn prefix_from_byte(b: u8) -> Option<Prefix> {
    match b {
        b'R' => Some(Prefix::Rare),
        b'T' => Some(Prefix::Term),
        _ => None,
    }
}

impl Store for RocksStore {
    fn write_posts(&mut self, prefix: Prefix, term: &str, rows: &[Posting]) -> Result<()> {
        self.db
            .put(posting_key(prefix, term), encode(rows))
            .map_err(|e| Error::StoreIo(e.into()))
    }

    fn read_posts(&self, prefix: Prefix, term: &str) -> Result<Vec<Posting>> {
        match self
            .db
            .get(posting_key(prefix, term))
            .map_err(|e| Error::StoreIo(e.into()))?
        {
            Some(bytes) => decode(&bytes).map_err(Error::StoreIo),
            None => Ok(Vec::new()),
        }
    }

    fn set_data(&mut self, qid: u32, bytes: &[u8]) -> Result<()> {
        self.db
            .put(data_key(qid), bytes)
            .map_err(|e| Error::StoreIo(e.into()))
    }

    fn get_data(&self, qid: u32) -> Result<Option<Vec<u8>>> {
        self.db
            .get(data_key(qid))
            .map_err(|e| Error::StoreIo(e.into()))
    }

    fn iter_postings(&self) -> Result<Vec<(Prefix, String, Vec<Posting>)>> {
        let mut out = Vec::new();
        for item in self.db.iterator(rocksdb::IteratorMode::Start) {
            let (key, value) = item.map_err(|e| Error::StoreIo(StoreIoError::from(e)))?;
            let Some(&first) = key.first() else { continue };
            if first == b'_' {
                continue;
            }
            let Some(prefix) = prefix_from_byte(first) else {
                continue;
            };
            let term = String::from_utf8_lossy(&key[1..]).into_owned();
            let rows = decode(&value).map_err(Error::StoreIo)?;
            out.push((prefix, term, rows));
        }
        Ok(out)
    }

    fn close(&mut self) -> Result<()> {
        self.db.flush().map_err(|e| Error::StoreIo(e.into()))
    }
}
