//! On-disk [`Store`] backed by `rusqlite` (bundled SQLite) — the second
//! teacher-corpus pick for persistent storage (feature `sqlite`).

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::posting::{decode, encode, Posting, Prefix};
use crate::models::store::{data_key, posting_key, Store};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::StoreIo(e.into()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS postings (key BLOB PRIMARY KEY, value BLOB NOT NULL)",
            [],
        )
        .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(Self { conn })
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(Self { conn })
    }

    /// Wraps `build()`'s whole write phase in one transaction for
    /// throughput; a no-op for read-only connections.
    pub fn transaction(&mut self) -> rusqlite::Result<rusqlite::Transaction<'_>> {
        self.conn.transaction()
    }
}

fn prefix_from_byte(b: u8) -> Option<Prefix> {
    match b {
        b'R' => Some(Prefix::Rare),
        b'T' => Some(Prefix::Term),
        _ => None,
    }
}

impl Store for SqliteStore {
    fn write_posts(&mut self, prefix: Prefix, term: &str, rows: &[Posting]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO postings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![posting_key(prefix, term), encode(rows)],
            )
            .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(())
    }

    fn read_posts(&self, prefix: Prefix, term: &str) -> Result<Vec<Posting>> {
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM postings WHERE key = ?1",
                params![posting_key(prefix, term)],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::StoreIo(e.into()))?;
        match bytes {
            Some(bytes) => decode(&bytes).map_err(Error::StoreIo),
            None => Ok(Vec::new()),
        }
    }

    fn set_data(&mut self, qid: u32, bytes: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO postings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![data_key(qid), bytes],
            )
            .map_err(|e| Error::StoreIo(e.into()))?;
        Ok(())
    }

    fn get_data(&self, qid: u32) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM postings WHERE key = ?1",
                params![data_key(qid)],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::StoreIo(e.into()))
    }

    fn iter_postings(&self) -> Result<Vec<(Prefix, String, Vec<Posting>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM postings")
            .map_err(|e| Error::StoreIo(e.into()))?;
        let rows = stmt
            .query_map([], |row| {
                let key: Vec<u8> = row.get(0)?;
                let value: Vec<u8> = row.get(1)?;
                Ok((key, value))
            })
            .map_err(|e| Error::StoreIo(e.into()))?;

        let mut out = Vec::new();
        for row in rows {
            let (key, value) = row.map_err(|e| Error::StoreIo(e.into()))?;
            let Some(&first) = key.first() else { continue };
            if first == b'_' {
                continue;
            }
            let Some(prefix) = prefix_from_byte(first) else {
                continue;
            };
            let term = String::from_utf8_lossy(&key[1..]).into_owned();
            let postings = decode(&value).map_err(Error::StoreIo)?;
            out.push((prefix, term, postings));
        }
        Ok(out)
    }

    fn close(&mut self) -> Result<()> {
        // SQLite commits on each statement outside an explicit transaction;
        // nothing to flush beyond what `rusqlite` already guarantees.
        Ok(())
    }
}
