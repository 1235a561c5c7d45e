//! Parsed-table CRUD operations.
//!
//! Provides the persistent tier of the cache: fully parsed delimited-text
//! results keyed by resource name, with row-count and written-at metadata.
//! Entries are only ever removed wholesale via [`CacheDb::clear_parsed`];
//! there is no per-key delete, TTL, or eviction.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A fully parsed delimited-text payload.
///
/// The cache treats this as opaque apart from counting `rows`; consumers
/// interpret the columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Column names from the header row, empty when parsed headerless.
    pub headers: Vec<String>,
    /// Data rows, one `Vec<String>` of fields per record.
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Length of the row collection.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a named column in the header row.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Metadata recorded alongside a cached payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Row-collection length of the payload at write time.
    pub rows: i64,
    /// Milliseconds since the Unix epoch of the last write.
    pub timestamp: i64,
}

impl CacheDb {
    /// Get the parsed payload for an exact resource name.
    ///
    /// Returns None if the name doesn't exist in the cache.
    pub async fn get_parsed(&self, filename: &str) -> Result<Option<ParsedTable>, Error> {
        let filename = filename.to_string();
        self.conn
            .call(move |conn| -> Result<Option<ParsedTable>, Error> {
                let mut stmt = conn.prepare("SELECT results FROM parsed_tables WHERE filename = ?1")?;

                let result = stmt.query_row(params![filename], |row| row.get::<_, String>(0));

                match result {
                    Ok(json) => {
                        let table = serde_json::from_str(&json).map_err(|e| Error::CorruptRecord(e.to_string()))?;
                        Ok(Some(table))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get row-count and written-at metadata for an entry.
    pub async fn get_parsed_meta(&self, filename: &str) -> Result<Option<EntryMeta>, Error> {
        let filename = filename.to_string();
        self.conn
            .call(move |conn| -> Result<Option<EntryMeta>, Error> {
                let mut stmt = conn.prepare("SELECT rows, timestamp FROM parsed_tables WHERE filename = ?1")?;

                let result = stmt.query_row(params![filename], |row| {
                    Ok(EntryMeta { rows: row.get(0)?, timestamp: row.get(1)? })
                });

                match result {
                    Ok(meta) => Ok(Some(meta)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update the parsed payload for a resource name.
    ///
    /// Uses UPSERT semantics: inserts if the name doesn't exist, overwrites
    /// payload and metadata if it does. The row count is derived from the
    /// payload's row collection and the timestamp from the current time.
    pub async fn put_parsed(&self, filename: &str, table: &ParsedTable) -> Result<(), Error> {
        let filename = filename.to_string();
        let rows = table.row_count() as i64;
        let results =
            serde_json::to_string(table).map_err(|e| Error::InvalidInput(format!("failed to serialize payload: {e}")))?;
        let timestamp = chrono::Utc::now().timestamp_millis();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO parsed_tables (filename, results, rows, timestamp)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(filename) DO UPDATE SET
                        results = excluded.results,
                        rows = excluded.rows,
                        timestamp = excluded.timestamp",
                    params![filename, results, rows, timestamp],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete all parsed entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear_parsed(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM parsed_tables", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of parsed entries currently stored.
    pub async fn parsed_len(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM parsed_tables", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
