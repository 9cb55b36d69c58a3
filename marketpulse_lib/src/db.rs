//! SQLite storage for the record snapshot.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};

use crate::store::{DataSource, Snapshot};
use crate::types::{Record, UploadMetadata};

const SCHEMA_VERSION: i32 = 1;
const UPLOAD_META_KEY: &str = "upload";

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, DbError> {
        self.conn
            .query_row(
                "SELECT value FROM ingest_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), DbError> {
        write_meta(&self.conn, key, value)
    }

    pub fn post_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }

    fn load_posts(&self) -> Result<Vec<Record>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, content, timestamp, platform, impact_on_market,
                    sentiment_score, market_impact_score, sectors, keywords, reason
             FROM posts
             ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Record {
                id: row.get(0)?,
                url: row.get(1)?,
                content: row.get(2)?,
                timestamp: row.get(3)?,
                platform: row.get(4)?,
                impact_on_market: row.get(5)?,
                sentiment_score: row.get(6)?,
                market_impact_score: row.get(7)?,
                sectors: row.get(8)?,
                keywords: row.get(9)?,
                reason: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Delete every post and insert `records` inside one transaction, so a
    /// concurrent reader sees either the old or the new snapshot. When
    /// `metadata` is given it is written in the same transaction.
    fn replace_posts(
        &self,
        records: &[Record],
        metadata: Option<&UploadMetadata>,
    ) -> Result<(), DbError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM posts", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO posts (
                    id, position, url, content, timestamp, platform, impact_on_market,
                    sentiment_score, market_impact_score, sectors, keywords, reason
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    record.id,
                    position as i64,
                    record.url,
                    record.content,
                    record.timestamp,
                    record.platform,
                    record.impact_on_market,
                    record.sentiment_score,
                    record.market_impact_score,
                    record.sectors,
                    record.keywords,
                    record.reason,
                ])?;
            }
        }
        if let Some(metadata) = metadata {
            write_meta(&tx, UPLOAD_META_KEY, &serde_json::to_string(metadata)?)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn write_meta(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO ingest_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

impl DataSource for Db {
    type Error = DbError;

    fn get_all(&self) -> Result<Snapshot, DbError> {
        Ok(Arc::new(self.load_posts()?))
    }

    fn replace_all(&self, records: Vec<Record>) -> Result<(), DbError> {
        self.replace_posts(&records, None)?;
        tracing::info!("replaced stored posts ({} records)", records.len());
        Ok(())
    }

    fn replace_snapshot(
        &self,
        records: Vec<Record>,
        metadata: UploadMetadata,
    ) -> Result<(), DbError> {
        self.replace_posts(&records, Some(&metadata))?;
        tracing::info!(
            "replaced stored posts ({} records) from {}",
            records.len(),
            metadata.filename
        );
        Ok(())
    }

    fn metadata(&self) -> Result<Option<UploadMetadata>, DbError> {
        match self.get_meta(UPLOAD_META_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set_metadata(&self, metadata: UploadMetadata) -> Result<(), DbError> {
        let json = serde_json::to_string(&metadata)?;
        self.set_meta(UPLOAD_META_KEY, &json)
    }
}
