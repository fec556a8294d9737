// PONS response cache (SQLite)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A cached raw PONS response with its access statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub word: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
    pub search_count: i64,
    pub last_accessed: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PonsCache {
    db: Arc<Mutex<Connection>>,
}

impl PonsCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        tracing::info!("PONS cache initialized: {}", path.display());
        Self::with_connection(conn)
    }

    /// Cache that lives only as long as the process.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(include_str!("schema.sql"))
            .context("Failed to create pons_cache schema")?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Fetch a cached response and count the access.
    pub async fn get(&self, word: &str) -> Result<Option<CachedEntry>> {
        let conn = self.db.lock().await;
        let now = Utc::now();

        let updated = conn.execute(
            "UPDATE pons_cache
             SET search_count = search_count + 1, last_accessed = ?1
             WHERE word = ?2",
            params![now.to_rfc3339(), word],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        let row = conn
            .query_row(
                "SELECT word, result, created_at, search_count, last_accessed
                 FROM pons_cache WHERE word = ?1",
                params![word],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((word, result, created_at, search_count, last_accessed)) = row else {
            return Ok(None);
        };

        Ok(Some(CachedEntry {
            word,
            result,
            created_at: parse_timestamp(&created_at)?,
            search_count,
            last_accessed: parse_timestamp(&last_accessed)?,
        }))
    }

    /// Store a raw response, replacing any earlier one for the same word.
    pub async fn put(&self, word: &str, result: &str) -> Result<()> {
        let conn = self.db.lock().await;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO pons_cache (word, result, created_at, search_count, last_accessed)
             VALUES (?1, ?2, ?3, 1, ?3)
             ON CONFLICT(word) DO UPDATE SET result = excluded.result, last_accessed = excluded.last_accessed",
            params![word, result, now],
        )?;

        tracing::debug!("Cached PONS response for '{}' ({} bytes)", word, result.len());
        Ok(())
    }

    pub async fn len(&self) -> Result<usize> {
        let conn = self.db.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pons_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp in pons_cache: {}", value))?
        .with_timezone(&Utc))
}
