use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cascata_types::{CacheEntry, CascataError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::CacheStore;

fn unavailable(context: &str, e: impl std::fmt::Display) -> CascataError {
    CascataError::CacheStoreUnavailable(format!("{context}: {e}"))
}

fn run_migrations(conn: &Connection) -> Result<(), CascataError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cache_entries (
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            fetched_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| unavailable("migration failed", e))
}

/// Durable cache tier on a single SQLite file.
///
/// Statements run on the blocking pool; the connection is shared behind a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    ///
    /// # Errors
    /// Returns `CacheStoreUnavailable` if the file cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CascataError> {
        let conn = Connection::open(path.as_ref()).map_err(|e| unavailable("open failed", e))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns `CacheStoreUnavailable` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, CascataError> {
        let conn = Connection::open_in_memory().map_err(|e| unavailable("open failed", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CascataError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, CascataError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CascataError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| unavailable("connection lock poisoned", e))?;
            f(&guard)
        })
        .await
        .map_err(|e| unavailable("blocking task failed", e))?
    }

    /// Fallible read; `Ok(None)` is a true miss.
    ///
    /// # Errors
    /// Returns `CacheStoreUnavailable` on any backend or decoding failure.
    pub async fn try_get(&self, key: &str) -> Result<Option<CacheEntry>, CascataError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT payload, fetched_at FROM cache_entries WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|e| unavailable("select failed", e))?;
            let Some((payload, fetched_at)) = row else {
                return Ok(None);
            };
            let payload = serde_json::from_str(&payload)
                .map_err(|e| unavailable("stored payload is not JSON", e))?;
            let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
                .map_err(|e| unavailable("stored timestamp is malformed", e))?
                .with_timezone(&Utc);
            Ok(Some(CacheEntry {
                key,
                payload,
                fetched_at,
            }))
        })
        .await
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        match self.try_get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "sqlite read failed");
                None
            }
        }
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), CascataError> {
        let payload = serde_json::to_string(&entry.payload)
            .map_err(|e| unavailable("payload not serializable", e))?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO cache_entries (key, payload, fetched_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, fetched_at = excluded.fetched_at",
                params![entry.key, payload, entry.fetched_at.to_rfc3339()],
            )
            .map_err(|e| unavailable("upsert failed", e))?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), CascataError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM cache_entries", [])
                .map_err(|e| unavailable("clear failed", e))?;
            Ok(())
        })
        .await
    }
}
