//! Link storage: trait definition and the embedded redb backend
//!
//! The [`LinkStore`] trait is the sole owner of persisted link records;
//! handlers and the code allocator only touch links through it. The
//! default backend is [`RedbLinkStore`], an embedded redb B-tree database
//! storing JSON-serialized records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::Link;

/// Main table for storing link records
///
/// Key: short code as string
/// Value: JSON-serialized Link as string
///
/// Example:
/// - Key: "abc123"
/// - Value: '{"id":"...","code":"abc123","targetUrl":"https://example.com",...}'
const TABLE_LINKS: TableDefinition<&str, &str> = TableDefinition::new("links_v1");

/// Index table ordering links by creation time
///
/// Key: composite key in format "{timestamp_micros:020}:{code}"
/// Value: the short code
///
/// Zero-padding the timestamp makes lexicographic key order equal
/// chronological order, so listing newest-first is a reverse scan.
const TABLE_CREATED_INDEX: TableDefinition<&str, &str> = TableDefinition::new("created_index_v1");

/// Application state shared across all request handlers
///
/// Holds the store behind a trait object so tests can substitute
/// alternative backends.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LinkStore>,
}

/// Persistence interface for link records
///
/// Uniqueness of codes is enforced here, at write time, inside a single
/// transaction. The allocator's pre-check is only an optimization; two
/// racing `create` calls for one code resolve with exactly one winner.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persists a new link with zero clicks and server-assigned id/timestamps.
    ///
    /// Fails with [`StoreError::Duplicate`] if the code is already live.
    async fn create(&self, code: &str, target_url: &str) -> Result<Link, StoreError>;

    /// Looks up a link by its short code. Exact, case-sensitive match.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError>;

    /// Atomically increments the click counter and stamps the click time.
    ///
    /// A code that no longer exists is logged and swallowed: click
    /// accounting is best-effort and never part of the redirect contract.
    async fn record_click(&self, code: &str) -> Result<(), StoreError>;

    /// Returns all links, newest first.
    async fn list(&self) -> Result<Vec<Link>, StoreError>;

    /// Deletes a link. Idempotent: deleting an absent code is Ok.
    async fn delete(&self, code: &str) -> Result<(), StoreError>;

    /// Checks whether a code is currently in use.
    async fn exists(&self, code: &str) -> Result<bool, StoreError>;
}

/// Embedded redb-backed implementation of [`LinkStore`]
///
/// redb write transactions are exclusive, which gives us the two
/// guarantees the click path needs for free: conflicting writes to the
/// same code are serialized, and read-modify-write increments never lose
/// updates under concurrency.
pub struct RedbLinkStore {
    db: Database,
}

impl RedbLinkStore {
    /// Creates or opens the database file and ensures both tables exist
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        let db = Database::create(db_path)?;

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(TABLE_LINKS)?;
            write_txn.open_table(TABLE_CREATED_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn index_key(link: &Link) -> String {
        format!("{:020}:{}", link.created_at.timestamp_micros(), link.code)
    }
}

#[async_trait]
impl LinkStore for RedbLinkStore {
    async fn create(&self, code: &str, target_url: &str) -> Result<Link, StoreError> {
        let now = Utc::now();
        let link = Link {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            target_url: target_url.to_string(),
            total_clicks: 0,
            last_clicked: None,
            created_at: now,
            updated_at: now,
        };
        let record_json = serde_json::to_string(&link)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table_main = write_txn.open_table(TABLE_LINKS)?;

            // The uniqueness check and the insert share this transaction,
            // so a racing create for the same code cannot slip between them.
            if table_main.get(code)?.is_some() {
                return Err(StoreError::Duplicate(code.to_string()));
            }
            table_main.insert(code, record_json.as_str())?;

            let mut table_index = write_txn.open_table(TABLE_CREATED_INDEX)?;
            table_index.insert(Self::index_key(&link).as_str(), code)?;
        }
        write_txn.commit()?;

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;

        match table.get(code)? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    async fn record_click(&self, code: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_LINKS)?;

            let mut link: Link = match table.get(code)? {
                Some(value) => serde_json::from_str(value.value())?,
                None => {
                    // The link was deleted between lookup and accounting.
                    tracing::debug!("click for unknown code '{}', dropping", code);
                    return Ok(());
                }
            };

            let now = Utc::now();
            link.total_clicks += 1;
            link.last_clicked = Some(now);
            link.updated_at = now;

            let record_json = serde_json::to_string(&link)?;
            table.insert(code, record_json.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Link>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table_index = read_txn.open_table(TABLE_CREATED_INDEX)?;
        let table_main = read_txn.open_table(TABLE_LINKS)?;

        // Reverse scan of the creation-time index yields newest first
        let mut links = Vec::new();
        for entry in table_index.iter()?.rev() {
            let (_, code) = entry?;
            if let Some(value) = table_main.get(code.value())? {
                links.push(serde_json::from_str(value.value())?);
            }
        }

        Ok(links)
    }

    async fn delete(&self, code: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table_main = write_txn.open_table(TABLE_LINKS)?;

            let link: Link = match table_main.get(code)? {
                Some(value) => serde_json::from_str(value.value())?,
                // Idempotent: nothing to do for an absent code
                None => return Ok(()),
            };

            table_main.remove(code)?;

            let mut table_index = write_txn.open_table(TABLE_CREATED_INDEX)?;
            table_index.remove(Self::index_key(&link).as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;
        Ok(table.get(code)?.is_some())
    }
}
