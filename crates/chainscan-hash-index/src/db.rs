//! SQLite-backed persistent store for the hash index.

use crate::error::{Error, Result};
use chainscan_primitives::{Hash256, HashedAddressType};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Name of the transaction-hash table.
const TX_TABLE: &str = "tx_hashes";

/// Store open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Lookups only; opening a missing store is an error.
    ReadOnly,
    /// Lookups and inserts; a missing store is created.
    ReadWrite,
}

/// The persistent hash → number store.
///
/// One table per indexed address type plus one for transaction hashes, each
/// mapping a fixed-width `BLOB` key (20 or 32 bytes) to a 32-bit number.
/// Tables grow independently; a batch insert into one never touches the
/// others.
#[derive(Debug, Clone)]
pub struct HashIndexDb {
    pool: SqlitePool,
}

impl HashIndexDb {
    /// Opens or creates the store inside the given directory.
    pub async fn open(path: &Path, mode: AccessMode) -> Result<Self> {
        let db_path = path.join("hash_index.sqlite");

        match mode {
            AccessMode::ReadWrite => {
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent).ok();
                }
            }
            AccessMode::ReadOnly => {
                if !db_path.exists() {
                    return Err(Error::StoreMissing(db_path));
                }
            }
        }

        let mut options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(mode == AccessMode::ReadWrite)
            .read_only(mode == AccessMode::ReadOnly)
            .pragma("cache_size", "-64000") // 64MB cache
            .pragma("synchronous", "NORMAL");
        if mode == AccessMode::ReadWrite {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        if mode == AccessMode::ReadWrite {
            db.init_schema().await?;
        }

        tracing::debug!(path = %db_path.display(), ?mode, "Opened hash index store");

        Ok(db)
    }

    /// Create any table that does not exist yet. Existing tables and their
    /// rows are left untouched.
    async fn init_schema(&self) -> Result<()> {
        let tables = HashedAddressType::ALL
            .iter()
            .map(|ty| ty.table())
            .chain([TX_TABLE]);
        for table in tables {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {table} (key BLOB PRIMARY KEY, value INTEGER NOT NULL)"
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Bulk-insert hash → script number rows into the given type's table.
    ///
    /// The whole batch runs in a single transaction; lookups issued after
    /// the call returns see every row. Re-inserting an existing mapping
    /// overwrites it; the script layer guarantees the value is identical.
    pub async fn add_addresses<K>(&self, ty: HashedAddressType, rows: &[(K, u32)]) -> Result<()>
    where
        K: AsRef<[u8]>,
    {
        self.insert_rows(ty.table(), ty.key_width(), rows).await
    }

    /// Bulk-insert transaction hash → transaction number rows.
    pub async fn add_txes(&self, rows: &[(Hash256, u32)]) -> Result<()> {
        self.insert_rows(TX_TABLE, Hash256::LEN, rows).await
    }

    async fn insert_rows<K>(&self, table: &str, key_width: usize, rows: &[(K, u32)]) -> Result<()>
    where
        K: AsRef<[u8]>,
    {
        if rows.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {table} (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value"
        );

        let mut tx = self.pool.begin().await?;
        for (key, value) in rows {
            let key = key.as_ref();
            debug_assert_eq!(key.len(), key_width, "key width mismatch for {table}");
            sqlx::query(&sql)
                .bind(key)
                .bind(*value as i64)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Look up the script number stored for a hash key.
    ///
    /// An absent key is `Ok(None)`, never an error.
    pub async fn lookup_address(&self, ty: HashedAddressType, key: &[u8]) -> Result<Option<u32>> {
        self.lookup(ty.table(), key).await
    }

    /// Look up the transaction number stored for a transaction hash.
    pub async fn lookup_tx(&self, hash: &Hash256) -> Result<Option<u32>> {
        self.lookup(TX_TABLE, hash.as_bytes()).await
    }

    async fn lookup(&self, table: &str, key: &[u8]) -> Result<Option<u32>> {
        let sql = format!("SELECT value FROM {table} WHERE key = ?");
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value as u32))
    }

    /// Number of entries in an address table.
    pub async fn address_count(&self, ty: HashedAddressType) -> Result<u64> {
        self.count(ty.table()).await
    }

    /// Number of entries in the transaction-hash table.
    pub async fn tx_count(&self) -> Result<u64> {
        self.count(TX_TABLE).await
    }

    async fn count(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let row: (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(row.0 as u64)
    }

    /// Close the store, waiting until all written data is durable.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Hash index store closed");
    }
}
