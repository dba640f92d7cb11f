//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `raw_transactions` - Stored statement transactions and overrides
//! - `scheduled_outgoings` - User-curated recurring bills and de-duplication
//! - `balances` - Balance snapshots and overdraft limits

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod balances;
mod raw_transactions;
mod scheduled_outgoings;

pub use raw_transactions::StatementMonth;
pub use scheduled_outgoings::ScheduledOutgoingUpdate;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool, running migrations on open
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each pool
    /// connection would otherwise see its own empty in-memory database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/tally_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Delete all stored data (the bulk-clear operation)
    pub fn clear_all_data(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            DELETE FROM raw_transactions;
            DELETE FROM scheduled_outgoings;
            DELETE FROM balances;
            DELETE FROM overdrafts;
            "#,
        )?;

        info!("All stored data cleared");
        Ok(())
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Store temp tables in memory
            PRAGMA temp_store = MEMORY;

            -- Raw statement transactions, as received from the bank export.
            -- Only override_subcategory mutates after insertion.
            CREATE TABLE IF NOT EXISTS raw_transactions (
                id INTEGER PRIMARY KEY,
                transaction_number TEXT,
                date DATE NOT NULL,
                account TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                subcategory TEXT NOT NULL DEFAULT '',
                override_subcategory TEXT,
                memo TEXT NOT NULL DEFAULT '',
                import_hash TEXT UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_raw_transactions_date ON raw_transactions(date);
            CREATE INDEX IF NOT EXISTS idx_raw_transactions_subcategory ON raw_transactions(subcategory);

            -- User-curated recurring bills, tracked by day-of-month
            CREATE TABLE IF NOT EXISTS scheduled_outgoings (
                id INTEGER PRIMARY KEY,
                day_of_month INTEGER NOT NULL CHECK (day_of_month BETWEEN 1 AND 31),
                amount REAL NOT NULL,
                merchant TEXT NOT NULL DEFAULT '',
                memo TEXT NOT NULL DEFAULT '',
                subcategory TEXT NOT NULL DEFAULT 'Direct Debit',
                account TEXT NOT NULL DEFAULT 'Scheduled Outgoing',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_scheduled_outgoings_day ON scheduled_outgoings(day_of_month);

            -- User-recorded balance snapshots
            CREATE TABLE IF NOT EXISTS balances (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                amount REAL NOT NULL,
                recorded_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_balances_recorded ON balances(recorded_at);

            -- Arranged overdraft limits
            CREATE TABLE IF NOT EXISTS overdrafts (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL,
                recorded_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_overdrafts_recorded ON overdrafts(recorded_at);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
