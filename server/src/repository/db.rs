//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Busy timeout used when the caller does not pick one
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Internal(err.to_string())
    }
}

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: Arc<Mutex<Connection>>,
}

impl DbState {
    /// Shared handle to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }
}

/// Initialize database at `db_path` (`:memory:` for a private in-memory DB)
pub async fn init_db(db_path: &Path, busy_timeout: Duration) -> DomainResult<DbState> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(busy_timeout)?;

    run_migrations(&conn)?;
    log::info!("database ready at {}", db_path.display());

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
    })
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price TEXT,
            limit_date TEXT,
            order_index INTEGER NOT NULL
        )",
        (),
    )?;

    // Non-unique: duplicate order indices are allowed
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_order ON items(order_index)",
        (),
    )?;

    Ok(())
}
