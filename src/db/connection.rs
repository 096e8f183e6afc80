use rusqlite::Connection;
use std::sync::Mutex;

use crate::db::migration_runner::MigrationRunner;
use crate::error::JournalError;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self, JournalError> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    /// In-memory database, used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, JournalError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, JournalError> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        // WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let runner = MigrationRunner::new();

        log::info!("=== Starting database migration check ===");

        let current_version = runner.get_current_version(&conn)?;
        log::info!("Current schema version: {:?}", current_version);

        let applied = runner
            .run_pending_migrations(&conn)
            .map_err(|e| JournalError::Migration(e.to_string()))?;

        if applied > 0 {
            log::info!("Applied {} migrations successfully", applied);
        } else {
            log::info!("Database schema is up to date");
        }

        runner
            .verify_migrations(&conn)
            .map_err(|e| JournalError::Migration(e.to_string()))?;

        log::info!("=== Migration check complete ===");

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }
}
