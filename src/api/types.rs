//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::db::{self, DatabaseError};

/// Shared context for all API routes.
///
/// Holds only the database path — each request opens its own connection,
/// so handlers never share mutable state.
#[derive(Clone)]
pub struct ApiContext {
    database_path: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path: Arc::new(database_path),
        }
    }

    /// Open a connection for the current request. Migrations are idempotent
    /// and already applied at startup.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.database_path)
    }
}
