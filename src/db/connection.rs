/// Database connection management with connection pooling
///
/// Owns the SQLite pool backing both the command registry and the vector table.

use crate::error::{FastCmdError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Maximum number of database connections in the pool
const MAX_CONNECTIONS: u32 = 5;

const DIMENSION_KEY: &str = "dimension";

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
    dimension: usize,
}

impl Database {
    /// Open (or create) the command store
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `dimension` - Length of every embedding this store will hold
    ///
    /// # Returns
    /// * `Ok(Database)` - Store is open and its schema is in place
    /// * `Err(FastCmdError::StorageUnavailable)` - Directory or file could not be opened
    /// * `Err(FastCmdError::DimensionMismatch)` - Store was built for another dimension
    ///
    /// # Examples
    /// ```no_run
    /// use fastcmd_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new("/home/me/.fastcmd/commands.db", 1536).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(db_path: P, dimension: usize) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FastCmdError::StorageUnavailable(format!("{}: {}", parent.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| FastCmdError::StorageUnavailable(format!("{}: {}", db_path.display(), e)))?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
            dimension,
        };

        db.initialize().await?;

        Ok(db)
    }

    /// Create a test database in memory
    ///
    /// Single connection, otherwise every pooled connection would see its own
    /// empty in-memory database.
    #[cfg(test)]
    pub async fn new_test(dimension: usize) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path: PathBuf::from(":memory:"),
            dimension,
        };

        db.initialize().await?;

        Ok(db)
    }

    /// Ensure tables exist and the store matches our dimension
    ///
    /// Safe to call any number of times. A fresh store records the
    /// dimension; an existing one must agree with it.
    pub async fn initialize(&self) -> Result<()> {
        let schema = include_str!("../../database/schema.sql");

        // SQLite doesn't support multiple statements in execute,
        // so we need to split and execute each statement
        for statement in schema.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(self.pool.as_ref()).await?;
            }
        }

        sqlx::query("INSERT OR IGNORE INTO store_meta (key, value) VALUES (?, ?)")
            .bind(DIMENSION_KEY)
            .bind(self.dimension.to_string())
            .execute(self.pool.as_ref())
            .await?;

        let (stored,): (String,) = sqlx::query_as("SELECT value FROM store_meta WHERE key = ?")
            .bind(DIMENSION_KEY)
            .fetch_one(self.pool.as_ref())
            .await?;

        let stored: usize = stored.parse().map_err(|_| {
            FastCmdError::Generic(format!("Corrupt store metadata: dimension '{}'", stored))
        })?;
        if stored != self.dimension {
            return Err(FastCmdError::DimensionMismatch {
                expected: self.dimension,
                actual: stored,
            });
        }

        log::debug!(
            "command store ready at {} ({} dimensions)",
            self.db_path.display(),
            self.dimension
        );

        Ok(())
    }

    /// Get reference to the connection pool
    ///
    /// Used internally by query modules.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Embedding length this store accepts
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Close all connections in the pool
    ///
    /// Should be called on application shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get database statistics
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let (total_commands,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commands")
            .fetch_one(self.pool.as_ref())
            .await?;

        let (total_vectors,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vec_commands")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(DatabaseStats {
            total_commands,
            total_vectors,
            dimension: self.dimension,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_commands: i64,
    pub total_vectors: i64,
    pub dimension: usize,
}

impl DatabaseStats {
    /// Registry rows and vector rows agree
    pub fn is_consistent(&self) -> bool {
        self.total_commands == self.total_vectors
    }
}
