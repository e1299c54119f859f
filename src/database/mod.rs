//! Database connection management
//!
//! The pool connects lazily: the server starts even when MySQL is down, and
//! each request surfaces the connection failure on its own.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::{mask_database_url, DatabaseConfig};
use crate::error::Result;

pub mod ips_repository;
pub mod procedures;

pub use ips_repository::IpsRepository;
pub use procedures::{call_statement, ProcedureParam, ProcedureRunner};

/// Database connection manager
pub struct DatabaseManager {
    pool: MySqlPool,
}

impl DatabaseManager {
    /// Create the pool. No connection is opened until the first query.
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let url = config.database_url()?;
        info!("Database pool configured for {}", mask_database_url(&url));

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_lazy(url.as_str())?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn repository(&self) -> IpsRepository {
        IpsRepository::new(ProcedureRunner::new(self.pool.clone()))
    }

    /// Test database connectivity
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}
