use std::time::Duration;

use configuration::Settings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::error::DbError;

/// How long a caller may wait for a pooled connection before the acquire
/// fails. Keeps a saturated pool from queueing requests forever.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Establishes the connection pool to the MySQL database.
///
/// The returned pool is the process's single owner of sockets to storage; it
/// is created once at startup and shared (cheaply cloned) by every component
/// that needs to talk to the database.
pub async fn connect(settings: &Settings) -> Result<MySqlPool, DbError> {
    let url = settings.connection_url()?;

    let pool = MySqlPoolOptions::new()
        .max_connections(settings.db_pool_size)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&url)
        .await
        .map_err(DbError::Connection)?;

    tracing::info!(
        host = settings.db_host.as_deref().unwrap_or("<url>"),
        database = %settings.db_name,
        pool_size = settings.db_pool_size,
        "connected to MySQL"
    );

    Ok(pool)
}

/// Builds the pool without touching the network. The first real connection is
/// attempted lazily on first use, so an unreachable database shows up as a
/// query/health failure instead of blocking construction. Used by tooling and
/// tests that exercise degraded paths.
pub fn connect_lazy(settings: &Settings) -> Result<MySqlPool, DbError> {
    let url = settings.connection_url()?;

    let pool = MySqlPoolOptions::new()
        .max_connections(settings.db_pool_size)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy(&url)
        .map_err(DbError::Connection)?;

    Ok(pool)
}
