use sqlx::MySqlPool;

use crate::error::DbError;
use crate::service::ServiceKind;

/// Ensures this service's table exists.
///
/// The DDL is `CREATE TABLE IF NOT EXISTS`, so the call is idempotent by
/// construction rather than by compare-then-act: running it against an
/// existing table (even one created by an earlier crashed start) is a no-op,
/// and it never alters columns. Called exactly once per process start, before
/// seeding and before any request is served. A failure here is fatal; a
/// service without its table must not come up.
pub async fn ensure_schema(pool: &MySqlPool, service: ServiceKind) -> Result<(), DbError> {
    sqlx::query(service.ddl())
        .execute(pool)
        .await
        .map_err(DbError::Schema)?;

    tracing::info!(table = service.table(), "schema ready");
    Ok(())
}
