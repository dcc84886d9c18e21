//! One-time seed pass: load the embedded dataset into an empty table.
//!
//! The check is count-then-insert, so two replicas racing each other can in
//! principle both observe zero rows; the store's write serialization keeps the
//! table consistent but duplicates are possible in that window. Single-writer
//! deployments (the intended shape) are exact. The insert itself runs in one
//! transaction: a failure partway through rolls back to zero rows, so the next
//! start re-seeds cleanly instead of being stuck with a partial dataset.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::error::DbError;
use crate::service::ServiceKind;

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Thread seeds carry explicit ids; they are honored on insert so references
/// from the post dataset stay stable.
#[derive(Debug, Deserialize)]
pub struct SeedThread {
    pub id: i32,
    pub title: String,
    pub created_by: i32,
}

#[derive(Debug, Deserialize)]
pub struct SeedPost {
    pub thread_id: i32,
    pub body: String,
    pub user_id: i32,
}

impl SeedUser {
    pub fn dataset() -> Result<Vec<Self>, DbError> {
        dataset(ServiceKind::Users)
    }
}

impl SeedThread {
    pub fn dataset() -> Result<Vec<Self>, DbError> {
        dataset(ServiceKind::Threads)
    }
}

impl SeedPost {
    pub fn dataset() -> Result<Vec<Self>, DbError> {
        dataset(ServiceKind::Posts)
    }
}

fn dataset<T: DeserializeOwned>(service: ServiceKind) -> Result<Vec<T>, DbError> {
    serde_json::from_str(service.seed_json()).map_err(DbError::from)
}

/// How many records a full seed pass inserts for this service.
pub fn dataset_len(service: ServiceKind) -> Result<usize, DbError> {
    match service {
        ServiceKind::Users => SeedUser::dataset().map(|d| d.len()),
        ServiceKind::Threads => SeedThread::dataset().map(|d| d.len()),
        ServiceKind::Posts => SeedPost::dataset().map(|d| d.len()),
    }
}

/// The count-guard: seeding happens if and only if the table holds exactly
/// zero rows. Any prior data, seeded or user-created, suppresses the pass.
pub(crate) fn seed_required(existing: i64) -> bool {
    existing == 0
}

/// Inserts the embedded seed dataset if and only if the table is empty.
///
/// Records are inserted in dataset order. Returns the number of rows inserted
/// (zero when the table already holds data).
pub async fn seed_if_empty(pool: &MySqlPool, service: ServiceKind) -> Result<u64, DbError> {
    let count_sql = format!("SELECT COUNT(*) FROM {}", service.table());
    let existing: i64 = sqlx::query_scalar(&count_sql)
        .fetch_one(pool)
        .await
        .map_err(DbError::Query)?;

    if !seed_required(existing) {
        tracing::info!(table = service.table(), rows = existing, "table already seeded");
        return Ok(0);
    }

    let mut tx = pool.begin().await.map_err(DbError::Query)?;

    let inserted = match service {
        ServiceKind::Users => insert_users(&mut tx).await?,
        ServiceKind::Threads => insert_threads(&mut tx).await?,
        ServiceKind::Posts => insert_posts(&mut tx).await?,
    };

    tx.commit().await.map_err(DbError::Query)?;

    tracing::info!(table = service.table(), inserted, "seed dataset loaded");
    Ok(inserted)
}

async fn insert_users(tx: &mut Transaction<'_, MySql>) -> Result<u64, DbError> {
    let records = SeedUser::dataset()?;
    let mut inserted = 0u64;
    for (index, record) in records.iter().enumerate() {
        sqlx::query("INSERT INTO users (name, email, username) VALUES (?, ?, ?)")
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.username)
            .execute(&mut **tx)
            .await
            .map_err(|source| DbError::Seed { index, source })?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn insert_threads(tx: &mut Transaction<'_, MySql>) -> Result<u64, DbError> {
    let records = SeedThread::dataset()?;
    let mut inserted = 0u64;
    for (index, record) in records.iter().enumerate() {
        sqlx::query("INSERT INTO threads (id, title, created_by) VALUES (?, ?, ?)")
            .bind(record.id)
            .bind(&record.title)
            .bind(record.created_by)
            .execute(&mut **tx)
            .await
            .map_err(|source| DbError::Seed { index, source })?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn insert_posts(tx: &mut Transaction<'_, MySql>) -> Result<u64, DbError> {
    let records = SeedPost::dataset()?;
    let mut inserted = 0u64;
    for (index, record) in records.iter().enumerate() {
        sqlx::query("INSERT INTO posts (thread_id, body, user_id) VALUES (?, ?, ?)")
            .bind(record.thread_id)
            .bind(&record.body)
            .bind(record.user_id)
            .execute(&mut **tx)
            .await
            .map_err(|source| DbError::Seed { index, source })?;
        inserted += 1;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_is_required_only_for_an_empty_table() {
        assert!(seed_required(0));
        // One row is enough to suppress the pass, wherever it came from.
        assert!(!seed_required(1));
        assert!(!seed_required(42));
    }

    #[test]
    fn user_dataset_parses_in_order() {
        let users = SeedUser::dataset().unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].name, "Ana");
        assert_eq!(users[1].name, "Brais");
        // Username is optional and may be absent from a record.
        assert_eq!(users[2].username, None);
    }

    #[test]
    fn thread_dataset_supplies_explicit_ids() {
        let threads = SeedThread::dataset().unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].id, 1);
        assert_eq!(threads[1].id, 2);
    }

    #[test]
    fn post_dataset_references_seeded_threads() {
        let threads = SeedThread::dataset().unwrap();
        let posts = SeedPost::dataset().unwrap();
        assert_eq!(posts.len(), 4);
        for post in &posts {
            assert!(threads.iter().any(|t| t.id == post.thread_id));
        }
    }
}
