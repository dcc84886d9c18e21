use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

use crate::error::DbError;

/// Upper bound on any single request-time query. On expiry the call fails
/// with a retryable `DbError::Timeout`; retrying is the caller's concern.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// The health round trip gets a tighter bound: a hung database must not hang
/// health checks.
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
}

/// A user as submitted by a create request; the id is storage-generated.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// A row from the `threads` table. `created_by` is a soft reference to a user
/// id; nothing validates it at write time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Thread {
    pub id: i32,
    pub title: String,
    pub created_by: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewThread {
    pub title: String,
    pub created_by: i32,
}

/// A row from the `posts` table. `thread_id` and `user_id` are soft references.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub thread_id: i32,
    pub body: String,
    pub user_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub thread_id: i32,
    pub body: String,
    pub user_id: i32,
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all request-time SQL; one database round
/// trip per call, no caching.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: MySqlPool,
}

/// Converts the raw `last_insert_id` into the id column's type. The column
/// is a signed INT, so a value past `i32::MAX` is an error, not a wrap.
fn generated_id(raw: u64) -> Result<i32, DbError> {
    i32::try_from(raw).map_err(|_| DbError::IdOutOfRange(raw))
}

/// Runs a query future under the standard per-call bound.
async fn bounded<T, F>(fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result.map_err(DbError::Query),
        Err(_) => Err(DbError::Timeout(QUERY_TIMEOUT)),
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` borrowing the shared connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for startup code that runs DDL and seeding.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Trivial round trip used by the health probe. Tightly bounded so a hung
    /// database degrades readiness instead of wedging the probe.
    pub async fn ping(&self) -> Result<(), DbError> {
        let query = sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&self.pool);
        match tokio::time::timeout(PING_TIMEOUT, query).await {
            Ok(result) => {
                result.map_err(DbError::Query)?;
                Ok(())
            }
            Err(_) => Err(DbError::Timeout(PING_TIMEOUT)),
        }
    }

    // --- users ---

    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        bounded(
            sqlx::query_as::<_, User>("SELECT id, name, email, username FROM users")
                .fetch_all(&self.pool),
        )
        .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, DbError> {
        bounded(
            sqlx::query_as::<_, User>("SELECT id, name, email, username FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    pub async fn insert_user(&self, new: NewUser) -> Result<User, DbError> {
        let result = bounded(
            sqlx::query("INSERT INTO users (name, email, username) VALUES (?, ?, ?)")
                .bind(&new.name)
                .bind(&new.email)
                .bind(&new.username)
                .execute(&self.pool),
        )
        .await?;

        Ok(User {
            id: generated_id(result.last_insert_id())?,
            name: new.name,
            email: new.email,
            username: new.username,
        })
    }

    // --- threads ---

    pub async fn list_threads(&self) -> Result<Vec<Thread>, DbError> {
        bounded(
            sqlx::query_as::<_, Thread>("SELECT id, title, created_by FROM threads")
                .fetch_all(&self.pool),
        )
        .await
    }

    pub async fn get_thread(&self, id: i32) -> Result<Option<Thread>, DbError> {
        bounded(
            sqlx::query_as::<_, Thread>("SELECT id, title, created_by FROM threads WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    pub async fn insert_thread(&self, new: NewThread) -> Result<Thread, DbError> {
        let result = bounded(
            sqlx::query("INSERT INTO threads (title, created_by) VALUES (?, ?)")
                .bind(&new.title)
                .bind(new.created_by)
                .execute(&self.pool),
        )
        .await?;

        Ok(Thread {
            id: generated_id(result.last_insert_id())?,
            title: new.title,
            created_by: new.created_by,
        })
    }

    // --- posts ---

    pub async fn list_posts(&self) -> Result<Vec<Post>, DbError> {
        bounded(
            sqlx::query_as::<_, Post>("SELECT id, thread_id, body, user_id FROM posts")
                .fetch_all(&self.pool),
        )
        .await
    }

    pub async fn get_post(&self, id: i32) -> Result<Option<Post>, DbError> {
        bounded(
            sqlx::query_as::<_, Post>(
                "SELECT id, thread_id, body, user_id FROM posts WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    /// All posts whose thread reference equals `thread_id`; possibly empty.
    pub async fn posts_in_thread(&self, thread_id: i32) -> Result<Vec<Post>, DbError> {
        bounded(
            sqlx::query_as::<_, Post>(
                "SELECT id, thread_id, body, user_id FROM posts WHERE thread_id = ?",
            )
            .bind(thread_id)
            .fetch_all(&self.pool),
        )
        .await
    }

    /// All posts whose author reference equals `user_id`; possibly empty.
    pub async fn posts_by_user(&self, user_id: i32) -> Result<Vec<Post>, DbError> {
        bounded(
            sqlx::query_as::<_, Post>(
                "SELECT id, thread_id, body, user_id FROM posts WHERE user_id = ?",
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await
    }

    pub async fn insert_post(&self, new: NewPost) -> Result<Post, DbError> {
        let result = bounded(
            sqlx::query("INSERT INTO posts (thread_id, body, user_id) VALUES (?, ?, ?)")
                .bind(new.thread_id)
                .bind(&new.body)
                .bind(new.user_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(Post {
            id: generated_id(result.last_insert_id())?,
            thread_id: new.thread_id,
            body: new.body,
            user_id: new.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_within_range_pass_through() {
        assert_eq!(generated_id(1).unwrap(), 1);
        assert_eq!(generated_id(i32::MAX as u64).unwrap(), i32::MAX);
    }

    #[test]
    fn overflowing_generated_id_is_an_error_not_a_wrap() {
        let raw = i32::MAX as u64 + 1;
        assert!(matches!(
            generated_id(raw),
            Err(DbError::IdOutOfRange(value)) if value == raw
        ));
    }
}
