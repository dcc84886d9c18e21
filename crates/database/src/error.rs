use std::time::Duration;

use configuration::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Seeding failed at record {index}: {source}")]
    Seed {
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("Seed dataset is malformed: {0}")]
    SeedFormat(#[from] serde_json::Error),

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage-generated id {0} is out of range for the id column")]
    IdOutOfRange(u64),

    #[error("The requested row was not found.")]
    NotFound,
}
