use std::fmt;

use serde::{Deserialize, Serialize};

/// Which entity table a service instance is responsible for.
///
/// The three microforum services share one bootstrap-and-serve core; this enum
/// is the only thing that varies between deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ServiceKind {
    Users,
    Threads,
    Posts,
}

impl ServiceKind {
    /// The service (and table) name, e.g. `"users"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Threads => "threads",
            Self::Posts => "posts",
        }
    }

    /// The table name this service owns. Identical to `name` today; kept
    /// separate so routes and tables can diverge without touching SQL.
    pub fn table(&self) -> &'static str {
        self.name()
    }

    /// Idempotent schema DDL for this service's table. A no-op when the table
    /// already exists; never alters existing columns.
    pub fn ddl(&self) -> &'static str {
        match self {
            Self::Users => {
                "CREATE TABLE IF NOT EXISTS users (
                    id INT PRIMARY KEY AUTO_INCREMENT,
                    name VARCHAR(100) NOT NULL,
                    email VARCHAR(100) NOT NULL,
                    username VARCHAR(100)
                )"
            }
            Self::Threads => {
                "CREATE TABLE IF NOT EXISTS threads (
                    id INT PRIMARY KEY AUTO_INCREMENT,
                    title TEXT NOT NULL,
                    created_by INT NOT NULL
                )"
            }
            Self::Posts => {
                "CREATE TABLE IF NOT EXISTS posts (
                    id INT PRIMARY KEY AUTO_INCREMENT,
                    thread_id INT NOT NULL,
                    body TEXT NOT NULL,
                    user_id INT NOT NULL
                )"
            }
        }
    }

    /// The embedded seed dataset for this service, as JSON.
    pub fn seed_json(&self) -> &'static str {
        match self {
            Self::Users => include_str!("../seeds/users.json"),
            Self::Threads => include_str!("../seeds/threads.json"),
            Self::Posts => include_str!("../seeds/posts.json"),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_is_idempotent_by_construction() {
        for kind in [ServiceKind::Users, ServiceKind::Threads, ServiceKind::Posts] {
            assert!(kind.ddl().contains("CREATE TABLE IF NOT EXISTS"));
            assert!(kind.ddl().contains(kind.table()));
        }
    }

    #[test]
    fn names_match_tables() {
        assert_eq!(ServiceKind::Users.name(), "users");
        assert_eq!(ServiceKind::Threads.table(), "threads");
        assert_eq!(ServiceKind::Posts.to_string(), "posts");
    }
}
