//! # Microforum Database Crate
//!
//! This crate is the service's only interface to the relational store. It owns
//! the connection pool, the idempotent schema bootstrap, the one-time seed
//! pass, and all SQL issued at request time.
//!
//! ## Architectural Principles
//!
//! - **Single owner:** the pool created by `connect` is the only set of live
//!   sockets to storage in the process; every other component borrows it per
//!   call and never retains a connection beyond a single operation.
//! - **Idempotent bootstrap:** schema creation is `CREATE TABLE IF NOT EXISTS`
//!   (a no-op when the table exists) and seeding runs only against an empty
//!   table, inside one transaction, so both are safe to re-run on every start.
//! - **Bounded calls:** every request-time query carries a timeout; a hung
//!   database surfaces as a retryable `DbError::Timeout`, never an unbounded
//!   stall.
//!
//! ## Public API
//!
//! - `connection::connect`: establishes the pooled connection from `Settings`.
//! - `bootstrap::ensure_schema` / `seed::seed_if_empty`: the startup sequence.
//! - `DbRepository`: high-level data access (list, get, filter, insert, ping).
//! - `ServiceKind`: which entity table this process is responsible for.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod bootstrap;
pub mod connection;
pub mod error;
pub mod repository;
pub mod seed;
pub mod service;

// Re-export the key components to create a clean, public-facing API.
// The pool type is re-exported so dependents do not need their own sqlx dep.
pub use sqlx::MySqlPool;

pub use error::DbError;
pub use repository::{DbRepository, NewPost, NewThread, NewUser, Post, Thread, User};
pub use service::ServiceKind;
