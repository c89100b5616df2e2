//! # zonealarm-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ByteStore` port defined in `zonealarm-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//!
//! Each key is a single row replaced by an upsert, so a snapshot collection
//! is either fully old or fully new after a crash.
//!
//! ## Dependency rule
//! Depends on `zonealarm-app` (for port traits) and `zonealarm-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod byte_store;
pub mod error;
pub mod pool;
