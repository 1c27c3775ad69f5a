//! Infrastructure layer.
//!
//! Owns the PostgreSQL connection pool lifecycle and the sqlx-backed
//! implementation of the repository interface defined in the domain crate.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use migrations::MIGRATOR;
pub use repository::PgBookRepository;
