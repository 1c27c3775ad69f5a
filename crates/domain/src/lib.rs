//! Core domain model of the book record service.
//!
//! Contains the `Book` entity, the partial-update merge semantics, the
//! repository abstraction and the storage error taxonomy.

pub mod book;
pub mod errors;
pub mod repository;

pub use book::{Book, BookId, BookPatch, NewBook};
pub use errors::{RepositoryError, RepositoryResult};
pub use repository::{BookRepository, RepositoryFuture};
