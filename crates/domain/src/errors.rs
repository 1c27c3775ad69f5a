//! Storage error taxonomy.
//!
//! Every repository failure resolves to exactly one of these kinds. The
//! `Storage` kind is deliberately opaque: it names the failed operation and
//! nothing else, so raw driver diagnostics stay in the logs.

use thiserror::Error;

use crate::book::BookId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested book does not exist.
    #[error("book {id} not found")]
    NotFound { id: BookId },

    /// The isbn uniqueness constraint rejected a create or update.
    #[error("isbn {isbn} already exists")]
    DuplicateIsbn { isbn: String },

    /// The store is unreachable: startup probe failure or pool wait timeout.
    #[error("storage unreachable: {context}")]
    Connectivity { context: String },

    /// Any other store-level failure, named by operation only.
    #[error("storage failure during {operation}")]
    Storage { operation: String },
}

impl RepositoryError {
    pub fn not_found(id: BookId) -> Self {
        Self::NotFound { id }
    }

    pub fn duplicate_isbn(isbn: impl Into<String>) -> Self {
        Self::DuplicateIsbn { isbn: isbn.into() }
    }

    pub fn connectivity(context: impl Into<String>) -> Self {
        Self::Connectivity {
            context: context.into(),
        }
    }

    pub fn storage(operation: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
