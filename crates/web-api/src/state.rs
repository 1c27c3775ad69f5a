use std::sync::Arc;

use domain::BookRepository;

/// Shared handler state. The repository is injected behind the trait so
/// tests can substitute an in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookRepository>,
}

impl AppState {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }
}
