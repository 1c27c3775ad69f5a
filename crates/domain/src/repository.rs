use futures::future::BoxFuture;

use crate::book::{Book, BookId, BookPatch, NewBook};
use crate::errors::RepositoryResult;

pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

/// Persistence boundary for books. Stateless across calls; implementations
/// go to the store on every operation and bind all parameters positionally.
pub trait BookRepository: Send + Sync {
    fn find_all(&self) -> RepositoryFuture<Vec<Book>>;
    fn find_one(&self, id: BookId) -> RepositoryFuture<Book>;
    fn create(&self, input: NewBook) -> RepositoryFuture<Book>;
    fn update(&self, id: BookId, patch: BookPatch) -> RepositoryFuture<Book>;
    fn remove(&self, id: BookId) -> RepositoryFuture<()>;
    fn count_by_year(&self, year: i32) -> RepositoryFuture<i64>;
}
