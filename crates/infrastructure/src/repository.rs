//! sqlx-backed book repository.
//!
//! Every statement binds its parameters positionally; no SQL is built by
//! concatenating user input. Driver errors are classified here, at the
//! boundary: unique violations on the isbn column become `DuplicateIsbn`,
//! pool exhaustion and I/O loss become `Connectivity`, anything else is
//! logged with its raw diagnostic and surfaced as an opaque `Storage` error.

use domain::{
    Book, BookId, BookPatch, BookRepository, NewBook, RepositoryError, RepositoryFuture,
    RepositoryResult,
};
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
struct BookRecord {
    id: i32,
    title: String,
    author: String,
    isbn: String,
    publication_year: i32,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Book {
            id: BookId::new(record.id),
            title: record.title,
            author: record.author,
            isbn: record.isbn,
            publication_year: record.publication_year,
        }
    }
}

fn classify(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match err {
        err @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
            tracing::warn!(operation, error = %err, "storage unreachable");
            RepositoryError::connectivity(err.to_string())
        }
        err => {
            // Raw driver detail stays in the log; callers only see the
            // operation name.
            tracing::error!(operation, error = %err, "storage operation failed");
            RepositoryError::storage(operation)
        }
    }
}

/// Classification for statements that write the isbn column, where a unique
/// violation is an expected, recognizable outcome rather than a fault.
fn classify_write(operation: &'static str, isbn: &str, err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        let on_isbn = db_err.constraint().map_or(true, |name| name.contains("isbn"));
        if db_err.is_unique_violation() && on_isbn {
            return RepositoryError::duplicate_isbn(isbn);
        }
    }
    classify(operation, err)
}

async fn fetch_book(pool: &PgPool, id: BookId, operation: &'static str) -> RepositoryResult<Book> {
    let record = sqlx::query_as::<_, BookRecord>(
        "SELECT id, title, author, isbn, publication_year FROM books WHERE id = $1",
    )
    .bind(id.value())
    .fetch_optional(pool)
    .await
    .map_err(|err| classify(operation, err))?;

    record
        .map(Book::from)
        .ok_or_else(|| RepositoryError::not_found(id))
}

#[derive(Clone)]
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl BookRepository for PgBookRepository {
    fn find_all(&self) -> RepositoryFuture<Vec<Book>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, BookRecord>(
                "SELECT id, title, author, isbn, publication_year FROM books",
            )
            .fetch_all(&pool)
            .await
            .map_err(|err| classify("find all books", err))?;

            Ok(records.into_iter().map(Book::from).collect())
        })
    }

    fn find_one(&self, id: BookId) -> RepositoryFuture<Book> {
        let pool = self.pool.clone();
        Box::pin(async move { fetch_book(&pool, id, "find book").await })
    }

    fn create(&self, input: NewBook) -> RepositoryFuture<Book> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, BookRecord>(
                r#"
                INSERT INTO books (title, author, isbn, publication_year)
                VALUES ($1, $2, $3, $4)
                RETURNING id, title, author, isbn, publication_year
                "#,
            )
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.isbn)
            .bind(input.publication_year)
            .fetch_one(&pool)
            .await
            .map_err(|err| classify_write("create book", &input.isbn, err))?;

            Ok(Book::from(record))
        })
    }

    fn update(&self, id: BookId, patch: BookPatch) -> RepositoryFuture<Book> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // Resolve the current row first so absent patch fields fall back
            // to their stored values. The read and the write are not wrapped
            // in a transaction; last writer wins.
            let current = fetch_book(&pool, id, "update book").await?;
            let merged = patch.merged_with(&current);

            let record = sqlx::query_as::<_, BookRecord>(
                r#"
                UPDATE books
                SET title = $1, author = $2, isbn = $3, publication_year = $4
                WHERE id = $5
                RETURNING id, title, author, isbn, publication_year
                "#,
            )
            .bind(&merged.title)
            .bind(&merged.author)
            .bind(&merged.isbn)
            .bind(merged.publication_year)
            .bind(id.value())
            .fetch_optional(&pool)
            .await
            .map_err(|err| classify_write("update book", &merged.isbn, err))?;

            // Zero rows here means the row vanished between read and write.
            record
                .map(Book::from)
                .ok_or_else(|| RepositoryError::not_found(id))
        })
    }

    fn remove(&self, id: BookId) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM books WHERE id = $1")
                .bind(id.value())
                .execute(&pool)
                .await
                .map_err(|err| classify("delete book", err))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::not_found(id));
            }
            Ok(())
        })
    }

    fn count_by_year(&self, year: i32) -> RepositoryFuture<i64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE publication_year = $1")
                    .bind(year)
                    .fetch_one(&pool)
                    .await
                    .map_err(|err| classify("count books by year", err))?;

            Ok(count)
        })
    }
}
