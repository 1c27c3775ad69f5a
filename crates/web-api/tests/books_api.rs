use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use domain::{
    Book, BookId, BookPatch, BookRepository, NewBook, RepositoryError, RepositoryFuture,
};
use web_api::{router, AppState};

/// Stateful in-memory stand-in for the Postgres repository, mirroring its
/// observable contract: store-assigned ids, isbn uniqueness, not-found on
/// absent ids, merge-by-presence updates.
#[derive(Default)]
struct InMemoryBooks {
    inner: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    last_id: i32,
    rows: Vec<Book>,
}

impl BookRepository for InMemoryBooks {
    fn find_all(&self) -> RepositoryFuture<Vec<Book>> {
        let rows = self.inner.lock().unwrap().rows.clone();
        Box::pin(async move { Ok(rows) })
    }

    fn find_one(&self, id: BookId) -> RepositoryFuture<Book> {
        let found = self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|book| book.id == id)
            .cloned();
        Box::pin(async move { found.ok_or_else(|| RepositoryError::not_found(id)) })
    }

    fn create(&self, input: NewBook) -> RepositoryFuture<Book> {
        let mut store = self.inner.lock().unwrap();
        let result = if store.rows.iter().any(|book| book.isbn == input.isbn) {
            Err(RepositoryError::duplicate_isbn(input.isbn))
        } else {
            store.last_id += 1;
            let book = Book {
                id: BookId::new(store.last_id),
                title: input.title,
                author: input.author,
                isbn: input.isbn,
                publication_year: input.publication_year,
            };
            store.rows.push(book.clone());
            Ok(book)
        };
        Box::pin(async move { result })
    }

    fn update(&self, id: BookId, patch: BookPatch) -> RepositoryFuture<Book> {
        let mut store = self.inner.lock().unwrap();
        let result = match store.rows.iter().position(|book| book.id == id) {
            None => Err(RepositoryError::not_found(id)),
            Some(pos) => {
                let merged = patch.merged_with(&store.rows[pos]);
                if store
                    .rows
                    .iter()
                    .any(|book| book.id != id && book.isbn == merged.isbn)
                {
                    Err(RepositoryError::duplicate_isbn(merged.isbn))
                } else {
                    store.rows[pos] = merged.clone();
                    Ok(merged)
                }
            }
        };
        Box::pin(async move { result })
    }

    fn remove(&self, id: BookId) -> RepositoryFuture<()> {
        let mut store = self.inner.lock().unwrap();
        let before = store.rows.len();
        store.rows.retain(|book| book.id != id);
        let removed = store.rows.len() < before;
        Box::pin(async move {
            if removed {
                Ok(())
            } else {
                Err(RepositoryError::not_found(id))
            }
        })
    }

    fn count_by_year(&self, year: i32) -> RepositoryFuture<i64> {
        let count = self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|book| book.publication_year == year)
            .count() as i64;
        Box::pin(async move { Ok(count) })
    }
}

/// Repository whose every operation fails with an opaque storage error.
struct BrokenBooks;

impl BookRepository for BrokenBooks {
    fn find_all(&self) -> RepositoryFuture<Vec<Book>> {
        Box::pin(async { Err(RepositoryError::storage("find all books")) })
    }
    fn find_one(&self, _id: BookId) -> RepositoryFuture<Book> {
        Box::pin(async { Err(RepositoryError::storage("find book")) })
    }
    fn create(&self, _input: NewBook) -> RepositoryFuture<Book> {
        Box::pin(async { Err(RepositoryError::storage("create book")) })
    }
    fn update(&self, _id: BookId, _patch: BookPatch) -> RepositoryFuture<Book> {
        Box::pin(async { Err(RepositoryError::storage("update book")) })
    }
    fn remove(&self, _id: BookId) -> RepositoryFuture<()> {
        Box::pin(async { Err(RepositoryError::storage("delete book")) })
    }
    fn count_by_year(&self, _year: i32) -> RepositoryFuture<i64> {
        Box::pin(async { Err(RepositoryError::storage("count books by year")) })
    }
}

fn app() -> Router {
    router(AppState::new(Arc::new(InMemoryBooks::default())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn create_then_read_count_and_remove() {
    let app = app();

    let (status, created) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "Dune",
            "author": "Herbert",
            "isbn": "111",
            "publication_year": 1965
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["title"], "Dune");
    assert_eq!(created["author"], "Herbert");
    assert_eq!(created["isbn"], "111");
    assert_eq!(created["publication_year"], 1965);

    let (status, fetched) = send(&app, "GET", &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, count) = send(&app, "GET", "/books/count/1965", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 1);

    let (status, count) = send(&app, "GET", "/books/count/2001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOK_NOT_FOUND");
}

#[tokio::test]
async fn duplicate_isbn_is_a_conflict_and_not_persisted() {
    let app = app();

    let first = json!({
        "title": "Foundation",
        "author": "Asimov",
        "isbn": "222",
        "publication_year": 1951
    });
    let (status, _) = send(&app, "POST", "/books", Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = json!({
        "title": "Foundation and Empire",
        "author": "Asimov",
        "isbn": "222",
        "publication_year": 1952
    });
    let (status, body) = send(&app, "POST", "/books", Some(second)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ISBN_EXISTS");

    let (status, all) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    let with_isbn: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|book| book["isbn"] == "222")
        .collect();
    assert_eq!(with_isbn.len(), 1);
}

#[tokio::test]
async fn patch_merges_by_presence() {
    let app = app();

    let (_, created) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "Dune",
            "author": "Herbert",
            "isbn": "111",
            "publication_year": 1965
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // Only the supplied field changes.
    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/books/{id}"),
        Some(json!({"title": "Dune Messiah"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Dune Messiah");
    assert_eq!(patched["author"], "Herbert");
    assert_eq!(patched["isbn"], "111");
    assert_eq!(patched["publication_year"], 1965);

    // An empty patch is a no-op.
    let (status, unchanged) = send(&app, "PATCH", &format!("/books/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, patched);

    // A blank title does not erase the stored one.
    let (status, unchanged) = send(
        &app,
        "PATCH",
        &format!("/books/{id}"),
        Some(json!({"title": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["title"], "Dune Messiah");
}

#[tokio::test]
async fn unknown_ids_map_to_not_found() {
    let app = app();

    let (status, _) = send(&app, "GET", "/books/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/books/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        "/books/404",
        Some(json!({"title": "ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "",
            "author": "Herbert",
            "isbn": "111",
            "publication_year": 1965
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, all) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn storage_failures_stay_opaque() {
    let app = router(AppState::new(Arc::new(BrokenBooks)));

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_ERROR");
    // Operation name only, never a driver diagnostic.
    assert_eq!(body["message"], "storage failure during find all books");
}
