use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use validator::Validate;

use domain::{Book, BookId, BookPatch, NewBook};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
struct CreateBookPayload {
    #[validate(length(min = 1, message = "title must not be empty"))]
    title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    author: String,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    isbn: String,
    publication_year: i32,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateBookPayload {
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    publication_year: Option<i32>,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    count: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(book_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/count/{year}", get(count_by_year))
        .route(
            "/books/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.books.find_all().await?;
    Ok(Json(books))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Book>, ApiError> {
    let book = state.books.find_one(BookId::new(id)).await?;
    Ok(Json(book))
}

async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookPayload>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let book = state
        .books
        .create(NewBook {
            title: payload.title,
            author: payload.author,
            isbn: payload.isbn,
            publication_year: payload.publication_year,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookPayload>,
) -> Result<Json<Book>, ApiError> {
    let book = state
        .books
        .update(
            BookId::new(id),
            BookPatch {
                title: payload.title,
                author: payload.author,
                isbn: payload.isbn,
                publication_year: payload.publication_year,
            },
        )
        .await?;
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.books.remove(BookId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn count_by_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.books.count_by_year(year).await?;
    Ok(Json(CountResponse { count }))
}
