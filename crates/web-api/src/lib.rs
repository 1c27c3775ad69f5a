//! Web API layer.
//!
//! Thin axum adapter over the repository: decodes requests into typed
//! inputs, validates required fields, and maps each repository error kind
//! to a transport status code. No business logic lives here.

mod error;
mod routes;
mod state;

pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
