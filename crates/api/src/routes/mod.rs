//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod auth;
pub mod books;
pub mod circulation;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(books::routes())
        .merge(circulation::routes())
}
