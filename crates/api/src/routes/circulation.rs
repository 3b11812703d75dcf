//! Circulation routes for borrowing and returning copies.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiError;
use biblio_db::entities::{borrowings, sea_orm_active_enums::BookStatus};
use biblio_db::repositories::{BorrowRequest, CirculationRepository};
use biblio_shared::AppError;

/// Creates the circulation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/{id}/borrow", post(borrow_book))
        .route(
            "/books/{id}/borrowings/{borrowing_id}",
            delete(return_book),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for borrowing a copy.
#[derive(Debug, Deserialize, Validate)]
pub struct BorrowPayload {
    /// Borrower's name.
    #[validate(length(min = 1))]
    pub borrower_name: String,
    /// Borrower's phone number.
    #[validate(length(min = 1))]
    pub borrower_phone: String,
    /// Username of the admin processing the loan.
    #[validate(length(min = 1))]
    pub handled_by: String,
}

/// One open borrowing, as embedded in book responses.
#[derive(Debug, Serialize)]
pub struct BorrowingResponse {
    /// Borrowing ID.
    pub id: Uuid,
    /// Borrower's name.
    pub name: String,
    /// Borrower's phone number.
    pub phone: String,
    /// When the copy was lent out (ISO 8601).
    pub date: String,
    /// Username of the admin who processed the loan.
    pub handled_by: String,
}

impl From<borrowings::Model> for BorrowingResponse {
    fn from(model: borrowings::Model) -> Self {
        Self {
            id: model.id,
            name: model.borrower_name,
            phone: model.borrower_phone,
            date: model.borrowed_at.to_rfc3339(),
            handled_by: model.handled_by,
        }
    }
}

/// Response for a committed borrow.
#[derive(Debug, Serialize)]
pub struct BorrowResponse {
    /// Confirmation message.
    pub message: String,
    /// The created borrowing.
    pub borrowing: BorrowingResponse,
    /// Stock count after the decrement.
    pub new_stock: i32,
    /// Availability after the decrement.
    pub new_status: BookStatus,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /books/{id}/borrow - Lend one copy of a book.
async fn borrow_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<BorrowPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.validate().is_err() {
        return Err(AppError::Validation(
            "borrower name, phone, and handler are required".to_string(),
        )
        .into());
    }

    let circulation = CirculationRepository::new((*state.db).clone());

    let outcome = circulation
        .borrow_copy(BorrowRequest {
            book_id,
            borrower_name: payload.borrower_name,
            borrower_phone: payload.borrower_phone,
            handled_by: payload.handled_by,
        })
        .await?;

    info!(
        book_id = %book_id,
        borrowing_id = %outcome.borrowing.id,
        new_stock = outcome.new_stock,
        "Copy lent out"
    );

    let response = BorrowResponse {
        message: format!("Book \"{}\" borrowed successfully.", outcome.book_title),
        borrowing: outcome.borrowing.into(),
        new_stock: outcome.new_stock,
        new_status: outcome.new_status,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /books/{id}/borrowings/{borrowing_id} - Take back one copy.
async fn return_book(
    State(state): State<AppState>,
    Path((book_id, borrowing_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let circulation = CirculationRepository::new((*state.db).clone());

    circulation.return_copy(book_id, borrowing_id).await?;

    info!(
        book_id = %book_id,
        borrowing_id = %borrowing_id,
        "Copy returned"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_borrowing() -> borrowings::Model {
        borrowings::Model {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            borrower_name: "Alice".to_string(),
            borrower_phone: "555-0100".to_string(),
            handled_by: "staff1".to_string(),
            borrowed_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_borrowing_response_renames_fields() {
        let model = sample_borrowing();
        let response = BorrowingResponse::from(model.clone());

        assert_eq!(response.id, model.id);
        assert_eq!(response.name, "Alice");
        assert_eq!(response.phone, "555-0100");
        assert_eq!(response.handled_by, "staff1");
        assert!(!response.date.is_empty());
    }

    #[test]
    fn test_borrow_payload_rejects_blank_fields() {
        let payload = BorrowPayload {
            borrower_name: String::new(),
            borrower_phone: "555-0100".to_string(),
            handled_by: "staff1".to_string(),
        };
        assert!(payload.validate().is_err());

        let payload = BorrowPayload {
            borrower_name: "Alice".to_string(),
            borrower_phone: "555-0100".to_string(),
            handled_by: "staff1".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
