//! HTTP mapping for application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use biblio_core::covers::CoverError;
use biblio_db::repositories::{BookError, CirculationError};
use biblio_shared::AppError;
use sea_orm::DbErr;

/// Wrapper turning [`AppError`] into an HTTP response.
///
/// Handlers return `Result<_, ApiError>` and bubble repository errors up
/// with `?`; the conversions below pick the taxonomy entry and therefore
/// the status code.
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        Self(AppError::Database(error.to_string()))
    }
}

impl From<CirculationError> for ApiError {
    fn from(error: CirculationError) -> Self {
        let app_error = match &error {
            CirculationError::BookNotFound(_) | CirculationError::BorrowingNotFound { .. } => {
                AppError::NotFound(error.to_string())
            }
            CirculationError::OutOfStock(_) => AppError::BusinessRule(error.to_string()),
            CirculationError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app_error)
    }
}

impl From<BookError> for ApiError {
    fn from(error: BookError) -> Self {
        let app_error = match &error {
            BookError::NotFound(_) => AppError::NotFound(error.to_string()),
            BookError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app_error)
    }
}

impl From<CoverError> for ApiError {
    fn from(error: CoverError) -> Self {
        let app_error = match &error {
            CoverError::FileTooLarge { .. } | CoverError::InvalidMimeType { .. } => {
                AppError::Validation(error.to_string())
            }
            _ => AppError::ExternalService(error.to_string()),
        };
        Self(app_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_out_of_stock_maps_to_conflict() {
        let api_error = ApiError::from(CirculationError::OutOfStock(Uuid::new_v4()));
        assert_eq!(api_error.0.status_code(), 409);
        assert_eq!(api_error.0.error_code(), "BUSINESS_RULE_VIOLATION");
    }

    #[test]
    fn test_missing_book_maps_to_not_found() {
        let api_error = ApiError::from(CirculationError::BookNotFound(Uuid::new_v4()));
        assert_eq!(api_error.0.status_code(), 404);
    }

    #[test]
    fn test_mismatched_borrowing_maps_to_not_found() {
        let api_error = ApiError::from(CirculationError::BorrowingNotFound {
            borrowing_id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
        });
        assert_eq!(api_error.0.status_code(), 404);
    }

    #[test]
    fn test_db_error_maps_to_internal() {
        let api_error = ApiError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(api_error.0.status_code(), 500);
        assert_eq!(api_error.0.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_oversized_cover_maps_to_validation() {
        let api_error = ApiError::from(CoverError::FileTooLarge { size: 10, max: 1 });
        assert_eq!(api_error.0.status_code(), 400);
    }
}
