//! Authentication routes for admin login.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiError;
use biblio_core::auth::verify_password;
use biblio_db::AdminRepository;
use biblio_shared::AppError;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Request body for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Admin username.
    #[validate(length(min = 1))]
    pub username: String,
    /// Admin password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Public profile of an authenticated admin.
#[derive(Debug, Serialize)]
pub struct AdminInfo {
    /// Admin ID.
    pub id: Uuid,
    /// Admin username.
    pub username: String,
    /// Admin display name.
    pub full_name: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Confirmation message.
    pub message: &'static str,
    /// The authenticated admin.
    pub user: AdminInfo,
}

fn invalid_credentials() -> ApiError {
    AppError::Unauthorized("invalid username or password".to_string()).into()
}

/// POST /auth/login - Authenticate an admin.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.validate().is_err() {
        return Err(
            AppError::Validation("username and password are required".to_string()).into(),
        );
    }

    let admin_repo = AdminRepository::new((*state.db).clone());

    let Some(admin) = admin_repo.find_by_username(&payload.username).await? else {
        info!(username = %payload.username, "Login attempt for unknown admin");
        return Err(invalid_credentials());
    };

    let password_matches = verify_password(&payload.password, &admin.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !password_matches {
        info!(admin_id = %admin.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    info!(admin_id = %admin.id, "Admin logged in successfully");

    Ok(Json(LoginResponse {
        message: "Login successful",
        user: AdminInfo {
            id: admin.id,
            username: admin.username,
            full_name: admin.full_name,
        },
    }))
}
