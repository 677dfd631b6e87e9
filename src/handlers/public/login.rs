// handlers/public/login.rs - POST /login handler

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::handlers::utils::{hash_blocking, verify_blocking};
use crate::state::AppState;

pub const LOGIN_FAILED: &str = "Incorrect username or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "Password", default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/**
 * POST /login - Authenticate and receive a JWT
 *
 * Input:  `{"Username": "alice1", "Password": "p@ssW0rd"}`
 * Output: `{"user": {..profile..}, "token": "eyJhbGciOiJIUzI1NiI...", "expires_in": 604800}`
 *
 * An unknown Username and a wrong Password produce the same 401.
 */
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = state.store.user_by_username(&payload.username).await? else {
        // Same bcrypt work as a wrong password, so timing does not reveal the miss
        hash_blocking(payload.password, state.config.security.bcrypt_cost).await?;
        tracing::warn!("Login failed: unknown user '{}'", payload.username);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    };

    if !verify_blocking(payload.password, user.password_hash.clone()).await? {
        tracing::warn!("Login failed: wrong password for '{}'", user.username);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    }

    let token = state.jwt.issue(&user.username)?;
    tracing::info!("User '{}' logged in", user.username);

    Ok(Json(LoginResponse {
        user: user.profile(),
        token,
        expires_in: state.jwt.lifetime_secs(),
    }))
}
