// handlers/protected/users.rs - account reads and self-service writes

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};

use crate::database::models::{UserProfile, UserUpdate};
use crate::error::ApiError;
use crate::handlers::utils::hash_blocking;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{validate_user_input, UserInput};

pub(crate) fn user_not_found(username: &str) -> ApiError {
    ApiError::not_found(format!("{} was not found", username))
}

/// Gate for account writes. A missing target account is reported with
/// `missing` before ownership is checked; an existing account that is not
/// the caller's is a 403.
pub(crate) async fn authorize_write(
    state: &AppState,
    auth: &AuthUser,
    username: &str,
    missing: fn(&str) -> ApiError,
) -> Result<(), ApiError> {
    if auth.username != username && state.store.user_by_username(username).await?.is_none() {
        return Err(missing(username));
    }
    auth.ensure_self(username)
}

fn nothing_to_delete(username: &str) -> ApiError {
    ApiError::bad_request(format!("{} was not found", username))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// GET /users/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .store
        .user_by_username(&username)
        .await?
        .map(|user| Json(user.profile()))
        .ok_or_else(|| user_not_found(&username))
}

/// PUT /users/:username - replace Username, Password, Email and Birthday.
///
/// Same rules as registration. The new password is hashed before storage.
/// Renaming onto a taken Username is a 400.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
    Json(input): Json<UserInput>,
) -> Result<Json<UserProfile>, ApiError> {
    authorize_write(&state, &auth, &username, user_not_found).await?;
    let valid = validate_user_input(input).map_err(ApiError::Validation)?;

    let password_hash = hash_blocking(valid.password, state.config.security.bcrypt_cost).await?;
    let update = UserUpdate {
        username: valid.username,
        password_hash,
        email: valid.email,
        birthday: valid.birthday,
    };

    let user = state
        .store
        .update_user(&username, update)
        .await?
        .ok_or_else(|| user_not_found(&username))?;

    if user.username != username {
        tracing::info!("User '{}' renamed to '{}'", username, user.username);
    }
    Ok(Json(user.profile()))
}

/// DELETE /users/:username
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<String, ApiError> {
    authorize_write(&state, &auth, &username, nothing_to_delete).await?;

    if state.store.delete_user(&username).await? {
        tracing::info!("Deleted user '{}'", username);
        Ok(format!("{} was deleted.", username))
    } else {
        Err(nothing_to_delete(&username))
    }
}
