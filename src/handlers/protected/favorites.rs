// handlers/protected/favorites.rs - per-user favorite movie ids

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};

use super::users::{authorize_write, user_not_found};
use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /users/:username/movies/:movie_id
///
/// The movie id is stored as given; it is not checked against the catalog.
/// Duplicate handling follows the configured `FavoritesPolicy`.
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((username, movie_id)): Path<(String, String)>,
) -> Result<Json<UserProfile>, ApiError> {
    authorize_write(&state, &auth, &username, user_not_found).await?;

    let user = state
        .store
        .add_favorite(&username, &movie_id, state.config.favorites)
        .await?
        .ok_or_else(|| user_not_found(&username))?;

    tracing::debug!("'{}' favorited {}", username, movie_id);
    Ok(Json(user.profile()))
}

/// DELETE /users/:username/movies/:movie_id - removes every occurrence
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((username, movie_id)): Path<(String, String)>,
) -> Result<Json<UserProfile>, ApiError> {
    authorize_write(&state, &auth, &username, user_not_found).await?;

    let user = state
        .store
        .remove_favorite(&username, &movie_id)
        .await?
        .ok_or_else(|| user_not_found(&username))?;

    Ok(Json(user.profile()))
}
