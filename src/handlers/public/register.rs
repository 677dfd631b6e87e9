// handlers/public/register.rs - POST /users handler

use axum::{extract::State, http::StatusCode, response::Json};

use crate::database::models::{NewUser, UserProfile};
use crate::error::ApiError;
use crate::handlers::utils::hash_blocking;
use crate::state::AppState;
use crate::validation::{validate_user_input, UserInput};

/// POST /users - register a new account
///
/// Validation runs before anything touches the store. The insert itself is
/// insert-if-absent, so a taken Username comes back as a 400 even when two
/// registrations race.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let valid = validate_user_input(input).map_err(ApiError::Validation)?;

    let password_hash = hash_blocking(valid.password, state.config.security.bcrypt_cost).await?;

    let user = state
        .store
        .insert_user(NewUser {
            username: valid.username,
            password_hash,
            email: valid.email,
            birthday: valid.birthday,
        })
        .await?;

    tracing::info!("Registered user '{}'", user.username);
    Ok((StatusCode::CREATED, Json(user.profile())))
}
