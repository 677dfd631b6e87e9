use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
}

impl AuthUser {
    /// Account-level writes are only allowed on the caller's own account
    pub fn ensure_self(&self, username: &str) -> Result<(), ApiError> {
        if self.username == username {
            Ok(())
        } else {
            tracing::warn!(
                "User '{}' attempted to modify account '{}'",
                self.username,
                username
            );
            Err(ApiError::forbidden("You may only modify your own account"))
        }
    }
}

/// JWT authentication middleware: validates the bearer token, resolves its
/// subject to a stored user and injects [`AuthUser`] into the request.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(|msg| {
        tracing::debug!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    // The account may have been renamed or deleted since the token was issued
    let user = state
        .store
        .user_by_username(&claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token subject '{}' no longer exists", claims.sub);
            ApiError::unauthorized("Unauthorized")
        })?;

    request.extensions_mut().insert(AuthUser {
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
