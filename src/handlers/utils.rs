// handlers/utils.rs - bcrypt work moved off the async runtime

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;

/// Hash on the blocking pool; bcrypt at production cost takes tens of milliseconds
pub(crate) async fn hash_blocking(plaintext: String, cost: u32) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&plaintext, cost)).await??;
    Ok(hash)
}

pub(crate) async fn verify_blocking(plaintext: String, hash: String) -> Result<bool, ApiError> {
    let valid = tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash)).await?;
    Ok(valid)
}
