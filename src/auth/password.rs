// Salted password hashing (bcrypt)

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// Hash a plaintext password with a fresh salt. Two calls on the same input
/// produce different hashes that both verify.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plaintext, cost)?)
}

/// Check a plaintext password against a stored hash. A malformed hash never matches.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    match bcrypt::verify(plaintext, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}
