use bcrypt::{hash, verify, BcryptError};

/// bcrypt work factor used for stored passwords.
pub const PASSWORD_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_password_with_cost(password, PASSWORD_COST)
}

fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Compares a plain password against a stored bcrypt hash.
///
/// A malformed stored hash is an error rather than a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, BcryptError> {
    verify(password, hashed_password)
}
