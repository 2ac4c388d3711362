use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Minimum accepted password length, applied uniformly to signup and reset.
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(plain: &str) -> Result<String, BcryptError> {
    hash(plain, DEFAULT_COST)
}

/// Compares a candidate password against a stored bcrypt hash. Any
/// malformed hash counts as a mismatch rather than an error, so callers
/// can return the same generic failure on every path.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}
