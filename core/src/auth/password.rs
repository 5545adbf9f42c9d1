use crate::error::Result;

/// Default bcrypt work factor
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashes a password with bcrypt at the given cost (4..=31)
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Checks a password against a stored bcrypt hash
///
/// Returns `Ok(false)` on mismatch; errors only when `hash` is not a bcrypt
/// hash at all.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}
