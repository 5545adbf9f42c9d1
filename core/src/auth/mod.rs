//! Password hashing and bearer tokens

mod password;
mod token;

pub use password::{hash_password, verify_password, DEFAULT_COST};
pub use token::{Claims, TokenService};
