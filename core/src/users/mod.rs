//! Practitioner accounts

mod model;
mod store;

pub use model::{is_valid_email, NewUser, User, UserResponse, MAX_FIELD_LEN};
pub use store::UserStore;

#[cfg(test)]
pub(crate) use store::tests::memory_store;
