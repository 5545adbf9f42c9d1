use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{MammoriskError, Result};
use crate::types::Role;

/// Maximum length of names and email, matching the column sizes
pub const MAX_FIELD_LEN: usize = 100;

/// A stored account, password hash included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Account creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nom: user.nom.clone(),
            prenom: user.prenom.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nom: user.nom,
            prenom: user.prenom,
            email: user.email,
            role: user.role,
        }
    }
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("Failed to compile regex")
    })
}

/// Returns whether `email` is a syntactically valid address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_FIELD_LEN && email_regex().is_match(email)
}

fn check_name(field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MammoriskError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(MammoriskError::ValidationError(format!(
            "{} is longer than {} characters",
            field, MAX_FIELD_LEN
        )));
    }
    Ok(())
}

impl NewUser {
    /// Checks names, email syntax and password presence
    pub fn validate(&self) -> Result<()> {
        check_name("nom", &self.nom)?;
        check_name("prenom", &self.prenom)?;
        if !is_valid_email(self.email.trim()) {
            return Err(MammoriskError::ValidationError(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        if self.password.is_empty() {
            return Err(MammoriskError::ValidationError(
                "password must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Requested role, medecin when unspecified
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }
}
