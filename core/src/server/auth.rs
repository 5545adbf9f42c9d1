use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::AppState;
use crate::users::User;

const INVALID_CREDENTIALS: &str = "could not validate credentials";

/// The account behind the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extracts the token from an `Authorization: Bearer <token>` header
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized("not authenticated"))?;
        let email = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized(INVALID_CREDENTIALS))?;
        let user = state
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
        Ok(CurrentUser(user))
    }
}
