use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Path, State};
use axum::{Form, Json};
use log::info;
use serde::{Deserialize, Serialize};

use super::auth::CurrentUser;
use super::error::ApiError;
use super::AppState;
use crate::error::MammoriskError;
use crate::users::{NewUser, UserResponse};

/// OAuth2 password-grant form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(new_user) = payload?;
    let user = state.users.create(new_user).await?;
    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;
    let user = state
        .users
        .authenticate(form.username.trim(), &form.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("incorrect username or password"))?;

    let access_token = state.tokens.issue(&user.email)?;
    info!("Issued token for {}", user.email);
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| MammoriskError::NotFound(format!("no user with email '{}'", email)))?;
    info!("{} looked up {}", current.email, user.email);
    Ok(Json(user.into()))
}
