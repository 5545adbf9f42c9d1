use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tokio::task;

use super::error::ApiError;
use super::AppState;
use crate::error::MammoriskError;
use crate::risk::{diagnose, RiskFactors, RiskScore};

pub async fn diagnostic(
    State(state): State<AppState>,
    payload: Result<Json<RiskFactors>, JsonRejection>,
) -> Result<Json<RiskScore>, ApiError> {
    let Json(factors) = payload?;
    let model = state.risk_model.clone().ok_or_else(|| {
        MammoriskError::ModelUnavailable("no risk model is configured".to_string())
    })?;

    let score = task::spawn_blocking(move || diagnose(model.as_ref(), &factors)).await??;
    Ok(Json(score))
}
