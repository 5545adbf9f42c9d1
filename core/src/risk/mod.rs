//! Tabular breast-cancer risk scoring

mod factors;
mod model;

pub use factors::{RiskFactors, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{OnnxRiskModel, RiskModel};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{MammoriskError, Result};

/// Diagnosis response body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score_risque: f64,
}

/// Validates `factors`, scores them and rounds to two decimals
pub fn diagnose(model: &dyn RiskModel, factors: &RiskFactors) -> Result<RiskScore> {
    factors.validate()?;
    let raw = model.score(&factors.features())?;
    if !raw.is_finite() {
        return Err(MammoriskError::InferenceError(format!(
            "risk model returned a non-finite score ({})",
            raw
        )));
    }
    let score_risque = (f64::from(raw) * 100.0).round() / 100.0;
    info!("Risk score {:.2} for age {}", score_risque, factors.age);
    Ok(RiskScore { score_risque })
}
