use log::debug;
use ndarray::Array2;
use std::path::Path;

use crate::error::{MammoriskError, Result};
use crate::inference::{OrtModel, TensorOutput};

/// Anything that turns a feature row into a risk score
pub trait RiskModel: Send + Sync {
    /// Scores one encoded row, see [`super::RiskFactors::features`]
    fn score(&self, features: &[f32]) -> Result<f32>;
}

impl<F> RiskModel for F
where
    F: Fn(&[f32]) -> Result<f32> + Send + Sync,
{
    fn score(&self, features: &[f32]) -> Result<f32> {
        self(features)
    }
}

/// Tabular classifier exported to ONNX
pub struct OnnxRiskModel {
    model: OrtModel,
}

impl OnnxRiskModel {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            model: OrtModel::load(model_path)?,
        })
    }

    pub fn model_path(&self) -> &Path {
        self.model.model_path()
    }
}

/// Reads a score out of the model outputs
///
/// A two-class probability output gives the positive-class probability as a
/// percentage; a single-valued output is taken as the score itself.
pub(crate) fn score_from_outputs(outputs: &[TensorOutput]) -> Result<f32> {
    if let Some(probabilities) = outputs.iter().find(|o| o.data.len() == 2) {
        debug!("Using probability output '{}'", probabilities.name);
        return Ok(probabilities.data[1] * 100.0);
    }
    if let Some(single) = outputs.iter().find(|o| o.data.len() == 1) {
        debug!("Using scalar output '{}'", single.name);
        return Ok(single.data[0]);
    }
    let shapes: Vec<String> = outputs
        .iter()
        .map(|o| format!("{}{:?}", o.name, o.shape))
        .collect();
    Err(MammoriskError::InferenceError(format!(
        "no usable risk output among {}",
        shapes.join(", ")
    )))
}

impl RiskModel for OnnxRiskModel {
    fn score(&self, features: &[f32]) -> Result<f32> {
        let row = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| MammoriskError::ShapeMismatch(e.to_string()))?;
        let outputs = self.model.run(row.view())?;
        score_from_outputs(&outputs)
    }
}
