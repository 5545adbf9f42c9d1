use log::info;
use ndarray::{ArrayView, Dimension};
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{MammoriskError, Result};

/// Opens an ONNX model file
pub fn load_session(model_path: impl AsRef<Path>) -> Result<Session> {
    let path = model_path.as_ref();
    let session = Session::builder()
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| {
            MammoriskError::InferenceError(format!(
                "failed to load model '{}': {}",
                path.display(),
                e
            ))
        })?;
    Ok(session)
}

/// A loaded single-input ONNX model
///
/// A forward pass needs exclusive access to the session, so concurrent
/// callers are serialized on an internal lock.
pub struct OrtModel {
    session: Mutex<Session>,
    input_name: String,
    model_path: PathBuf,
}

/// One float output of a forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct TensorOutput {
    pub name: String,
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

impl OrtModel {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self> {
        let model_path = model_path.as_ref().to_path_buf();
        let session = load_session(&model_path)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                MammoriskError::InferenceError(format!(
                    "model '{}' declares no inputs",
                    model_path.display()
                ))
            })?;
        info!(
            "Loaded model {} (input '{}')",
            model_path.display(),
            input_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            model_path,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Runs a forward pass and returns every output readable as `f32`
    pub fn run<D: Dimension + 'static>(&self, input: ArrayView<'_, f32, D>) -> Result<Vec<TensorOutput>> {
        let tensor = TensorRef::from_array_view(input)?;

        let mut session = self.session.lock().map_err(|_| {
            MammoriskError::InferenceError("model session lock poisoned".to_string())
        })?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;

        let mut results = Vec::new();
        for (name, value) in outputs.iter() {
            if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                results.push(TensorOutput {
                    name: name.to_string(),
                    shape: shape.iter().copied().collect(),
                    data: data.to_vec(),
                });
            }
        }

        if results.is_empty() {
            return Err(MammoriskError::InferenceError(format!(
                "model '{}' produced no float outputs",
                self.model_path.display()
            )));
        }
        Ok(results)
    }
}
