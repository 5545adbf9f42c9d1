use image::GrayImage;
use ndarray::Array4;
use std::path::Path;

use super::session::OrtModel;
use super::MaskProducer;
use crate::error::{MammoriskError, Result};
use crate::types::ProbabilityMask;

/// Converts a gray image into a `(1, 1, H, W)` tensor scaled to [0, 1]
pub fn image_to_tensor(image: &GrayImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    Array4::from_shape_fn((1, 1, height as usize, width as usize), |(_, _, y, x)| {
        image.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0
    })
}

/// U-Net style segmentation network exported to ONNX
///
/// The model takes one `(1, 1, H, W)` float input and returns a map with
/// `H * W` values, either probabilities or logits.
pub struct OnnxMaskProducer {
    model: OrtModel,
}

impl OnnxMaskProducer {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            model: OrtModel::load(model_path)?,
        })
    }

    pub fn model_path(&self) -> &Path {
        self.model.model_path()
    }
}

impl MaskProducer for OnnxMaskProducer {
    fn probability_map(&self, image: &GrayImage) -> Result<ProbabilityMask> {
        let (width, height) = image.dimensions();
        let input = image_to_tensor(image);

        let output = self
            .model
            .run(input.view())?
            .into_iter()
            .next()
            .ok_or_else(|| MammoriskError::InferenceError("empty model output".to_string()))?;

        if output.data.len() != (width * height) as usize {
            return Err(MammoriskError::ShapeMismatch(format!(
                "segmentation output {:?} does not match a {}x{} input",
                output.shape, width, height
            )));
        }

        ProbabilityMask::from_raw(width, height, output.data)
    }
}
