//! Model runtimes behind narrow capability traits
//!
//! The pipeline only ever sees [`MaskProducer`]; the ONNX Runtime backed
//! implementation lives in [`segmentation`].

pub mod segmentation;
mod session;

pub use segmentation::{image_to_tensor, OnnxMaskProducer};
pub use session::{load_session, OrtModel, TensorOutput};

use image::GrayImage;

use crate::error::Result;
use crate::types::ProbabilityMask;

/// Anything able to produce a per-pixel probability map for an image
///
/// Implementations must be usable from several request handlers at once.
pub trait MaskProducer: Send + Sync {
    /// Returns a map with the same width and height as `image`
    fn probability_map(&self, image: &GrayImage) -> Result<ProbabilityMask>;
}

impl<F> MaskProducer for F
where
    F: Fn(&GrayImage) -> Result<ProbabilityMask> + Send + Sync,
{
    fn probability_map(&self, image: &GrayImage) -> Result<ProbabilityMask> {
        self(image)
    }
}
