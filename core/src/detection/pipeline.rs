use image::imageops::{self, FilterType};
use image::GrayImage;
use log::{debug, info};
use std::sync::Arc;

use super::assemble::{assemble, AnalysisResult};
use super::contours::extract_detections;
use super::render::Annotator;
use super::threshold::{candidate_thresholds, select_threshold};
use crate::error::{MammoriskError, Result};
use crate::inference::MaskProducer;

/// Tunables of the mask-to-detection pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Default binarization cutoff, first in the candidate list
    pub threshold: f32,

    /// Regions must be strictly larger than this many pixels
    pub min_area: f64,

    /// Square side the image is resized to before inference.
    /// `None` keeps the native resolution.
    pub input_size: Option<u32>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_area: 70.0,
            input_size: Some(256),
        }
    }
}

/// Runs segmentation and turns its output into detections
///
/// # Example
///
/// ```
/// use image::GrayImage;
/// use mammorisk_core::{DetectionConfig, DetectionPipeline, ProbabilityMask};
/// use std::sync::Arc;
///
/// // Stand-in model marking a 12x12 square as certain foreground
/// let producer = |image: &GrayImage| {
///     let (w, h) = image.dimensions();
///     let data = (0..w * h)
///         .map(|i| if (i % w) < 12 && (i / w) < 12 { 1.0 } else { 0.0 })
///         .collect();
///     ProbabilityMask::from_raw(w, h, data)
/// };
///
/// let config = DetectionConfig { input_size: None, ..DetectionConfig::default() };
/// let pipeline = DetectionPipeline::new(Arc::new(producer), config);
///
/// let result = pipeline.analyze(&GrayImage::new(64, 64)).unwrap();
/// assert_eq!(result.detections.len(), 1);
/// assert_eq!(result.detections[0].width, 12);
/// ```
pub struct DetectionPipeline {
    producer: Arc<dyn MaskProducer>,
    annotator: Annotator,
    config: DetectionConfig,
}

impl DetectionPipeline {
    pub fn new(producer: Arc<dyn MaskProducer>, config: DetectionConfig) -> Self {
        Self {
            producer,
            annotator: Annotator::with_system_font(),
            config,
        }
    }

    /// Replaces the annotator, e.g. with one using a configured label font
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Analyzes one grayscale mammogram
    ///
    /// All returned images share the (possibly resized) model resolution, and
    /// detection coordinates refer to it.
    ///
    /// # Errors
    ///
    /// Fails on an empty image, a failing model, or a probability map whose
    /// size differs from the model input.
    pub fn analyze(&self, image: &GrayImage) -> Result<AnalysisResult> {
        if image.width() == 0 || image.height() == 0 {
            return Err(MammoriskError::ImageError("image has no pixels".to_string()));
        }

        let prepared = self.prepare(image);
        let probabilities = self.producer.probability_map(&prepared)?;
        if (probabilities.width(), probabilities.height()) != prepared.dimensions() {
            return Err(MammoriskError::ShapeMismatch(format!(
                "model returned a {}x{} map for a {}x{} input",
                probabilities.width(),
                probabilities.height(),
                prepared.width(),
                prepared.height()
            )));
        }

        let candidates = candidate_thresholds(&probabilities, self.config.threshold);
        let threshold = select_threshold(&probabilities, &candidates, self.config.min_area);
        debug!("Candidates {:?}, selected {:.3}", candidates, threshold);

        let mask = probabilities.binarize(threshold);
        let detections = extract_detections(&mask, self.config.min_area);
        info!(
            "Found {} detections at threshold {:.3}",
            detections.len(),
            threshold
        );

        let (original, annotated) = self.annotator.render(&prepared, &detections);
        Ok(assemble(original, annotated, mask, detections)?.with_threshold(threshold))
    }

    fn prepare(&self, image: &GrayImage) -> GrayImage {
        match self.config.input_size {
            Some(size) if size > 0 && image.dimensions() != (size, size) => {
                imageops::resize(image, size, size, FilterType::Triangle)
            }
            _ => image.clone(),
        }
    }
}
