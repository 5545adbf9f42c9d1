//! Mask-to-detection post-processing
//!
//! Turns a segmentation probability map into numbered bounding boxes:
//! threshold search, contour extraction with area filtering, annotation and
//! packaging of the results.

mod assemble;
mod contours;
mod pipeline;
mod render;
mod threshold;

pub use assemble::{
    assemble, decode_data_uri, decode_png_mask, jpeg_data_uri, png_bytes, png_data_uri,
    AnalysisResult, EncodedImages, JPEG_QUALITY,
};
pub use contours::{bounding_rect, contour_area, count_regions_above, extract_detections, external_contours};
pub use pipeline::{DetectionConfig, DetectionPipeline};
pub use render::{gray_to_rgb, render, Annotator, BOX_COLOR, LABEL_SCALE};
pub use threshold::{candidate_thresholds, select_threshold, FALLBACK_THRESHOLD, REFERENCE_THRESHOLDS};
