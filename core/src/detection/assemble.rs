use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};

use crate::error::{MammoriskError, Result};
use crate::types::{BinaryMask, Detection};

/// JPEG quality used for the photographic outputs
pub const JPEG_QUALITY: u8 = 90;

/// Everything produced by one analysis of a mammogram
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub original_image: RgbImage,
    pub annotated_image: RgbImage,
    pub binary_mask: BinaryMask,
    pub detections: Vec<Detection>,
    /// Binarization cutoff that produced `binary_mask`, when known
    pub threshold: Option<f32>,
}

/// Transport form of the three images of an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImages {
    /// `data:image/jpeg;base64,...`
    pub original: String,
    /// `data:image/jpeg;base64,...`
    pub annotated: String,
    /// `data:image/png;base64,...`, lossless {0,1} values
    pub mask: String,
}

/// Packages the pipeline outputs
///
/// # Errors
///
/// Returns [`MammoriskError::ShapeMismatch`] when the original image and the
/// mask differ in size.
pub fn assemble(
    original_image: RgbImage,
    annotated_image: RgbImage,
    binary_mask: BinaryMask,
    detections: Vec<Detection>,
) -> Result<AnalysisResult> {
    if original_image.dimensions() != (binary_mask.width(), binary_mask.height()) {
        return Err(MammoriskError::ShapeMismatch(format!(
            "image is {}x{} but mask is {}x{}",
            original_image.width(),
            original_image.height(),
            binary_mask.width(),
            binary_mask.height()
        )));
    }

    Ok(AnalysisResult {
        original_image,
        annotated_image,
        binary_mask,
        detections,
        threshold: None,
    })
}

impl AnalysisResult {
    /// Records the cutoff used to binarize the mask
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn num_detections(&self) -> usize {
        self.detections.len()
    }

    /// Encodes the images as data URIs (JPEG photos, PNG mask)
    pub fn encode(&self) -> Result<EncodedImages> {
        Ok(EncodedImages {
            original: jpeg_data_uri(&self.original_image)?,
            annotated: jpeg_data_uri(&self.annotated_image)?,
            mask: png_data_uri(self.binary_mask.as_image())?,
        })
    }
}

/// Encodes a color image as a base64 JPEG data URI
pub fn jpeg_data_uri(image: &RgbImage) -> Result<String> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&buf)))
}

/// Encodes a gray image as a base64 PNG data URI, losslessly
pub fn png_data_uri(image: &GrayImage) -> Result<String> {
    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png_bytes(image)?)
    ))
}

pub fn png_bytes(image: &GrayImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::L8,
    )?;
    Ok(buf)
}

/// Extracts the raw bytes of a base64 data URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| MammoriskError::ImageError("not a base64 data URI".to_string()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| MammoriskError::ImageError(format!("invalid base64 payload: {}", e)))
}

/// Decodes a PNG mask back into a [`BinaryMask`]
pub fn decode_png_mask(bytes: &[u8]) -> Result<BinaryMask> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
    Ok(BinaryMask::from_image(image.to_luma8()))
}
