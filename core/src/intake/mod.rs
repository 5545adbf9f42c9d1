//! Image intake: upload validation, temporary storage and decoding
//!
//! JPEG and PNG go through the `image` crate, DICOM through `dicom-object`
//! and `dicom-pixeldata`. Everything ends up as an 8-bit gray image.

pub mod dicom;
pub mod tags;
mod upload;

pub use dicom::{dicom_to_grayscale, load_dicom_grayscale};
pub use upload::TempUpload;

use image::{GrayImage, ImageReader};
use std::path::Path;

use crate::error::{MammoriskError, Result};
use crate::types::UploadFormat;

/// Decodes an image file of the given format into 8-bit gray
///
/// Raster files are sniffed from their content, so a PNG saved with a
/// `.jpg` extension still decodes.
pub fn load_grayscale(path: impl AsRef<Path>, format: UploadFormat) -> Result<GrayImage> {
    let path = path.as_ref();
    match format {
        UploadFormat::Dicom => load_dicom_grayscale(path),
        UploadFormat::Jpeg | UploadFormat::Png => {
            let image = ImageReader::open(path)?
                .with_guessed_format()?
                .decode()
                .map_err(|e| {
                    MammoriskError::ImageError(format!(
                        "cannot decode '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
            Ok(image.to_luma8())
        }
    }
}
