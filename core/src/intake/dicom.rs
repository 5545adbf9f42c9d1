use dicom_object::{open_file, FileDicomObject, InMemDicomObject};
use dicom_pixeldata::PixelDecoder;
use image::{imageops, GrayImage};
use log::{debug, warn};
use std::path::Path;

use super::tags::{
    get_int_value, get_string_value, get_u16_value, BITS_STORED, COLUMNS, MODALITY,
    NUMBER_OF_FRAMES, PHOTOMETRIC_INTERPRETATION, ROWS,
};
use crate::error::{MammoriskError, Result};
use crate::types::PhotometricInterpretation;

/// Reads a DICOM file and returns its first frame as 8-bit gray
pub fn load_dicom_grayscale(path: impl AsRef<Path>) -> Result<GrayImage> {
    let path = path.as_ref();
    let dcm = open_file(path).map_err(|e| {
        MammoriskError::DicomError(format!("cannot read '{}': {}", path.display(), e))
    })?;
    dicom_to_grayscale(&dcm)
}

/// Decodes the first frame of an opened DICOM object
///
/// Windowing is applied by the pixel decoder. MONOCHROME1 images are
/// inverted so that dense tissue is always bright.
pub fn dicom_to_grayscale(dcm: &FileDicomObject<InMemDicomObject>) -> Result<GrayImage> {
    if let Some(modality) = get_string_value(dcm, MODALITY) {
        if modality != "MG" {
            warn!("Expected modality=MG, found {}", modality);
        }
    }

    let frames = get_int_value(dcm, NUMBER_OF_FRAMES).unwrap_or(1);
    if frames > 1 {
        warn!("Multi-frame object ({} frames), using the first frame", frames);
    }

    let photometric = get_string_value(dcm, PHOTOMETRIC_INTERPRETATION)
        .map(|s| PhotometricInterpretation::from_str(&s))
        .unwrap_or_else(|| PhotometricInterpretation::Other("UNKNOWN".to_string()));
    if !photometric.is_monochrome() {
        warn!("Expected a monochrome image, found {}", photometric);
    }
    debug!(
        "DICOM {}x{}, {} bits stored, {}",
        get_u16_value(dcm, COLUMNS).unwrap_or(0),
        get_u16_value(dcm, ROWS).unwrap_or(0),
        get_u16_value(dcm, BITS_STORED).unwrap_or(0),
        photometric
    );

    let pixels = dcm
        .decode_pixel_data()
        .map_err(|e| MammoriskError::DicomError(format!("cannot decode pixel data: {}", e)))?;
    let image = pixels
        .to_dynamic_image(0)
        .map_err(|e| MammoriskError::DicomError(format!("cannot convert pixel data: {}", e)))?;

    let mut gray = image.to_luma8();
    if photometric.is_inverted() {
        imageops::invert(&mut gray);
    }
    Ok(gray)
}
