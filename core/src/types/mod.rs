//! Core type definitions
//!
//! - [`ProbabilityMask`] / [`BinaryMask`]: segmentation outputs before and after thresholding
//! - [`Detection`]: one suspicious region with its bounding box and area
//! - [`UploadFormat`]: accepted upload containers (JPEG, PNG, DICOM)
//! - [`Role`], [`Lifestyle`], [`ActivityLevel`]: wire enums for users and risk factors
//! - [`PhotometricInterpretation`]: DICOM pixel interpretation

mod detection;
mod enums;
mod format;
mod mask;

pub use detection::Detection;
pub use enums::{ActivityLevel, Lifestyle, PhotometricInterpretation, Role};
pub use format::{UploadFormat, ACCEPTED_EXTENSIONS};
pub use mask::{BinaryMask, ProbabilityMask};
