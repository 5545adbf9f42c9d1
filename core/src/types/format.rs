use std::fmt;
use std::path::Path;

use crate::error::{MammoriskError, Result};

/// Extensions accepted at the upload boundary
pub const ACCEPTED_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".dcm"];

/// Image container of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadFormat {
    Jpeg,
    Png,
    Dicom,
}

impl UploadFormat {
    /// Parses the format from a file extension (with or without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(UploadFormat::Jpeg),
            "png" => Some(UploadFormat::Png),
            "dcm" => Some(UploadFormat::Dicom),
            _ => None,
        }
    }

    /// Determines the format from a client-supplied filename
    ///
    /// # Errors
    ///
    /// Returns [`MammoriskError::UnsupportedFormat`] when the extension is
    /// missing or not one of [`ACCEPTED_EXTENSIONS`].
    pub fn from_filename(filename: &str) -> Result<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                MammoriskError::UnsupportedFormat(format!(
                    "'{}'. Accepted formats: {}",
                    filename,
                    ACCEPTED_EXTENSIONS.join(", ")
                ))
            })
    }

    /// Canonical extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            UploadFormat::Jpeg => ".jpg",
            UploadFormat::Png => ".png",
            UploadFormat::Dicom => ".dcm",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            UploadFormat::Jpeg => "jpeg",
            UploadFormat::Png => "png",
            UploadFormat::Dicom => "dicom",
        }
    }
}

impl fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
