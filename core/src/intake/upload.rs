use image::GrayImage;
use log::debug;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::load_grayscale;
use crate::error::Result;
use crate::types::UploadFormat;

/// An uploaded image parked in a temporary file
///
/// The file is removed when the value is dropped, whichever way the request
/// ends.
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
    format: UploadFormat,
    filename: String,
}

impl TempUpload {
    /// Validates `filename` and writes `bytes` to a fresh temporary file
    ///
    /// The extension check happens first: a rejected upload never touches
    /// the disk. Files go to `dir` when given, else the system temp dir.
    pub fn create(filename: &str, bytes: &[u8], dir: Option<&Path>) -> Result<Self> {
        let format = UploadFormat::from_filename(filename)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-").suffix(format.extension());
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;

        debug!(
            "Stored upload '{}' ({} bytes) at {}",
            filename,
            bytes.len(),
            file.path().display()
        );

        Ok(Self {
            file,
            format,
            filename: filename.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn format(&self) -> UploadFormat {
        self.format
    }

    /// Client-supplied filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Decodes the stored file as an 8-bit gray image
    pub fn load_grayscale(&self) -> Result<GrayImage> {
        load_grayscale(self.path(), self.format)
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        debug!("Removing temporary upload {}", self.file.path().display());
    }
}
