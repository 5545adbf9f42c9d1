use thiserror::Error;

/// Result type for mammorisk operations
pub type Result<T> = std::result::Result<T, MammoriskError>;

/// Error types for mammorisk operations
#[derive(Error, Debug)]
pub enum MammoriskError {
    /// DICOM reading or pixel decoding error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Raster image decode/encode error
    #[error("Image error: {0}")]
    ImageError(String),

    /// Upload with an extension outside the accepted set
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Model loading or forward pass failure
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Arrays that must share a shape do not
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Model requested but not configured
    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),

    /// Request payload failed field validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Missing, malformed or expired credentials
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<image::ImageError> for MammoriskError {
    fn from(e: image::ImageError) -> Self {
        MammoriskError::ImageError(format!("{}", e))
    }
}

impl From<ort::Error> for MammoriskError {
    fn from(e: ort::Error) -> Self {
        MammoriskError::InferenceError(format!("{}", e))
    }
}

impl From<sqlx::Error> for MammoriskError {
    fn from(e: sqlx::Error) -> Self {
        MammoriskError::DatabaseError(format!("{}", e))
    }
}

impl From<jsonwebtoken::errors::Error> for MammoriskError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        MammoriskError::AuthError(format!("{}", e))
    }
}

impl From<bcrypt::BcryptError> for MammoriskError {
    fn from(e: bcrypt::BcryptError) -> Self {
        MammoriskError::AuthError(format!("{}", e))
    }
}
