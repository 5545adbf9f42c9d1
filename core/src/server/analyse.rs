use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::task;

use super::error::ApiError;
use super::AppState;
use crate::detection::{AnalysisResult, EncodedImages};
use crate::error::MammoriskError;
use crate::intake::TempUpload;
use crate::types::{Detection, UploadFormat};

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Largest accepted request body for an analysis upload
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Analysis response body
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub message: String,
    pub num_detections: usize,
    pub image_original: String,
    pub image_with_boxes: String,
    pub mask: String,
    pub filename: String,
    pub threshold: Option<f32>,
    pub detections: Vec<Detection>,
}

impl AnalysisResponse {
    fn new(filename: String, result: AnalysisResult, images: EncodedImages) -> Self {
        Self {
            status: "success".to_string(),
            message: "image received and analyzed".to_string(),
            num_detections: result.num_detections(),
            image_original: images.original,
            image_with_boxes: images.annotated,
            mask: images.mask,
            filename,
            threshold: result.threshold,
            detections: result.detections,
        }
    }
}

pub async fn analyse(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let mut multipart = multipart?;
    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(IMAGE_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(MammoriskError::ValidationError(format!(
                    "missing multipart field '{}'",
                    IMAGE_FIELD
                ))
                .into())
            }
        }
    };

    let filename = field.file_name().unwrap_or_default().to_string();
    UploadFormat::from_filename(&filename)?;

    let pipeline = state.pipeline.clone().ok_or_else(|| {
        MammoriskError::ModelUnavailable("no segmentation model is configured".to_string())
    })?;

    let bytes = field.bytes().await?;
    info!("Received '{}' ({} bytes)", filename, bytes.len());

    let upload_dir = state.upload_dir.clone();
    let name = filename.clone();
    let (result, images) = task::spawn_blocking(move || {
        let upload = TempUpload::create(&name, &bytes, upload_dir.as_deref())?;
        let image = upload.load_grayscale()?;
        let result = pipeline.analyze(&image)?;
        let images = result.encode()?;
        Ok::<_, MammoriskError>((result, images))
    })
    .await??;

    Ok(Json(AnalysisResponse::new(filename, result, images)))
}
