use ab_glyph::FontVec;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use log::{debug, info};
use std::path::Path;

use crate::error::{MammoriskError, Result};
use crate::types::Detection;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Font scale of the `#<id>` labels, in pixels
pub const LABEL_SCALE: f32 = 16.0;

/// Box outline thickness, drawn inwards from the bounding box edge
pub const BOX_THICKNESS: u32 = 2;

/// Common install locations of a TrueType font usable for labels
const SYSTEM_FONTS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws detection boxes and labels onto mammograms
///
/// Labels need a TrueType font. Without one only the boxes are drawn.
#[derive(Default)]
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    /// Annotator drawing boxes only
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotator using the font stored at `path` for labels
    pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| {
            MammoriskError::ImageError(format!("invalid font '{}': {}", path.display(), e))
        })?;
        Ok(Self { font: Some(font) })
    }

    /// Annotator using the first system font found
    ///
    /// Falls back to boxes only when none of the usual locations holds a
    /// readable font.
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONTS {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                info!("Loaded label font: {}", path);
                return Self { font: Some(font) };
            }
        }

        debug!("No system font found, labels will be skipped");
        Self::new()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Produces `(original, annotated)` color copies of a gray image
    ///
    /// The gray channel is replicated without changing intensities. The input
    /// is left untouched.
    pub fn render(&self, gray: &GrayImage, detections: &[Detection]) -> (RgbImage, RgbImage) {
        let original = gray_to_rgb(gray);
        let mut annotated = original.clone();

        for det in detections {
            self.draw_detection(&mut annotated, det);
        }
        debug!("Annotated {} detections", detections.len());

        (original, annotated)
    }

    fn draw_detection(&self, canvas: &mut RgbImage, det: &Detection) {
        for inset in 0..BOX_THICKNESS {
            let (w, h) = (
                det.width.saturating_sub(2 * inset),
                det.height.saturating_sub(2 * inset),
            );
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((det.x + inset) as i32, (det.y + inset) as i32).of_size(w, h);
            draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
        }

        if let Some(font) = &self.font {
            let text_y = (det.y as i32 - LABEL_SCALE as i32 - 2).max(0);
            draw_text_mut(
                canvas,
                BOX_COLOR,
                det.x as i32,
                text_y,
                LABEL_SCALE,
                font,
                &det.label(),
            );
        }
    }
}

/// Replicates a gray image into three identical channels
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

/// Renders with boxes only; see [`Annotator::render`]
pub fn render(gray: &GrayImage, detections: &[Detection]) -> (RgbImage, RgbImage) {
    Annotator::new().render(gray, detections)
}
