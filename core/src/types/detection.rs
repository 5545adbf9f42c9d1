use std::fmt;

/// A suspicious region found in a segmentation mask
///
/// `id` starts at 1 and follows contour discovery order. The bounding box is
/// axis-aligned and expressed in pixels of the analyzed image.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Region area in pixels, measured on the contour polygon
    pub area: f64,
}

impl Detection {
    /// Label drawn next to the bounding box, e.g. `#3`
    pub fn label(&self) -> String {
        format!("#{}", self.id)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ({}, {}) size {}x{} area {:.1}",
            self.label(),
            self.x,
            self.y,
            self.width,
            self.height,
            self.area
        )
    }
}
