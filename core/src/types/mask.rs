use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};

use crate::error::{MammoriskError, Result};

/// Per-pixel foreground probabilities produced by a segmentation model
///
/// Indexed as `[row, col]`, i.e. `[y, x]`. Values are kept in [0, 1]:
/// raw model outputs falling outside that range are treated as logits and
/// passed through a sigmoid on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMask {
    values: Array2<f32>,
}

impl ProbabilityMask {
    /// Creates a mask from an `(height, width)` array, normalizing logits
    pub fn new(mut values: Array2<f32>) -> Self {
        let needs_sigmoid = values.iter().any(|&v| !(0.0..=1.0).contains(&v));
        if needs_sigmoid {
            values.mapv_inplace(sigmoid);
        }
        Self { values }
    }

    /// Creates a mask from row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if `data.len() != width * height`
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let shape = (height as usize, width as usize);
        let values = Array2::from_shape_vec(shape, data).map_err(|e| {
            MammoriskError::ShapeMismatch(format!(
                "cannot build {}x{} probability mask: {}",
                width, height, e
            ))
        })?;
        Ok(Self::new(values))
    }

    pub fn width(&self) -> u32 {
        self.values.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.values.nrows() as u32
    }

    /// Probability at pixel `(x, y)`
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[[y as usize, x as usize]]
    }

    pub fn values(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// Mean probability over the whole map, 0.0 for an empty map
    pub fn mean(&self) -> f32 {
        self.values.mean().unwrap_or(0.0)
    }

    /// Binarizes the map: pixels strictly above `threshold` become foreground
    pub fn binarize(&self, threshold: f32) -> BinaryMask {
        let image = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([u8::from(self.get(x, y) > threshold)])
        });
        BinaryMask { image }
    }
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Thresholded segmentation mask holding exactly 0 (background) or 1 (foreground)
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// Builds a mask from a gray image; any non-zero pixel becomes 1
    pub fn from_image(mut image: GrayImage) -> Self {
        for pixel in image.pixels_mut() {
            pixel.0[0] = u8::from(pixel.0[0] != 0);
        }
        Self { image }
    }

    /// Creates an all-background mask
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Value at pixel `(x, y)`, either 0 or 1
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Marks pixel `(x, y)` as foreground
    pub fn set(&mut self, x: u32, y: u32) {
        self.image.put_pixel(x, y, Luma([1]));
    }

    /// Number of foreground pixels
    pub fn foreground_count(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v == 1).count()
    }

    /// True when the mask has no pixels or no foreground
    pub fn is_blank(&self) -> bool {
        self.width() == 0 || self.height() == 0 || self.foreground_count() == 0
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_are_kept_as_is() {
        let mask = ProbabilityMask::from_raw(2, 1, vec![0.2, 0.9]).unwrap();
        assert_eq!(mask.get(0, 0), 0.2);
        assert_eq!(mask.get(1, 0), 0.9);
    }

    #[test]
    fn test_logits_are_squashed() {
        let mask = ProbabilityMask::from_raw(3, 1, vec![-4.0, 0.0, 4.0]).unwrap();
        assert!(mask.get(0, 0) < 0.05);
        assert!((mask.get(1, 0) - 0.5).abs() < 1e-6);
        assert!(mask.get(2, 0) > 0.95);
    }

    #[test]
    fn test_from_raw_shape_mismatch() {
        assert!(ProbabilityMask::from_raw(3, 3, vec![0.0; 4]).is_err());
    }

    #[test]
    fn test_mean() {
        let mask = ProbabilityMask::from_raw(2, 2, vec![0.0, 0.5, 0.5, 1.0]).unwrap();
        assert!((mask.mean() - 0.5).abs() < 1e-6);

        let empty = ProbabilityMask::from_raw(0, 0, Vec::new()).unwrap();
        assert_eq!(empty.mean(), 0.0);
    }

    #[test]
    fn test_binarize_is_strict() {
        let mask = ProbabilityMask::from_raw(3, 1, vec![0.4, 0.5, 0.6]).unwrap();
        let bin = mask.binarize(0.5);
        assert_eq!(bin.get(0, 0), 0);
        assert_eq!(bin.get(1, 0), 0);
        assert_eq!(bin.get(2, 0), 1);
        assert_eq!(bin.foreground_count(), 1);
    }

    #[test]
    fn test_binary_mask_normalizes_values() {
        let image = GrayImage::from_raw(3, 1, vec![0, 7, 255]).unwrap();
        let mask = BinaryMask::from_image(image);
        assert_eq!(mask.as_image().as_raw(), &vec![0, 1, 1]);
    }

    #[test]
    fn test_blank_masks() {
        assert!(BinaryMask::empty(4, 4).is_blank());
        assert!(BinaryMask::empty(0, 0).is_blank());

        let mut mask = BinaryMask::empty(4, 4);
        mask.set(1, 2);
        assert!(!mask.is_blank());
    }
}
