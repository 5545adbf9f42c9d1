use crate::detection::AnalysisResult;
use std::fmt;

/// Text report formatter for an analysis result
pub struct TextReport<'a> {
    source: &'a str,
    result: &'a AnalysisResult,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report for the image read from `source`
    pub fn new(source: &'a str, result: &'a AnalysisResult) -> Self {
        Self { source, result }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mammogram Analysis")?;
        writeln!(f, "==================")?;
        writeln!(f)?;
        writeln!(f, "Source:         {}", self.source)?;
        writeln!(
            f,
            "Resolution:     {}x{}",
            self.result.original_image.width(),
            self.result.original_image.height()
        )?;
        match self.result.threshold {
            Some(t) => writeln!(f, "Threshold:      {:.3}", t)?,
            None => writeln!(f, "Threshold:      unknown")?,
        }
        writeln!(
            f,
            "Mask Pixels:    {}",
            self.result.binary_mask.foreground_count()
        )?;
        writeln!(f, "Detections:     {}", self.result.num_detections())?;

        if !self.result.detections.is_empty() {
            writeln!(f)?;
            writeln!(f, "Regions")?;
            writeln!(f, "-------")?;
            for detection in &self.result.detections {
                writeln!(f, "{}", detection)?;
            }
        }

        Ok(())
    }
}
