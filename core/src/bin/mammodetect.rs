use clap::Parser;
use image::ImageFormat;
use log::{error, info};
use mammorisk_core::cli::report::TextReport;
use mammorisk_core::cli::{DetectionArgs, OutputFormat};
use mammorisk_core::detection::{png_bytes, AnalysisResult};
use mammorisk_core::{load_grayscale, Detection, MammoriskError, UploadFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool running lesion detection on a single mammogram
#[derive(Parser, Debug)]
#[command(name = "mammodetect")]
#[command(about = "Detect suspicious regions in a mammogram (JPEG, PNG or DICOM)")]
#[command(version)]
struct Cli {
    /// Image to analyze
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    detection: DetectionArgs,

    /// Directory receiving original.jpg, annotated.jpg and mask.png
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Paths of the images written by [`write_outputs`]
#[derive(Debug, Serialize)]
struct WrittenImages {
    original: PathBuf,
    annotated: PathBuf,
    mask: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    threshold: Option<f32>,
    num_detections: usize,
    detections: &'a [Detection],
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<WrittenImages>,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> mammorisk_core::Result<()> {
    let filename = cli.file.display().to_string();
    let format = UploadFormat::from_filename(&filename)?;

    let pipeline = cli.detection.load_pipeline()?.ok_or_else(|| {
        MammoriskError::ModelUnavailable(
            "pass --model or set SEGMENTATION_MODEL".to_string(),
        )
    })?;

    info!("Processing file: {}", filename);
    let image = load_grayscale(&cli.file, format)?;
    let result = pipeline.analyze(&image)?;

    let images = match &cli.output_dir {
        Some(dir) => Some(write_outputs(&result, dir)?),
        None => None,
    };

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(&filename, &result));
            if let Some(images) = &images {
                println!("Original:       {}", images.original.display());
                println!("Annotated:      {}", images.annotated.display());
                println!("Mask:           {}", images.mask.display());
            }
        }
        OutputFormat::Json => {
            let report = JsonReport {
                file: filename.clone(),
                threshold: result.threshold,
                num_detections: result.num_detections(),
                detections: &result.detections,
                images,
            };
            let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

/// Writes the three result images into `dir`, creating it if needed
///
/// The mask keeps its raw {0,1} values, like the HTTP payload.
fn write_outputs(result: &AnalysisResult, dir: &Path) -> mammorisk_core::Result<WrittenImages> {
    std::fs::create_dir_all(dir)?;

    let written = WrittenImages {
        original: dir.join("original.jpg"),
        annotated: dir.join("annotated.jpg"),
        mask: dir.join("mask.png"),
    };
    result
        .original_image
        .save_with_format(&written.original, ImageFormat::Jpeg)?;
    result
        .annotated_image
        .save_with_format(&written.annotated, ImageFormat::Jpeg)?;
    std::fs::write(&written.mask, png_bytes(result.binary_mask.as_image())?)?;

    info!("Wrote result images to {}", dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use mammorisk_core::detection::{assemble, decode_png_mask};
    use mammorisk_core::BinaryMask;
    use tempfile::TempDir;

    fn sample_result() -> AnalysisResult {
        let mut mask = BinaryMask::empty(20, 10);
        for y in 2..6 {
            for x in 3..9 {
                mask.set(x, y);
            }
        }
        assemble(RgbImage::new(20, 10), RgbImage::new(20, 10), mask, Vec::new()).unwrap()
    }

    #[test]
    fn test_write_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");
        let result = sample_result();

        let written = write_outputs(&result, &out).unwrap();

        assert!(written.original.exists());
        assert!(written.annotated.exists());
        let mask = decode_png_mask(&std::fs::read(&written.mask).unwrap()).unwrap();
        assert_eq!(mask, result.binary_mask);
    }

    #[test]
    fn test_cli_requires_file() {
        assert!(Cli::try_parse_from(["mammodetect"]).is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "mammodetect",
            "scan.dcm",
            "--model",
            "unet.onnx",
            "--input-size",
            "512",
            "-f",
            "json",
            "-o",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("scan.dcm"));
        assert_eq!(cli.detection.config().input_size, Some(512));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
    }
}
