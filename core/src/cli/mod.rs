pub mod report;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenService;
use crate::detection::{Annotator, DetectionConfig, DetectionPipeline};
use crate::error::Result;
use crate::inference::OnnxMaskProducer;
use crate::risk::{OnnxRiskModel, RiskModel};
use crate::server::DEFAULT_ORIGINS;

/// Command-line arguments for the mammorisk server
///
/// Every setting can also come from the environment variable named after it.
#[derive(Parser, Debug, Clone)]
#[command(name = "mammorisk")]
#[command(about = "Breast cancer risk scoring and mammogram analysis server")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://mammorisk.db?mode=rwc")]
    pub database_url: String,

    /// Secret used to sign access tokens
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// JWT signing algorithm
    #[arg(long, env = "ALGORITHM", default_value = "HS256")]
    pub algorithm: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = 15)]
    pub token_expire_minutes: u64,

    /// bcrypt work factor for new passwords
    #[arg(long, env = "BCRYPT_COST", default_value_t = 12, value_parser = clap::value_parser!(u32).range(4..=31))]
    pub bcrypt_cost: u32,

    #[command(flatten)]
    pub detection: DetectionArgs,

    /// Risk model (ONNX). Without it /diagnostic/ answers 503
    #[arg(long, env = "RISK_MODEL", value_name = "PATH")]
    pub risk_model: Option<PathBuf>,

    /// Directory for temporary uploads, defaults to the system temp dir
    #[arg(long, env = "UPLOAD_DIR", value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Allowed CORS origins, comma separated
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', default_values_t = DEFAULT_ORIGINS.map(String::from).to_vec())]
    pub allowed_origins: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings of the imaging pipeline, shared by the server and `mammodetect`
#[derive(clap::Args, Debug, Clone)]
pub struct DetectionArgs {
    /// Segmentation model (ONNX). Without it /analyse/ answers 503
    #[arg(long = "model", env = "SEGMENTATION_MODEL", value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Default probability threshold
    #[arg(long, env = "DETECTION_THRESHOLD", default_value_t = 0.5)]
    pub threshold: f32,

    /// Minimum region area in pixels
    #[arg(long, env = "DETECTION_MIN_AREA", default_value_t = 70.0)]
    pub min_area: f64,

    /// Side of the square model input, 0 keeps the native resolution
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = 256)]
    pub input_size: u32,

    /// TrueType font for detection labels, a system font when absent
    #[arg(long, env = "LABEL_FONT", value_name = "PATH")]
    pub font: Option<PathBuf>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

impl DetectionArgs {
    pub fn config(&self) -> DetectionConfig {
        DetectionConfig {
            threshold: self.threshold,
            min_area: self.min_area,
            input_size: (self.input_size > 0).then_some(self.input_size),
        }
    }

    /// Builds the label renderer, falling back to a system font
    pub fn annotator(&self) -> Annotator {
        match &self.font {
            Some(path) => Annotator::with_font_file(path).unwrap_or_else(|e| {
                warn!("Cannot load label font, trying system fonts: {}", e);
                Annotator::with_system_font()
            }),
            None => Annotator::with_system_font(),
        }
    }

    /// Loads the segmentation model if one is configured
    pub fn load_pipeline(&self) -> Result<Option<DetectionPipeline>> {
        let Some(path) = &self.model else {
            warn!("No segmentation model configured, image analysis disabled");
            return Ok(None);
        };
        let producer = OnnxMaskProducer::load(path)?;
        let pipeline = DetectionPipeline::new(Arc::new(producer), self.config())
            .with_annotator(self.annotator());
        info!("Detection pipeline ready: {:?}", pipeline.config());
        Ok(Some(pipeline))
    }
}

impl Cli {
    pub fn token_service(&self) -> Result<TokenService> {
        TokenService::new(
            &self.secret_key,
            &self.algorithm,
            Duration::from_secs(self.token_expire_minutes * 60),
        )
    }

    /// Loads the risk model if one is configured
    pub fn load_risk_model(&self) -> Result<Option<Arc<dyn RiskModel>>> {
        let Some(path) = &self.risk_model else {
            warn!("No risk model configured, diagnosis disabled");
            return Ok(None);
        };
        let model: Arc<dyn RiskModel> = Arc::new(OnnxRiskModel::load(path)?);
        Ok(Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["mammorisk", "--secret-key", "k"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.bind, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.algorithm, "HS256");
        assert_eq!(cli.token_expire_minutes, 15);
        assert_eq!(cli.detection.config(), DetectionConfig::default());
        assert_eq!(cli.allowed_origins.len(), DEFAULT_ORIGINS.len());
        assert!(cli.detection.model.is_none());
    }

    #[test]
    fn test_native_resolution() {
        let cli = parse(&["--input-size", "0", "--threshold", "0.8", "--min-area", "10"]);
        let config = cli.detection.config();
        assert_eq!(config.input_size, None);
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.min_area, 10.0);
    }

    #[test]
    fn test_origin_list() {
        let cli = parse(&["--allowed-origins", "http://a.test,http://b.test"]);
        assert_eq!(cli.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_bcrypt_cost_range() {
        let argv = ["mammorisk", "--secret-key", "k", "--bcrypt-cost", "2"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_token_service() {
        let cli = parse(&["--token-expire-minutes", "30"]);
        assert_eq!(cli.token_service().unwrap().ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn test_models_optional() {
        let cli = parse(&[]);
        assert!(cli.detection.load_pipeline().unwrap().is_none());
        assert!(cli.load_risk_model().unwrap().is_none());
    }

    #[test]
    fn test_missing_font_falls_back() {
        let system = Annotator::with_system_font().has_font();
        let cli = parse(&["--font", "/nonexistent/font.ttf"]);
        assert_eq!(cli.detection.annotator().has_font(), system);
        assert_eq!(parse(&[]).detection.annotator().has_font(), system);
    }
}
