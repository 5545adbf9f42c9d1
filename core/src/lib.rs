pub mod auth;
pub mod cli;
pub mod detection;
pub mod error;
pub mod inference;
pub mod intake;
pub mod risk;
pub mod server;
pub mod types;
pub mod users;

pub use cli::report::TextReport;
pub use detection::{AnalysisResult, DetectionConfig, DetectionPipeline};
pub use error::{MammoriskError, Result};
pub use inference::{MaskProducer, OnnxMaskProducer};
pub use intake::{load_grayscale, TempUpload};
pub use risk::{diagnose, RiskFactors, RiskModel, RiskScore};
pub use types::*;
