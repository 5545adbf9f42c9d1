use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Medecin,
    Admin,
    Patient,
}

impl Role {
    /// Returns simple name, as stored in the database
    pub fn simple_name(&self) -> &'static str {
        match self {
            Role::Medecin => "medecin",
            Role::Admin => "admin",
            Role::Patient => "patient",
        }
    }

    /// Parses a role, `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "medecin" => Some(Role::Medecin),
            "admin" => Some(Role::Admin),
            "patient" => Some(Role::Patient),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Self-reported lifestyle ("mode de vie")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifestyle {
    #[serde(rename = "sain")]
    Healthy,
    #[serde(rename = "modéré")]
    Moderate,
    #[serde(rename = "à risque")]
    AtRisk,
}

impl Lifestyle {
    /// Ordinal encoding used as a model feature
    pub fn ordinal(&self) -> f32 {
        match self {
            Lifestyle::Healthy => 0.0,
            Lifestyle::Moderate => 1.0,
            Lifestyle::AtRisk => 2.0,
        }
    }
}

/// Weekly physical activity level
///
/// Variant order matches the category order of the fitted one-hot encoder
/// (lexicographic on the French labels, accented label last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityLevel {
    #[serde(rename = "faible")]
    Low,
    #[serde(rename = "moyen")]
    Medium,
    #[serde(rename = "élevé")]
    High,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 3] = [
        ActivityLevel::Low,
        ActivityLevel::Medium,
        ActivityLevel::High,
    ];
}

/// Photometric interpretation of DICOM pixel data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhotometricInterpretation {
    Monochrome1,
    Monochrome2,
    /// Any other interpretation, upper-cased
    Other(String),
}

impl PhotometricInterpretation {
    /// Returns whether this is a monochrome interpretation
    pub fn is_monochrome(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::Monochrome1 | PhotometricInterpretation::Monochrome2
        )
    }

    /// Returns whether low values render white (MONOCHROME1)
    pub fn is_inverted(&self) -> bool {
        matches!(self, PhotometricInterpretation::Monochrome1)
    }

    /// Parses photometric interpretation from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            other => PhotometricInterpretation::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotometricInterpretation::Monochrome1 => write!(f, "MONOCHROME1"),
            PhotometricInterpretation::Monochrome2 => write!(f, "MONOCHROME2"),
            PhotometricInterpretation::Other(name) => write!(f, "{}", name),
        }
    }
}
