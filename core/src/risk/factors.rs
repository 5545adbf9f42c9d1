use serde::{Deserialize, Serialize};

use crate::error::{MammoriskError, Result};
use crate::types::{ActivityLevel, Lifestyle};

/// Column names of the model input, in order
///
/// Numeric columns first, then the one-hot blocks of the categorical
/// columns in the order the encoder was fitted.
pub const FEATURE_NAMES: [&str; 17] = [
    "age",
    "imc",
    "age_premieres_regles",
    "age_premier_enfant",
    "nb_enfants",
    "mode_vie",
    "ant_familiaux_0",
    "ant_familiaux_1",
    "ant_personnels_0",
    "ant_personnels_1",
    "tabac_0",
    "tabac_1",
    "alcool_0",
    "alcool_1",
    "activite_physique_faible",
    "activite_physique_moyen",
    "activite_physique_élevé",
];

/// Number of entries produced by [`RiskFactors::features`]
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Clinical and lifestyle risk factors of one patient
///
/// Field names on the wire follow the French clinical vocabulary used by
/// the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub age: i32,

    /// Body mass index
    pub imc: f32,

    /// Family history of breast cancer (0/1)
    pub ant_familiaux: i32,

    /// Personal history of breast pathology (0/1)
    pub ant_personnels: i32,

    /// Age at menarche
    pub age_premieres_regles: i32,

    /// Age at first childbirth, absent when nulliparous or unknown
    #[serde(default)]
    pub age_premier_enfant: Option<i32>,

    pub nb_enfants: i32,

    pub mode_vie: Lifestyle,

    /// Smoker (0/1)
    pub tabac: i32,

    /// Regular alcohol consumption (0/1)
    pub alcool: i32,

    pub activite_physique: ActivityLevel,
}

fn check_range(name: &str, value: i32, min: i32, max: Option<i32>) -> Result<()> {
    let too_high = max.is_some_and(|max| value > max);
    if value < min || too_high {
        let bounds = match max {
            Some(max) => format!("between {} and {}", min, max),
            None => format!("at least {}", min),
        };
        return Err(MammoriskError::ValidationError(format!(
            "{} must be {} (got {})",
            name, bounds, value
        )));
    }
    Ok(())
}

fn one_hot_binary(value: i32) -> [f32; 2] {
    if value == 1 {
        [0.0, 1.0]
    } else {
        [1.0, 0.0]
    }
}

impl RiskFactors {
    /// Checks every field against its accepted range
    pub fn validate(&self) -> Result<()> {
        check_range("age", self.age, 0, Some(120))?;
        if !self.imc.is_finite() || self.imc < 0.0 {
            return Err(MammoriskError::ValidationError(format!(
                "imc must be a non-negative number (got {})",
                self.imc
            )));
        }
        check_range("ant_familiaux", self.ant_familiaux, 0, Some(1))?;
        check_range("ant_personnels", self.ant_personnels, 0, Some(1))?;
        check_range("age_premieres_regles", self.age_premieres_regles, 0, Some(25))?;
        if let Some(age) = self.age_premier_enfant {
            check_range("age_premier_enfant", age, 0, Some(50))?;
        }
        check_range("nb_enfants", self.nb_enfants, 0, None)?;
        check_range("tabac", self.tabac, 0, Some(1))?;
        check_range("alcool", self.alcool, 0, Some(1))?;
        Ok(())
    }

    /// Encodes the factors as a model input row
    ///
    /// Layout follows [`FEATURE_NAMES`]. A missing first-child age is
    /// encoded as NaN.
    pub fn features(&self) -> Vec<f32> {
        let mut row = Vec::with_capacity(FEATURE_COUNT);
        row.push(self.age as f32);
        row.push(self.imc);
        row.push(self.age_premieres_regles as f32);
        row.push(self.age_premier_enfant.map_or(f32::NAN, |a| a as f32));
        row.push(self.nb_enfants as f32);
        row.push(self.mode_vie.ordinal());
        row.extend(one_hot_binary(self.ant_familiaux));
        row.extend(one_hot_binary(self.ant_personnels));
        row.extend(one_hot_binary(self.tabac));
        row.extend(one_hot_binary(self.alcool));
        row.extend(
            ActivityLevel::ALL
                .iter()
                .map(|level| f32::from(u8::from(*level == self.activite_physique))),
        );
        row
    }
}
