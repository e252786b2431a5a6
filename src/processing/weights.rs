//! Weighting schemes and per-field weight overrides

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which sub-scores make up the composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingScheme {
    /// Experience, skills, profession, summary. Qualification text is folded
    /// into the summary comparison.
    #[default]
    FourFactor,
    /// Experience, skills, profession, summary, qualifications, each scored
    /// separately.
    FiveFactor,
}

impl fmt::Display for WeightingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightingScheme::FourFactor => write!(f, "four-factor"),
            WeightingScheme::FiveFactor => write!(f, "five-factor"),
        }
    }
}

/// Resolved weights. Not normalized: the composite is the plain weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub experience: f64,
    pub skills: f64,
    pub profession: f64,
    pub summary: f64,
    /// Only read by the five-factor scheme.
    pub qualifications: f64,
}

impl Weights {
    pub const FOUR_FACTOR: Weights = Weights {
        experience: 0.25,
        skills: 0.25,
        profession: 0.15,
        summary: 0.35,
        qualifications: 0.0,
    };

    pub const FIVE_FACTOR: Weights = Weights {
        experience: 0.25,
        skills: 0.25,
        profession: 0.15,
        summary: 0.20,
        qualifications: 0.15,
    };

    pub fn defaults_for(scheme: WeightingScheme) -> Self {
        match scheme {
            WeightingScheme::FourFactor => Self::FOUR_FACTOR,
            WeightingScheme::FiveFactor => Self::FIVE_FACTOR,
        }
    }

    /// Sum of the weights the scheme actually uses.
    pub fn sum(&self, scheme: WeightingScheme) -> f64 {
        let base = self.experience + self.skills + self.profession + self.summary;
        match scheme {
            WeightingScheme::FourFactor => base,
            WeightingScheme::FiveFactor => base + self.qualifications,
        }
    }

    pub fn is_normalized(&self, scheme: WeightingScheme) -> bool {
        (self.sum(scheme) - 1.0).abs() < 1e-9
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::FOUR_FACTOR
    }
}

/// Partial weight overrides. Absent fields fall back to the scheme default.
/// Wire keys match the sub-score names of the match result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightOverrides {
    #[serde(rename = "experience_score", default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<f64>,
    #[serde(rename = "skills_score", default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<f64>,
    #[serde(rename = "profession_score", default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<f64>,
    #[serde(rename = "summary_score", default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<f64>,
    #[serde(rename = "qualifications_score", default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<f64>,
}

impl WeightOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resolve against the scheme defaults, field by field.
    pub fn resolve(&self, scheme: WeightingScheme) -> Weights {
        let base = Weights::defaults_for(scheme);
        Weights {
            experience: self.experience.unwrap_or(base.experience),
            skills: self.skills.unwrap_or(base.skills),
            profession: self.profession.unwrap_or(base.profession),
            summary: self.summary.unwrap_or(base.summary),
            qualifications: self.qualifications.unwrap_or(base.qualifications),
        }
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(&self, other: &WeightOverrides) -> WeightOverrides {
        WeightOverrides {
            experience: other.experience.or(self.experience),
            skills: other.skills.or(self.skills),
            profession: other.profession.or(self.profession),
            summary: other.summary.or(self.summary),
            qualifications: other.qualifications.or(self.qualifications),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(Weights::FOUR_FACTOR.is_normalized(WeightingScheme::FourFactor));
        assert!(Weights::FIVE_FACTOR.is_normalized(WeightingScheme::FiveFactor));
    }

    #[test]
    fn test_partial_override_falls_back_per_field() {
        let overrides: WeightOverrides =
            serde_json::from_str(r#"{"skills_score": 0.5, "summary_score": 0.2}"#).unwrap();
        let weights = overrides.resolve(WeightingScheme::FourFactor);

        assert_eq!(weights.experience, 0.25);
        assert_eq!(weights.skills, 0.5);
        assert_eq!(weights.profession, 0.15);
        assert_eq!(weights.summary, 0.2);
        // 0.25 + 0.5 + 0.15 + 0.2
        assert!(!weights.is_normalized(WeightingScheme::FourFactor));
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let from_config = WeightOverrides {
            skills: Some(0.4),
            summary: Some(0.2),
            ..Default::default()
        };
        let from_cli = WeightOverrides {
            skills: Some(0.3),
            ..Default::default()
        };
        let merged = from_config.merged_with(&from_cli);

        assert_eq!(merged.skills, Some(0.3));
        assert_eq!(merged.summary, Some(0.2));
        assert!(merged.experience.is_none());
        assert!(WeightOverrides::default().is_empty());
    }

    #[test]
    fn test_scheme_serde_names() {
        let scheme: WeightingScheme = serde_json::from_str("\"five-factor\"").unwrap();
        assert_eq!(scheme, WeightingScheme::FiveFactor);
        assert_eq!(WeightingScheme::FourFactor.to_string(), "four-factor");
    }
}
