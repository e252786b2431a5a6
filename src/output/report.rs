//! Report structures shared by all output formats

use crate::processing::comparison::StrategyComparison;
use crate::processing::matcher::MatchResult;
use crate::processing::ranking::RankingOutcome;
use crate::processing::weights::{WeightingScheme, Weights};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rendered command result plus the settings that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub content: ReportContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub strategy: String,
    pub scheme: WeightingScheme,
    pub weights: Weights,
    /// Composite scores exceed 100 when this is above 1.0.
    pub weight_sum: f64,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportContent {
    Match {
        result: MatchResult,
    },
    JobRanking {
        resume_id: String,
        outcome: RankingOutcome,
    },
    ResumeRanking {
        job_id: String,
        job_title: String,
        outcome: RankingOutcome,
    },
    Comparison {
        primary: String,
        secondary: String,
        rows: Vec<StrategyComparison>,
    },
}

impl ReportMetadata {
    pub fn new(strategy: impl Into<String>, scheme: WeightingScheme, weights: Weights, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            strategy: strategy.into(),
            scheme,
            weights,
            weight_sum: weights.sum(scheme),
            processing_time_ms,
        }
    }
}

impl Report {
    pub fn new(metadata: ReportMetadata, content: ReportContent) -> Self {
        Self { metadata, content }
    }

    pub fn title(&self) -> &'static str {
        match self.content {
            ReportContent::Match { .. } => "Resume Match",
            ReportContent::JobRanking { .. } => "Jobs Ranked for Resume",
            ReportContent::ResumeRanking { .. } => "Resumes Ranked for Job",
            ReportContent::Comparison { .. } => "Strategy Comparison",
        }
    }
}

/// Qualitative band for an overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 65.0 {
            ScoreBand::Good
        } else if score >= 50.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "EXCELLENT",
            ScoreBand::Good => "GOOD",
            ScoreBand::Fair => "FAIR",
            ScoreBand::Poor => "POOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(100.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(72.22), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(50.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(12.5).label(), "POOR");
    }

    #[test]
    fn test_report_json_shape() {
        let metadata = ReportMetadata::new("lexical", WeightingScheme::FourFactor, Weights::FOUR_FACTOR, 3);
        let report = Report::new(
            metadata,
            ReportContent::Comparison {
                primary: "semantic".to_string(),
                secondary: "lexical".to_string(),
                rows: Vec::new(),
            },
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "comparison");
        assert_eq!(value["metadata"]["scheme"], "four-factor");
        assert!((value["metadata"]["weight_sum"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(report.title(), "Strategy Comparison");
    }
}
