//! CLI interface for the resume matcher

use crate::config::{Config, OutputFormat};
use crate::error::{MatcherError, Result};
use crate::processing::ranking::{FailurePolicy, RankingOptions};
use crate::processing::similarity::StrategyKind;
use crate::processing::weights::{WeightOverrides, WeightingScheme};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Score resumes against job postings")]
#[command(long_about = "Match candidate resumes to job postings on experience, skills, profession and summary, using semantic embeddings or lexical similarity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against one job
    Match {
        /// Resume record file (JSON)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job record file (JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Similarity strategy for text fields
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyKind>,

        #[command(flatten)]
        scoring: ScoringArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rank a collection of jobs for one resume
    RankJobs {
        /// Resume record file (JSON)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job records (JSON array or JSON Lines)
        #[arg(short, long)]
        jobs: PathBuf,

        /// Similarity strategy for text fields
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyKind>,

        #[command(flatten)]
        scoring: ScoringArgs,

        #[command(flatten)]
        ranking: RankingArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rank a collection of resumes for one job
    RankResumes {
        /// Job record file (JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Resume records (JSON array or JSON Lines)
        #[arg(short, long)]
        resumes: PathBuf,

        /// Similarity strategy for text fields
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyKind>,

        #[command(flatten)]
        scoring: ScoringArgs,

        #[command(flatten)]
        ranking: RankingArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compare overall scores from two strategies side by side
    Compare {
        /// Resume record file (JSON)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job records (JSON array or JSON Lines)
        #[arg(short, long)]
        jobs: PathBuf,

        #[arg(long, value_enum, default_value = "semantic")]
        primary: StrategyKind,

        #[arg(long, value_enum, default_value = "lexical")]
        secondary: StrategyKind,

        #[command(flatten)]
        scoring: ScoringArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Weighting flags shared by the scoring commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ScoringArgs {
    /// Weighting scheme
    #[arg(long, value_enum)]
    pub scheme: Option<WeightingScheme>,

    /// JSON file with weight overrides, e.g. {"skills_score": 0.4}
    #[arg(long)]
    pub weights: Option<PathBuf>,

    #[arg(long)]
    pub experience_weight: Option<f64>,

    #[arg(long)]
    pub skills_weight: Option<f64>,

    #[arg(long)]
    pub profession_weight: Option<f64>,

    #[arg(long)]
    pub summary_weight: Option<f64>,

    /// Only used by the five-factor scheme
    #[arg(long)]
    pub qualifications_weight: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RankingArgs {
    /// Keep only the best N results
    #[arg(long)]
    pub top: Option<usize>,

    /// Drop pairs that fail to score instead of aborting
    #[arg(long)]
    pub skip_failed: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Show every sub-score
    #[arg(short, long)]
    pub detailed: bool,

    /// Save output to file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available models
    List,

    /// Download a model
    Download {
        /// Model id, display name or Hugging Face repo id
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        model: String,
    },

    /// Show model information
    Info {
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

impl ScoringArgs {
    pub fn scheme(&self, config: &Config) -> WeightingScheme {
        self.scheme.unwrap_or(config.scoring.scheme)
    }

    /// Config overrides, then the `--weights` file, then individual flags.
    pub fn weight_overrides(&self, config: &Config) -> Result<WeightOverrides> {
        let mut overrides = config.scoring.weights;

        if let Some(path) = &self.weights {
            overrides = overrides.merged_with(&read_weights_file(path)?);
        }

        let flags = WeightOverrides {
            experience: self.experience_weight,
            skills: self.skills_weight,
            profession: self.profession_weight,
            summary: self.summary_weight,
            qualifications: self.qualifications_weight,
        };
        Ok(overrides.merged_with(&flags))
    }
}

impl RankingArgs {
    pub fn options(&self, config: &Config) -> RankingOptions {
        RankingOptions {
            on_failure: if self.skip_failed {
                FailurePolicy::Skip
            } else {
                config.ranking.on_failure
            },
            top_n: self.top.or(config.ranking.top_n),
        }
    }
}

fn read_weights_file(path: &Path) -> Result<WeightOverrides> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MatcherError::InvalidInput(format!("Cannot read weights file {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_rank_jobs() {
        let cli = Cli::try_parse_from([
            "resume-matcher",
            "rank-jobs",
            "--resume",
            "resume.json",
            "--jobs",
            "jobs.jsonl",
            "--strategy",
            "lexical",
            "--scheme",
            "five-factor",
            "--top",
            "3",
            "--skip-failed",
            "--output",
            "markdown",
        ])
        .unwrap();

        match cli.command {
            Commands::RankJobs {
                strategy,
                scoring,
                ranking,
                output,
                ..
            } => {
                assert_eq!(strategy, Some(StrategyKind::Lexical));
                assert_eq!(scoring.scheme, Some(WeightingScheme::FiveFactor));
                assert_eq!(ranking.top, Some(3));
                assert!(ranking.skip_failed);
                assert_eq!(output.output, Some(OutputFormat::Markdown));
            }
            _ => panic!("expected rank-jobs"),
        }
    }

    #[test]
    fn test_weight_layering() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("weights.json");
        std::fs::write(&path, r#"{"skills_score": 0.5, "summary_score": 0.1}"#).unwrap();

        let mut config = Config::default();
        config.scoring.weights.experience = Some(0.3);
        config.scoring.weights.skills = Some(0.2);

        let args = ScoringArgs {
            weights: Some(path),
            summary_weight: Some(0.2),
            ..Default::default()
        };
        let overrides = args.weight_overrides(&config).unwrap();

        assert_eq!(overrides.experience, Some(0.3));
        assert_eq!(overrides.skills, Some(0.5));
        assert_eq!(overrides.summary, Some(0.2));
        assert!(overrides.profession.is_none());
    }

    #[test]
    fn test_ranking_options_fall_back_to_config() {
        let mut config = Config::default();
        config.ranking.top_n = Some(10);

        let options = RankingArgs::default().options(&config);
        assert_eq!(options.on_failure, FailurePolicy::Abort);
        assert_eq!(options.top_n, Some(10));

        let options = RankingArgs {
            top: Some(2),
            skip_failed: true,
        }
        .options(&config);
        assert_eq!(options.on_failure, FailurePolicy::Skip);
        assert_eq!(options.top_n, Some(2));
    }

    #[test]
    fn test_missing_weights_file() {
        let args = ScoringArgs {
            weights: Some(PathBuf::from("/nonexistent/weights.json")),
            ..Default::default()
        };
        let err = args.weight_overrides(&Config::default()).unwrap_err();
        assert!(matches!(err, MatcherError::InvalidInput(_)));
    }
}
