//! Resume matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{MatcherError, Result};
pub use processing::matcher::{match_resume_to_job, MatchResult, Matcher};
pub use processing::records::{JobRecord, ResumeRecord};
pub use processing::similarity::{LexicalSimilarity, SemanticSimilarity, SimilarityStrategy, StrategyKind};
pub use processing::weights::{WeightOverrides, WeightingScheme, Weights};
