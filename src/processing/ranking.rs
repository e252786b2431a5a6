//! Batch ranking of one record against many

use crate::error::{MatcherError, Result};
use crate::processing::matcher::{MatchResult, Matcher};
use crate::processing::records::{JobRecord, ResumeRecord};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// What to do when a single pair cannot be scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole ranking with the first error in input order.
    #[default]
    Abort,
    /// Drop the pair and record it in the outcome.
    Skip,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingOptions {
    pub on_failure: FailurePolicy,
    pub top_n: Option<usize>,
}

/// A pair that was dropped under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingFailure {
    pub index: usize,
    pub record_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingOutcome {
    /// Sorted by `overall_match_percentage`, highest first.
    pub matches: Vec<MatchResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RankingFailure>,
}

/// Rank `jobs` for a single resume.
pub fn rank_jobs(
    matcher: &Matcher,
    resume: &ResumeRecord,
    jobs: &[JobRecord],
    options: RankingOptions,
) -> Result<RankingOutcome> {
    info!(
        "Ranking {} jobs for resume '{}' with {} strategy",
        jobs.len(),
        resume.id,
        matcher.strategy_name()
    );
    let start_time = Instant::now();
    if !jobs.is_empty() {
        matcher.prepare()?;
    }

    let scored: Vec<(String, Result<MatchResult>)> = jobs
        .par_iter()
        .map(|job| (job.id.to_string(), matcher.score(resume, job)))
        .collect();

    let outcome = collect_outcome(scored, options)?;
    info!("Ranked {} jobs in {:.2?}", outcome.matches.len(), start_time.elapsed());
    Ok(outcome)
}

/// Rank `resumes` for a single job, tagging each result with the applicant.
pub fn rank_resumes(
    matcher: &Matcher,
    job: &JobRecord,
    resumes: &[ResumeRecord],
    options: RankingOptions,
) -> Result<RankingOutcome> {
    info!(
        "Ranking {} resumes for job '{}' with {} strategy",
        resumes.len(),
        job.id,
        matcher.strategy_name()
    );
    let start_time = Instant::now();
    if !resumes.is_empty() {
        matcher.prepare()?;
    }

    let scored: Vec<(String, Result<MatchResult>)> = resumes
        .par_iter()
        .map(|resume| {
            let result = matcher.score(resume, job).map(|mut result| {
                result.resume_id = Some(resume.id.to_string());
                result.applicant = Some(resume.applicant_name());
                result
            });
            (resume.id.to_string(), result)
        })
        .collect();

    let outcome = collect_outcome(scored, options)?;
    info!("Ranked {} resumes in {:.2?}", outcome.matches.len(), start_time.elapsed());
    Ok(outcome)
}

/// `scored` is in input order; errors are handled per policy before sorting.
fn collect_outcome(scored: Vec<(String, Result<MatchResult>)>, options: RankingOptions) -> Result<RankingOutcome> {
    let mut outcome = RankingOutcome::default();

    for (index, (record_id, result)) in scored.into_iter().enumerate() {
        match result {
            Ok(matched) => outcome.matches.push(matched),
            Err(e) => match options.on_failure {
                FailurePolicy::Abort => {
                    return Err(MatcherError::Ranking {
                        index,
                        record_id,
                        source: Box::new(e),
                    });
                }
                FailurePolicy::Skip => {
                    warn!("Skipping pair #{} ({}): {}", index, record_id, e);
                    outcome.failures.push(RankingFailure {
                        index,
                        record_id,
                        message: e.to_string(),
                    });
                }
            },
        }
    }

    sort_by_overall(&mut outcome.matches);
    if let Some(n) = options.top_n {
        outcome.matches.truncate(n);
    }
    Ok(outcome)
}

/// Highest overall first; ties keep their input order.
pub fn sort_by_overall(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| b.overall_match_percentage.total_cmp(&a.overall_match_percentage));
}
