//! Side-by-side overall scores from two similarity strategies

use crate::error::Result;
use crate::processing::matcher::{round2, Matcher};
use crate::processing::records::{JobRecord, ResumeRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub job_id: String,
    pub job_title: String,
    pub primary: f64,
    pub secondary: f64,
    /// `primary - secondary`, rounded to two decimals.
    pub difference: f64,
}

/// Score one resume against each job with both matchers. Rows keep the
/// input order of `jobs`.
pub fn compare_strategies(
    resume: &ResumeRecord,
    jobs: &[JobRecord],
    primary: &Matcher,
    secondary: &Matcher,
) -> Result<Vec<StrategyComparison>> {
    if !jobs.is_empty() {
        primary.prepare()?;
        secondary.prepare()?;
    }

    jobs.iter()
        .map(|job| {
            let first = primary.score(resume, job)?;
            let second = secondary.score(resume, job)?;
            Ok(StrategyComparison {
                job_id: first.job_id,
                job_title: first.job_title,
                primary: first.overall_match_percentage,
                secondary: second.overall_match_percentage,
                difference: round2(first.overall_match_percentage - second.overall_match_percentage),
            })
        })
        .collect()
}
