//! Resume-to-job match scoring

use crate::error::Result;
use crate::processing::experience::parse_required_years;
use crate::processing::records::{JobRecord, ResumeRecord};
use crate::processing::similarity::SimilarityStrategy;
use crate::processing::weights::{WeightOverrides, WeightingScheme, Weights};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Scores for one (resume, job) pair, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: String,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<String>,
    pub experience_score: f64,
    pub skills_score: f64,
    pub profession_score: f64,
    pub summary_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications_score: Option<f64>,
    pub overall_match_percentage: f64,
}

/// Unrounded sub-scores, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub experience: f64,
    pub skills: f64,
    pub profession: f64,
    pub summary: f64,
    /// Present only under the five-factor scheme.
    pub qualifications: Option<f64>,
}

impl SubScores {
    /// Plain weighted sum; the weights are not normalized.
    pub fn overall(&self, weights: &Weights) -> f64 {
        self.experience * weights.experience
            + self.skills * weights.skills
            + self.profession * weights.profession
            + self.summary * weights.summary
            + self.qualifications.map_or(0.0, |q| q * weights.qualifications)
    }
}

/// Scores resumes against jobs with an injected similarity strategy.
#[derive(Clone)]
pub struct Matcher {
    strategy: Arc<dyn SimilarityStrategy>,
    scheme: WeightingScheme,
    overrides: WeightOverrides,
}

impl Matcher {
    pub fn new(strategy: Arc<dyn SimilarityStrategy>) -> Self {
        Self {
            strategy,
            scheme: WeightingScheme::default(),
            overrides: WeightOverrides::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: WeightingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_overrides(mut self, overrides: WeightOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn scheme(&self) -> WeightingScheme {
        self.scheme
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Effective weights: overrides layered over the scheme defaults.
    pub fn weights(&self) -> Weights {
        self.overrides.resolve(self.scheme)
    }

    /// Readies the strategy for a batch, e.g. loads the embedding model.
    pub fn prepare(&self) -> Result<()> {
        self.strategy.prepare()
    }

    pub fn score(&self, resume: &ResumeRecord, job: &JobRecord) -> Result<MatchResult> {
        score_pair(resume, job, self.strategy.as_ref(), self.scheme, &self.weights())
    }

    pub fn sub_scores(&self, resume: &ResumeRecord, job: &JobRecord) -> Result<SubScores> {
        compute_sub_scores(resume, job, self.strategy.as_ref(), self.scheme)
    }
}

/// Four-factor match of one resume against one job. Absent overrides use
/// the default weights 0.25 / 0.25 / 0.15 / 0.35.
pub fn match_resume_to_job(
    resume: &ResumeRecord,
    job: &JobRecord,
    strategy: &dyn SimilarityStrategy,
    overrides: Option<&WeightOverrides>,
) -> Result<MatchResult> {
    let scheme = WeightingScheme::FourFactor;
    let weights = overrides.copied().unwrap_or_default().resolve(scheme);
    score_pair(resume, job, strategy, scheme, &weights)
}

fn score_pair(
    resume: &ResumeRecord,
    job: &JobRecord,
    strategy: &dyn SimilarityStrategy,
    scheme: WeightingScheme,
    weights: &Weights,
) -> Result<MatchResult> {
    let scores = compute_sub_scores(resume, job, strategy, scheme)?;
    let overall = scores.overall(weights);

    debug!(
        "Scored resume '{}' against job '{}' with {}: {:.2}",
        resume.id,
        job.id,
        strategy.name(),
        overall
    );

    Ok(MatchResult {
        job_id: job.id.to_string(),
        job_title: job.job_title.clone(),
        company_name: job.company_name.clone(),
        resume_id: None,
        applicant: None,
        experience_score: round2(scores.experience),
        skills_score: round2(scores.skills),
        profession_score: round2(scores.profession),
        summary_score: round2(scores.summary),
        qualifications_score: scores.qualifications.map(round2),
        overall_match_percentage: round2(overall),
    })
}

fn compute_sub_scores(
    resume: &ResumeRecord,
    job: &JobRecord,
    strategy: &dyn SimilarityStrategy,
    scheme: WeightingScheme,
) -> Result<SubScores> {
    let required = parse_required_years(job.work_experience.as_deref());
    let experience = experience_score(resume.total_experience_years, required);
    let skills = skills_score(&resume.skills, &job.skills);
    let profession = strategy.similarity(&resume.profession, &job.job_title)? * 100.0;

    let (summary, qualifications) = match scheme {
        WeightingScheme::FourFactor => {
            let candidate_text = format!("{} {}", resume.summary, resume.qualification_text());
            let summary = strategy.similarity(candidate_text.trim(), &job.job_description)? * 100.0;
            (summary, None)
        }
        WeightingScheme::FiveFactor => {
            let summary = strategy.similarity(&resume.summary, &job.job_description)? * 100.0;
            let qualifications = strategy
                .similarity(&resume.qualification_text(), &job.qualification_text())?
                * 100.0;
            (summary, Some(qualifications))
        }
    };

    Ok(SubScores {
        experience,
        skills,
        profession,
        summary,
        qualifications,
    })
}

/// Full credit when there is no requirement or it is met, otherwise the
/// fraction of the requirement covered.
pub fn experience_score(actual_years: f64, required_years: f64) -> f64 {
    if required_years > 0.0 {
        if actual_years >= required_years {
            100.0
        } else {
            actual_years / required_years * 100.0
        }
    } else {
        100.0
    }
}

/// Share of the job's required skills the candidate has, case-insensitive.
/// A job with no listed skills is fully satisfied.
pub fn skills_score(candidate_skills: &[String], required_skills: &[String]) -> f64 {
    let required: HashSet<String> = required_skills.iter().map(|s| s.to_lowercase()).collect();
    if required.is_empty() {
        return 100.0;
    }

    let candidate: HashSet<String> = candidate_skills.iter().map(|s| s.to_lowercase()).collect();
    let matched = required.intersection(&candidate).count();
    matched as f64 / required.len() as f64 * 100.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
