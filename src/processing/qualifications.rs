//! Qualification text aggregation

use crate::processing::records::{DescribedEntry, JobRecord, ResumeRecord};

/// Space-join the descriptions of every education, certification and
/// professional-experience entry, in that order. Entries without a
/// description are skipped; nothing is deduplicated.
pub fn resume_qualification_text(resume: &ResumeRecord) -> String {
    [
        &resume.educations,
        &resume.trainings_and_certifications,
        &resume.professional_experiences,
    ]
    .into_iter()
    .flat_map(|entries| entries.iter().filter_map(described))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Space-join the job's qualification lines.
pub fn job_qualification_text(job: &JobRecord) -> String {
    job.qualifications.join(" ")
}

fn described(entry: &DescribedEntry) -> Option<&str> {
    entry.description.as_deref().filter(|d| !d.is_empty())
}
