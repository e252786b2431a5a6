//! Resume and job records as stored by the recruiting platform

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Document identifier. Accepts a plain string, a number, or an
/// extended-JSON object id (`{"$oid": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRecordId", into = "String")]
pub struct RecordId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Plain(String),
    Number(i64),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl From<RawRecordId> for RecordId {
    fn from(raw: RawRecordId) -> Self {
        match raw {
            RawRecordId::Plain(id) => RecordId(id),
            RawRecordId::Number(n) => RecordId(n.to_string()),
            RawRecordId::ObjectId { oid } => RecordId(oid),
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An education, certification or professional-experience entry.
/// Only the description takes part in matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribedEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Option<String>,
}

impl DescribedEntry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profession: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_experience_years: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub educations: Vec<DescribedEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trainings_and_certifications: Vec<DescribedEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional_experiences: Vec<DescribedEntry>,
}

impl ResumeRecord {
    /// Display name used when ranking applicants for a job.
    pub fn applicant_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn qualification_text(&self) -> String {
        crate::processing::qualifications::resume_qualification_text(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_experience: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qualifications: Vec<String>,
}

impl JobRecord {
    pub fn qualification_text(&self) -> String {
        crate::processing::qualifications::job_qualification_text(self)
    }
}
