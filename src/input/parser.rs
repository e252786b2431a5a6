//! Decoding record files into typed records

use crate::error::{MatcherError, Result};
use crate::input::file_detector::FileType;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Parse file content according to its detected type.
pub fn parse_records<T: DeserializeOwned>(content: &str, file_type: FileType) -> Result<Vec<T>> {
    match file_type {
        FileType::Json => parse_json(content),
        FileType::JsonLines => parse_json_lines(content),
        FileType::Unknown => Err(MatcherError::UnsupportedFormat(
            "expected a .json, .jsonl or .ndjson file".to_string(),
        )),
    }
}

fn parse_json<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    let records = match serde_json::from_str(content)? {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![record],
    };
    Ok(records)
}

fn parse_json_lines<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(MatcherError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::records::{JobRecord, ResumeRecord};

    #[test]
    fn test_single_object_and_array() {
        let one: Vec<ResumeRecord> = parse_records(r#"{"_id": "r1", "firstName": "Ada"}"#, FileType::Json).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].first_name, "Ada");

        let many: Vec<JobRecord> =
            parse_records(r#"[{"_id": "j1"}, {"_id": "j2", "jobTitle": "Data Engineer"}]"#, FileType::Json).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].job_title, "Data Engineer");
    }

    #[test]
    fn test_json_lines_skip_blank_lines() {
        let content = "{\"_id\": \"j1\"}\n\n   \n{\"_id\": \"j2\"}\n";
        let jobs: Vec<JobRecord> = parse_records(content, FileType::JsonLines).unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j2"]);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_records::<JobRecord>("{\"_id\": ", FileType::Json).unwrap_err();
        assert!(matches!(err, MatcherError::Serialization(_)));

        let err = parse_records::<JobRecord>("{\"_id\": \"j1\"}\nnot json", FileType::JsonLines).unwrap_err();
        assert!(matches!(err, MatcherError::Serialization(_)));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse_records::<JobRecord>("{}", FileType::Unknown).unwrap_err();
        assert!(matches!(err, MatcherError::UnsupportedFormat(_)));
    }
}
