#![forbid(unsafe_code)]

//! Machine-readable summary of one collection run: which videos were
//! downgraded and why, and which never answered.

use std::{fs::File, io::BufWriter, path::Path};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collector::CollectorError;
use crate::video::Field;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisabledVideo {
    pub video_id: String,
    pub fields: Vec<Field>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedVideo {
    pub video_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub collected_at: DateTime<Utc>,
    pub total: usize,
    pub valid: usize,
    pub complete: usize,
    pub disabled: Vec<DisabledVideo>,
    pub skipped: Vec<SkippedVideo>,
}

impl RunSummary {
    pub fn write_json(&self, path: &Path) -> Result<(), CollectorError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn sample() -> RunSummary {
        RunSummary {
            collected_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            total: 3,
            valid: 2,
            complete: 1,
            disabled: vec![DisabledVideo {
                video_id: "BBBBBBBBBBB".into(),
                fields: vec![Field::Published, Field::Views],
                reasons: vec![
                    "no node matched the date selector".into(),
                    "no node matched the views selector".into(),
                ],
            }],
            skipped: vec![SkippedVideo {
                video_id: "CCCCCCCCCCC".into(),
                reason: "connection refused".into(),
            }],
        }
    }

    #[test]
    fn write_json_emits_field_names_and_rfc3339_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        sample().write_json(&path).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["collected_at"], json!("2024-05-01T12:00:00Z"));
        assert_eq!(value["total"], json!(3));
        assert_eq!(value["disabled"][0]["fields"], json!(["date", "views"]));
        assert_eq!(value["skipped"][0]["video_id"], json!("CCCCCCCCCCC"));
    }

    #[test]
    fn write_json_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let err = sample()
            .write_json(&dir.path().join("nope").join("report.json"))
            .unwrap_err();
        assert!(matches!(err, CollectorError::Io(_)));
    }
}
