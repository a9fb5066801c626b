use std::collections::BTreeSet;

use academy_core::model::{AnalysisSource, SubConcept, Topic, TopicProgress, UserId};
use sqlx::Row;

use crate::repository::{QuizSessionRecord, SectionProgressRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_topic(s: &str) -> Result<Topic, StorageError> {
    s.parse::<Topic>().map_err(ser)
}

pub(crate) fn parse_user(s: &str) -> Result<UserId, StorageError> {
    s.parse::<UserId>().map_err(ser)
}

pub(crate) fn parse_source(s: &str) -> Result<AnalysisSource, StorageError> {
    match s {
        "remote" => Ok(AnalysisSource::Remote),
        "fallback" => Ok(AnalysisSource::Fallback),
        _ => Err(StorageError::Serialization(format!(
            "invalid analysis source: {s}"
        ))),
    }
}

/// Concept labels are stored as a JSON array of strings.
pub(crate) fn concepts_to_json<'a>(
    concepts: impl IntoIterator<Item = &'a SubConcept>,
) -> Result<String, StorageError> {
    let labels: Vec<&str> = concepts.into_iter().map(SubConcept::as_str).collect();
    serde_json::to_string(&labels).map_err(ser)
}

fn concepts_from_json(raw: &str) -> Result<Vec<SubConcept>, StorageError> {
    let labels: Vec<String> = serde_json::from_str(raw).map_err(ser)?;
    labels
        .into_iter()
        .map(|l| SubConcept::new(l).map_err(ser))
        .collect()
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(Topic, TopicProgress), StorageError> {
    let topic = parse_topic(&row.try_get::<String, _>("topic").map_err(ser)?)?;
    let completed: bool = row.try_get::<i64, _>("completed").map_err(ser)? != 0;
    let score = u8_from_i64("score", row.try_get("score").map_err(ser)?)?;
    let weak_areas: BTreeSet<SubConcept> =
        concepts_from_json(&row.try_get::<String, _>("weak_areas").map_err(ser)?)?
            .into_iter()
            .collect();
    Ok((
        topic,
        TopicProgress::from_persisted(completed, score, weak_areas),
    ))
}

pub(crate) fn map_quiz_session_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<QuizSessionRecord, StorageError> {
    let recommendations: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("recommendations").map_err(ser)?)
            .map_err(ser)?;
    let answers: Vec<Option<usize>> =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;

    Ok(QuizSessionRecord {
        id: Some(row.try_get("id").map_err(ser)?),
        user_id: parse_user(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        topic: parse_topic(&row.try_get::<String, _>("topic").map_err(ser)?)?,
        score: u8_from_i64("score", row.try_get("score").map_err(ser)?)?,
        weak_areas: concepts_from_json(&row.try_get::<String, _>("weak_areas").map_err(ser)?)?,
        feedback: row.try_get("feedback").map_err(ser)?,
        recommendations,
        answers,
        source: parse_source(&row.try_get::<String, _>("analysis_source").map_err(ser)?)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_section_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SectionProgressRecord, StorageError> {
    Ok(SectionProgressRecord {
        user_id: parse_user(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        topic: parse_topic(&row.try_get::<String, _>("topic").map_err(ser)?)?,
        concept: SubConcept::new(row.try_get::<String, _>("concept").map_err(ser)?)
            .map_err(ser)?,
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        time_spent_secs: u32_from_i64(
            "time_spent_secs",
            row.try_get("time_spent_secs").map_err(ser)?,
        )?,
        recorded_at: row.try_get("recorded_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_strings_match_as_str() {
        for source in [AnalysisSource::Remote, AnalysisSource::Fallback] {
            assert_eq!(parse_source(source.as_str()).unwrap(), source);
        }
        assert!(parse_source("oracle").is_err());
    }

    #[test]
    fn concept_json_rejects_blank_labels() {
        assert!(concepts_from_json(r#"["taxation", "  "]"#).is_err());
        let parsed = concepts_from_json(r#"["taxation"]"#).unwrap();
        assert_eq!(parsed[0].as_str(), "taxation");
    }
}
