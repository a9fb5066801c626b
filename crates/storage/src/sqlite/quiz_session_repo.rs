use academy_core::model::{Topic, UserId};

use super::{
    SqliteRepository,
    mapping::{concepts_to_json, conn, map_quiz_session_row, ser},
};
use crate::repository::{QuizSessionRecord, QuizSessionRepository, StorageError};

#[async_trait::async_trait]
impl QuizSessionRepository for SqliteRepository {
    async fn append_quiz_session(&self, record: &QuizSessionRecord) -> Result<i64, StorageError> {
        if record.id.is_some() {
            return Err(StorageError::Conflict);
        }

        let weak_areas = concepts_to_json(&record.weak_areas)?;
        let recommendations = serde_json::to_string(&record.recommendations).map_err(ser)?;
        let answers = serde_json::to_string(&record.answers).map_err(ser)?;

        let res = sqlx::query(
            r"
                INSERT INTO quiz_sessions (
                    user_id, topic, score, weak_areas, feedback,
                    recommendations, answers, analysis_source, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.topic.key())
        .bind(i64::from(record.score))
        .bind(weak_areas)
        .bind(record.feedback.as_str())
        .bind(recommendations)
        .bind(answers)
        .bind(record.source.as_str())
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn list_quiz_sessions(
        &self,
        user: UserId,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<QuizSessionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, topic, score, weak_areas, feedback,
                    recommendations, answers, analysis_source, completed_at
                FROM quiz_sessions
                WHERE user_id = ?1 AND (?2 IS NULL OR topic = ?2)
                ORDER BY completed_at DESC, id DESC
                LIMIT ?3
            ",
        )
        .bind(user.to_string())
        .bind(topic.map(Topic::key))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_quiz_session_row(&row)?);
        }
        Ok(out)
    }
}
