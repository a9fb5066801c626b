use academy_core::model::{Topic, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, map_section_row},
};
use crate::repository::{LearningProgressRepository, SectionProgressRecord, StorageError};

#[async_trait::async_trait]
impl LearningProgressRepository for SqliteRepository {
    async fn record_section(&self, record: &SectionProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO learning_progress (
                    user_id, topic, concept, completed, time_spent_secs, recorded_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.topic.key())
        .bind(record.concept.as_str())
        .bind(i64::from(record.completed))
        .bind(i64::from(record.time_spent_secs))
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_sections(
        &self,
        user: UserId,
        topic: Topic,
    ) -> Result<Vec<SectionProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT user_id, topic, concept, completed, time_spent_secs, recorded_at
                FROM learning_progress
                WHERE user_id = ?1 AND topic = ?2
                ORDER BY recorded_at ASC, id ASC
            ",
        )
        .bind(user.to_string())
        .bind(topic.key())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_section_row(&row)?);
        }
        Ok(out)
    }
}
