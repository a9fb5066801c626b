use academy_core::model::{ProgressBook, Topic, TopicProgress, UserId};
use chrono::{DateTime, Utc};

use super::{
    SqliteRepository,
    mapping::{concepts_to_json, conn, map_progress_row},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn save_progress(
        &self,
        user: UserId,
        topic: Topic,
        progress: &TopicProgress,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let weak_areas = concepts_to_json(progress.weak_areas())?;

        sqlx::query(
            r"
                INSERT INTO topic_progress (user_id, topic, completed, score, weak_areas, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(user_id, topic) DO UPDATE SET
                    completed = excluded.completed,
                    score = excluded.score,
                    weak_areas = excluded.weak_areas,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(user.to_string())
        .bind(topic.key())
        .bind(i64::from(progress.completed()))
        .bind(i64::from(progress.score()))
        .bind(weak_areas)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn load_progress(&self, user: UserId) -> Result<ProgressBook, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT topic, completed, score, weak_areas
                FROM topic_progress
                WHERE user_id = ?1
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut book = ProgressBook::new();
        for row in rows {
            let (topic, progress) = map_progress_row(&row)?;
            book.replace(topic, progress);
        }
        Ok(book)
    }
}
