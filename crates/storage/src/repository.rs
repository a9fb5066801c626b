use academy_core::model::{
    AnalysisOutcome, AnalysisSource, ProgressBook, SubConcept, Submission, Topic, TopicProgress,
    UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One finished quiz attempt, as persisted for history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSessionRecord {
    pub id: Option<i64>,
    pub user_id: UserId,
    pub topic: Topic,
    pub score: u8,
    pub weak_areas: Vec<SubConcept>,
    pub feedback: String,
    pub recommendations: Vec<String>,
    pub answers: Vec<Option<usize>>,
    pub source: AnalysisSource,
    pub completed_at: DateTime<Utc>,
}

impl QuizSessionRecord {
    #[must_use]
    pub fn from_outcome(
        user_id: UserId,
        topic: Topic,
        submission: &Submission,
        outcome: &AnalysisOutcome,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            topic,
            score: outcome.result().percentage(),
            weak_areas: outcome.result().missed().iter().cloned().collect(),
            feedback: outcome.feedback().to_owned(),
            recommendations: outcome.recommendations().to_vec(),
            answers: submission.answers().to_vec(),
            source: outcome.source(),
            completed_at,
        }
    }
}

/// Completion of one learning section during remediation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgressRecord {
    pub user_id: UserId,
    pub topic: Topic,
    pub concept: SubConcept,
    pub completed: bool,
    pub time_spent_secs: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Latest progress snapshot per learner and topic.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Replace the stored snapshot for a topic, stamping it with `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_progress(
        &self,
        user: UserId,
        topic: Topic,
        progress: &TopicProgress,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Every stored topic snapshot for the learner. Unknown learners get an empty book.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn load_progress(&self, user: UserId) -> Result<ProgressBook, StorageError>;
}

#[async_trait]
pub trait QuizSessionRepository: Send + Sync {
    /// Append a finished attempt and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the record already carries an id, or another
    /// `StorageError` if it cannot be stored.
    async fn append_quiz_session(&self, record: &QuizSessionRecord) -> Result<i64, StorageError>;

    /// Attempts for a learner, newest first, optionally restricted to one topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_quiz_sessions(
        &self,
        user: UserId,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<QuizSessionRecord>, StorageError>;
}

#[async_trait]
pub trait LearningProgressRepository: Send + Sync {
    /// Append a section completion event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn record_section(&self, record: &SectionProgressRecord) -> Result<(), StorageError>;

    /// Section events for a learner and topic in the order they were recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_sections(
        &self,
        user: UserId,
        topic: Topic,
    ) -> Result<Vec<SectionProgressRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<(UserId, Topic), TopicProgress>>>,
    quiz_sessions: Arc<Mutex<Vec<QuizSessionRecord>>>,
    sections: Arc<Mutex<Vec<SectionProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn save_progress(
        &self,
        user: UserId,
        topic: Topic,
        progress: &TopicProgress,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert((user, topic), progress.clone());
        Ok(())
    }

    async fn load_progress(&self, user: UserId) -> Result<ProgressBook, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|((owner, _), _)| *owner == user)
            .map(|((_, topic), progress)| (*topic, progress.clone()))
            .collect())
    }
}

#[async_trait]
impl QuizSessionRepository for InMemoryRepository {
    async fn append_quiz_session(&self, record: &QuizSessionRecord) -> Result<i64, StorageError> {
        if record.id.is_some() {
            return Err(StorageError::Conflict);
        }
        let mut guard = self.quiz_sessions.lock().map_err(poisoned)?;
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("quiz session id overflow".into()))?;
        let mut stored = record.clone();
        stored.id = Some(id);
        guard.push(stored);
        Ok(id)
    }

    async fn list_quiz_sessions(
        &self,
        user: UserId,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<QuizSessionRecord>, StorageError> {
        let guard = self.quiz_sessions.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard
            .iter()
            .rev()
            .filter(|r| r.user_id == user && topic.is_none_or(|t| r.topic == t))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LearningProgressRepository for InMemoryRepository {
    async fn record_section(&self, record: &SectionProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.sections.lock().map_err(poisoned)?;
        guard.push(record.clone());
        Ok(())
    }

    async fn list_sections(
        &self,
        user: UserId,
        topic: Topic,
    ) -> Result<Vec<SectionProgressRecord>, StorageError> {
        let guard = self.sections.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|r| r.user_id == user && r.topic == topic)
            .cloned()
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub quiz_sessions: Arc<dyn QuizSessionRepository>,
    pub sections: Arc<dyn LearningProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let quiz_sessions: Arc<dyn QuizSessionRepository> = Arc::new(repo.clone());
        let sections: Arc<dyn LearningProgressRepository> = Arc::new(repo);
        Self {
            progress,
            quiz_sessions,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_now;
    use std::collections::BTreeSet;

    fn weak(labels: &[&str]) -> BTreeSet<SubConcept> {
        labels.iter().map(|l| SubConcept::new(*l).unwrap()).collect()
    }

    fn record(user: UserId, topic: Topic, score: u8) -> QuizSessionRecord {
        QuizSessionRecord {
            id: None,
            user_id: user,
            topic,
            score,
            weak_areas: Vec::new(),
            feedback: "ok".into(),
            recommendations: Vec::new(),
            answers: vec![Some(1)],
            source: AnalysisSource::Fallback,
            completed_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn progress_is_scoped_per_user() {
        let repo = InMemoryRepository::new();
        let alice = UserId::generate();
        let bob = UserId::generate();

        repo.save_progress(
            alice,
            Topic::Causes,
            &TopicProgress::new(33, weak(&["taxation"])),
            fixed_now(),
        )
        .await
        .unwrap();
        repo.save_progress(
            bob,
            Topic::Events,
            &TopicProgress::new(100, BTreeSet::new()),
            fixed_now(),
        )
        .await
        .unwrap();

        let book = repo.load_progress(alice).await.unwrap();
        assert_eq!(book.get(Topic::Causes).score(), 33);
        assert!(!book.attempted(Topic::Events));
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        repo.save_progress(
            user,
            Topic::Causes,
            &TopicProgress::new(33, weak(&["taxation"])),
            fixed_now(),
        )
        .await
        .unwrap();
        repo.save_progress(
            user,
            Topic::Causes,
            &TopicProgress::new(100, BTreeSet::new()),
            fixed_now(),
        )
        .await
        .unwrap();
        let progress = repo.load_progress(user).await.unwrap().get(Topic::Causes);
        assert!(progress.completed());
        assert!(progress.weak_areas().is_empty());
    }

    #[tokio::test]
    async fn quiz_sessions_list_newest_first() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        repo.append_quiz_session(&record(user, Topic::Causes, 33)).await.unwrap();
        repo.append_quiz_session(&record(user, Topic::Events, 0)).await.unwrap();
        let last = repo.append_quiz_session(&record(user, Topic::Causes, 100)).await.unwrap();

        let causes = repo
            .list_quiz_sessions(user, Some(Topic::Causes), 10)
            .await
            .unwrap();
        assert_eq!(causes.len(), 2);
        assert_eq!(causes[0].id, Some(last));
        assert_eq!(causes[0].score, 100);

        let all = repo.list_quiz_sessions(user, None, 2).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
