use std::sync::Arc;

use academy_core::catalog::{MaterialCatalog, QuestionBank};
use academy_core::model::{
    AnalysisOutcome, ProgressBook, QuizAnalysis, Topic, TopicProgress, UserId,
};
use academy_core::session::{PendingAnalysis, Session, SessionState};
use storage::repository::{QuizSessionRecord, SectionProgressRecord, Storage};

use crate::Clock;
use crate::analysis::AnalysisProvider;
use crate::error::StudyError;

/// Drives a learner's `Session`: remote analysis with local fallback, and persistence
/// when storage is configured.
///
/// Storage failures while saving are logged and never interrupt the learner.
#[derive(Clone)]
pub struct StudyService {
    clock: Clock,
    user: UserId,
    bank: Arc<QuestionBank>,
    catalog: Arc<MaterialCatalog>,
    analysis: Option<Arc<dyn AnalysisProvider>>,
    storage: Option<Storage>,
    shuffle_questions: bool,
}

impl StudyService {
    #[must_use]
    pub fn new(
        clock: Clock,
        user: UserId,
        bank: Arc<QuestionBank>,
        catalog: Arc<MaterialCatalog>,
    ) -> Self {
        Self {
            clock,
            user,
            bank,
            catalog,
            analysis: None,
            storage: None,
            shuffle_questions: false,
        }
    }

    #[must_use]
    pub fn with_analysis(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.analysis = Some(provider);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    #[must_use]
    pub fn user(&self) -> UserId {
        self.user
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// Open a session on the dashboard, seeded with stored progress.
    ///
    /// Unreadable progress is logged and the learner starts fresh.
    pub async fn start_session(&self) -> Session {
        let progress = self.load_progress().await;
        Session::new(
            Arc::clone(&self.bank),
            Arc::clone(&self.catalog),
            progress,
        )
        .with_shuffle_questions(self.shuffle_questions)
    }

    async fn load_progress(&self) -> ProgressBook {
        let Some(storage) = &self.storage else {
            return ProgressBook::new();
        };
        match storage.progress.load_progress(self.user).await {
            Ok(book) => book,
            Err(err) => {
                tracing::warn!(user = %self.user, error = %err, "could not load progress");
                ProgressBook::new()
            }
        }
    }

    /// Submit the running quiz, analyze it, and move the session to the result screen.
    ///
    /// The score is always computed locally. When the provider is missing or fails the
    /// outcome carries generic feedback instead.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Transition` if the session is not ready to submit.
    pub async fn submit_quiz(&self, session: &mut Session) -> Result<AnalysisOutcome, StudyError> {
        let pending = session.begin_analysis(self.clock.now())?;
        let remote = self.analyze(&pending).await;
        let outcome = session.complete_analysis(remote)?;

        tracing::info!(
            topic = %pending.topic(),
            score = outcome.result().percentage(),
            source = outcome.source().as_str(),
            "quiz analyzed"
        );
        self.persist_outcome(&pending, &outcome).await;
        Ok(outcome)
    }

    async fn analyze(
        &self,
        pending: &PendingAnalysis,
    ) -> Option<QuizAnalysis> {
        let provider = self.analysis.as_ref()?;
        match provider
            .analyze(pending.topic(), pending.questions(), pending.submission())
            .await
        {
            Ok(analysis) => Some(analysis),
            Err(err) => {
                tracing::warn!(topic = %pending.topic(), error = %err, "analysis unavailable, using local score");
                None
            }
        }
    }

    async fn persist_outcome(&self, pending: &PendingAnalysis, outcome: &AnalysisOutcome) {
        let Some(storage) = &self.storage else {
            return;
        };
        let topic = pending.topic();

        if let Err(err) = storage
            .progress
            .save_progress(
                self.user,
                topic,
                &TopicProgress::from_outcome(outcome),
                self.clock.now(),
            )
            .await
        {
            tracing::warn!(%topic, error = %err, "could not save topic progress");
        }

        let record = QuizSessionRecord::from_outcome(
            self.user,
            topic,
            pending.submission(),
            outcome,
            self.clock.now(),
        );
        if let Err(err) = storage.quiz_sessions.append_quiz_session(&record).await {
            tracing::warn!(%topic, error = %err, "could not save quiz session");
        }
    }

    /// Mark a remediation material as studied and record the time spent on it.
    ///
    /// Returns `false` when the material was already marked; nothing is recorded then.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Transition` outside remediation or for unknown materials.
    pub async fn complete_section(
        &self,
        session: &mut Session,
        concept: &str,
        time_spent_secs: u32,
    ) -> Result<bool, StudyError> {
        if !session.mark_complete(concept)? {
            return Ok(false);
        }
        let Some(storage) = &self.storage else {
            return Ok(true);
        };
        let SessionState::StudyingRemediation(plan) = session.state() else {
            return Ok(true);
        };
        let Some(label) = plan.completed().iter().find(|c| c.as_str() == concept) else {
            return Ok(true);
        };

        let record = SectionProgressRecord {
            user_id: self.user,
            topic: plan.topic(),
            concept: label.clone(),
            completed: true,
            time_spent_secs,
            recorded_at: self.clock.now(),
        };
        if let Err(err) = storage.sections.record_section(&record).await {
            tracing::warn!(topic = %record.topic, concept, error = %err, "could not save section progress");
        }
        Ok(true)
    }

    /// Finish remediation and start the retake quiz.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Transition` while materials remain unstudied.
    pub fn finish_remediation(&self, session: &mut Session) -> Result<(), StudyError> {
        session.finish_remediation(self.clock.now())?;
        Ok(())
    }

    /// Pick a topic from the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Transition` outside the dashboard.
    pub fn select_topic(&self, session: &mut Session, topic: Topic) -> Result<(), StudyError> {
        session.select_topic(topic, self.clock.now())?;
        Ok(())
    }

    /// Stored progress for the learner; empty without storage.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Storage` if stored progress cannot be read.
    pub async fn progress(&self) -> Result<ProgressBook, StudyError> {
        match &self.storage {
            Some(storage) => Ok(storage.progress.load_progress(self.user).await?),
            None => Ok(ProgressBook::new()),
        }
    }

    /// Recent quiz attempts, newest first; empty without storage.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Storage` if history cannot be read.
    pub async fn history(
        &self,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<QuizSessionRecord>, StudyError> {
        match &self.storage {
            Some(storage) => Ok(storage
                .quiz_sessions
                .list_quiz_sessions(self.user, topic, limit)
                .await?),
            None => Ok(Vec::new()),
        }
    }
}
