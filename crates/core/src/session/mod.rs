//! Session state machine driving quiz → score → remediate.
//!
//! Transitions take `now` from the caller so the services layer stays the only owner
//! of the clock. Progress is carried in an explicit `ProgressBook`; each completed quiz
//! replaces that topic's `TopicProgress` with a fresh value.
//!
//! Finishing remediation always sends the learner back into the quiz for the same topic.

mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{CatalogError, MaterialCatalog, QuestionBank};
use crate::model::{AnalysisOutcome, ProgressBook, QuizAnalysis, Topic, TopicProgress};
use crate::quiz::{QuizError, QuizRun};
use crate::remediation::Remediation;
use crate::scoring::{self, ScoringError};

pub use state::{PendingAnalysis, SessionState, StudyPlan};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("expected state {expected}, session is in {actual}")]
    NotInState {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("quiz still has unanswered questions and time remaining")]
    QuizInProgress,
    #[error("analysis is still running")]
    AnalysisPending,
    #[error("{remaining} learning sections are not complete yet")]
    RemediationIncomplete { remaining: usize },
    #[error("no learning material for {0} in this session")]
    UnknownMaterial(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

pub struct Session {
    bank: Arc<QuestionBank>,
    catalog: Arc<MaterialCatalog>,
    progress: ProgressBook,
    state: SessionState,
    shuffle_questions: bool,
}

impl Session {
    #[must_use]
    pub fn new(
        bank: Arc<QuestionBank>,
        catalog: Arc<MaterialCatalog>,
        progress: ProgressBook,
    ) -> Self {
        Self {
            bank,
            catalog,
            progress,
            state: SessionState::Dashboard,
            shuffle_questions: false,
        }
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    #[must_use]
    pub fn into_progress(self) -> ProgressBook {
        self.progress
    }

    #[must_use]
    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    fn not_in(&self, expected: &'static str) -> TransitionError {
        TransitionError::NotInState {
            expected,
            actual: self.state.name(),
        }
    }

    /// Pick a topic from the dashboard.
    ///
    /// Goes straight to studying when earlier progress on the topic left weak areas
    /// that have authored materials; otherwise starts the quiz.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotInState` outside the dashboard, or a catalog error
    /// if the bank has no questions for the topic.
    pub fn select_topic(
        &mut self,
        topic: Topic,
        now: DateTime<Utc>,
    ) -> Result<&SessionState, TransitionError> {
        if !matches!(self.state, SessionState::Dashboard) {
            return Err(self.not_in("dashboard"));
        }

        let previous = self.progress.get(topic);
        if previous.has_unresolved_weak_areas() {
            let remediation = Remediation::for_topic(&self.catalog, topic, previous.weak_areas());
            if remediation.has_materials() {
                self.state = SessionState::StudyingRemediation(StudyPlan::new(topic, remediation));
                return Ok(&self.state);
            }
        }

        self.start_quiz(topic, now)?;
        Ok(&self.state)
    }

    fn start_quiz(&mut self, topic: Topic, now: DateTime<Utc>) -> Result<(), TransitionError> {
        let questions = self.bank.questions(topic)?.to_vec();
        let run = if self.shuffle_questions {
            QuizRun::start_shuffled(topic, questions, now, &mut rand::rng())?
        } else {
            QuizRun::start(topic, questions, now)?
        };
        self.state = SessionState::TakingQuiz(run);
        Ok(())
    }

    /// The running quiz, for selecting answers and stepping between questions.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotInState` unless a quiz is being taken.
    pub fn quiz_mut(&mut self) -> Result<&mut QuizRun, TransitionError> {
        let actual = self.state.name();
        match &mut self.state {
            SessionState::TakingQuiz(run) => Ok(run),
            _ => Err(TransitionError::NotInState {
                expected: "taking_quiz",
                actual,
            }),
        }
    }

    /// Submit the quiz: score it locally and enter the analyzing sub-state.
    ///
    /// Allowed once every question is answered or the timer has run out.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::QuizInProgress` if neither holds.
    pub fn begin_analysis(&mut self, now: DateTime<Utc>) -> Result<PendingAnalysis, TransitionError> {
        let SessionState::TakingQuiz(run) = &self.state else {
            return Err(self.not_in("taking_quiz"));
        };
        if !run.is_finished() && !run.is_expired(now) {
            return Err(TransitionError::QuizInProgress);
        }

        let questions = run.questions().to_vec();
        let submission = run.submission();
        let local = scoring::score(&questions, &submission)?;
        let pending = PendingAnalysis {
            topic: run.topic(),
            questions,
            submission,
            local,
        };
        self.state = SessionState::Analyzing(pending.clone());
        Ok(pending)
    }

    /// Finish analysis with the remote record, or `None` to use the local fallback.
    ///
    /// Replaces the topic's progress and moves to the result screen.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotInState` unless analysis is pending.
    pub fn complete_analysis(
        &mut self,
        remote: Option<QuizAnalysis>,
    ) -> Result<AnalysisOutcome, TransitionError> {
        let SessionState::Analyzing(pending) = &self.state else {
            return Err(self.not_in("analyzing"));
        };

        let outcome = match remote {
            Some(analysis) => AnalysisOutcome::from_remote(pending.local.clone(), analysis),
            None => AnalysisOutcome::fallback(pending.local.clone()),
        };
        let topic = pending.topic;

        self.progress
            .replace(topic, TopicProgress::from_outcome(&outcome));
        self.state = SessionState::ReviewingResult {
            topic,
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    /// Leave the result screen: study missed concepts, or return to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotInState` unless a result is shown.
    pub fn acknowledge_result(&mut self) -> Result<&SessionState, TransitionError> {
        let SessionState::ReviewingResult { topic, outcome } = &self.state else {
            return Err(self.not_in("reviewing_result"));
        };

        let missed = outcome.result().missed();
        let next = if missed.is_empty() {
            SessionState::Dashboard
        } else {
            let remediation = Remediation::for_topic(&self.catalog, *topic, missed);
            SessionState::StudyingRemediation(StudyPlan::new(*topic, remediation))
        };
        self.state = next;
        Ok(&self.state)
    }

    /// Mark a material as studied. Returns `false` if it was already marked.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::UnknownMaterial` if the plan has no such material.
    pub fn mark_complete(&mut self, concept: &str) -> Result<bool, TransitionError> {
        let actual = self.state.name();
        let SessionState::StudyingRemediation(plan) = &mut self.state else {
            return Err(TransitionError::NotInState {
                expected: "studying_remediation",
                actual,
            });
        };
        let label = plan
            .materials()
            .iter()
            .map(|m| m.concept())
            .find(|c| c.as_str() == concept)
            .cloned()
            .ok_or_else(|| TransitionError::UnknownMaterial(concept.to_owned()))?;
        Ok(plan.completed.insert(label))
    }

    #[must_use]
    pub fn can_finish(&self) -> bool {
        matches!(&self.state, SessionState::StudyingRemediation(plan) if plan.all_completed())
    }

    /// Finish studying and retake the topic's quiz.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::RemediationIncomplete` while materials remain.
    pub fn finish_remediation(&mut self, now: DateTime<Utc>) -> Result<&SessionState, TransitionError> {
        let SessionState::StudyingRemediation(plan) = &self.state else {
            return Err(self.not_in("studying_remediation"));
        };
        if !plan.all_completed() {
            return Err(TransitionError::RemediationIncomplete {
                remaining: plan.remaining(),
            });
        }
        let topic = plan.topic;
        self.start_quiz(topic, now)?;
        Ok(&self.state)
    }

    /// Return to the dashboard, dropping any unfinished quiz or study state.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::AnalysisPending` while analysis is running.
    pub fn back(&mut self) -> Result<(), TransitionError> {
        if matches!(self.state, SessionState::Analyzing(_)) {
            return Err(TransitionError::AnalysisPending);
        }
        self.state = SessionState::Dashboard;
        Ok(())
    }
}
