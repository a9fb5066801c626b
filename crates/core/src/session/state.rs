use std::collections::BTreeSet;

use crate::model::{AnalysisOutcome, LearningMaterial, Question, ScoreResult, SubConcept, Submission, Topic};
use crate::quiz::QuizRun;
use crate::remediation::Remediation;

/// Where the learner currently is in the quiz → score → remediate loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Dashboard,
    TakingQuiz(QuizRun),
    /// Waiting on the external analysis; quiz input is no longer accepted.
    Analyzing(PendingAnalysis),
    ReviewingResult {
        topic: Topic,
        outcome: AnalysisOutcome,
    },
    StudyingRemediation(StudyPlan),
}

impl SessionState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Dashboard => "dashboard",
            SessionState::TakingQuiz(_) => "taking_quiz",
            SessionState::Analyzing(_) => "analyzing",
            SessionState::ReviewingResult { .. } => "reviewing_result",
            SessionState::StudyingRemediation(_) => "studying_remediation",
        }
    }

    #[must_use]
    pub fn topic(&self) -> Option<Topic> {
        match self {
            SessionState::Dashboard => None,
            SessionState::TakingQuiz(run) => Some(run.topic()),
            SessionState::Analyzing(pending) => Some(pending.topic),
            SessionState::ReviewingResult { topic, .. } => Some(*topic),
            SessionState::StudyingRemediation(plan) => Some(plan.topic),
        }
    }
}

/// A submitted attempt, already scored locally, awaiting analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    pub(super) topic: Topic,
    pub(super) questions: Vec<Question>,
    pub(super) submission: Submission,
    pub(super) local: ScoreResult,
}

impl PendingAnalysis {
    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Result of the local scorer; the fallback of record.
    #[must_use]
    pub fn local(&self) -> &ScoreResult {
        &self.local
    }
}

/// Materials being studied and which of them the learner has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlan {
    pub(super) topic: Topic,
    pub(super) remediation: Remediation,
    pub(super) completed: BTreeSet<SubConcept>,
}

impl StudyPlan {
    pub(super) fn new(topic: Topic, remediation: Remediation) -> Self {
        Self {
            topic,
            remediation,
            completed: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn remediation(&self) -> &Remediation {
        &self.remediation
    }

    #[must_use]
    pub fn materials(&self) -> &[LearningMaterial] {
        self.remediation.materials()
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeSet<SubConcept> {
        &self.completed
    }

    #[must_use]
    pub fn is_completed(&self, concept: &SubConcept) -> bool {
        self.completed.contains(concept)
    }

    /// True once every material in a non-empty plan is marked complete.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        let materials = self.materials();
        !materials.is_empty() && materials.iter().all(|m| self.completed.contains(m.concept()))
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.materials()
            .iter()
            .filter(|m| !self.completed.contains(m.concept()))
            .count()
    }
}
