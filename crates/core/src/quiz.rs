//! Step-by-step state of a single quiz attempt.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::{Question, Submission, Topic};

/// Seconds allowed for one attempt before it is submitted as-is.
pub const QUIZ_TIME_LIMIT_SECS: i64 = 300;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    NoQuestions,
    #[error("option {option} does not exist (question has {options} options)")]
    OptionOutOfRange { option: usize, options: usize },
    #[error("select an answer before continuing")]
    NoSelection,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("every question has been answered")]
    AlreadyFinished,
    #[error("the time limit has passed")]
    TimeUp,
}

/// Result of moving past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Advanced { position: usize },
    Finished,
}

/// Where the learner is within the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRun {
    topic: Topic,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    current: usize,
    selected: Option<usize>,
    finished: bool,
    started_at: DateTime<Utc>,
}

impl QuizRun {
    /// Start an attempt over the given questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if the list is empty.
    pub fn start(
        topic: Topic,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            topic,
            questions,
            answers,
            current: 0,
            selected: None,
            finished: false,
            started_at,
        })
    }

    /// Start an attempt with the questions in random order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if the list is empty.
    pub fn start_shuffled<R: Rng + ?Sized>(
        topic: Topic,
        mut questions: Vec<Question>,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        questions.shuffle(rng);
        Self::start(topic, questions, started_at)
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        let shown = (self.current + 1).min(total);
        let percent = u8::try_from(shown * 100 / total).unwrap_or(100);
        QuizProgress {
            position: shown,
            total,
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
            percent,
        }
    }

    /// Pick an option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyFinished` after the last question, or
    /// `QuizError::OptionOutOfRange` for an option the question does not have.
    pub fn select(&mut self, option: usize) -> Result<(), QuizError> {
        let question = self.current().ok_or(QuizError::AlreadyFinished)?;
        let options = question.options().len();
        if option >= options {
            return Err(QuizError::OptionOutOfRange { option, options });
        }
        self.selected = Some(option);
        Ok(())
    }

    /// Record the selection and move on; finishing after the last question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::TimeUp` once the time limit has passed at `now`
    /// (nothing is recorded), or `QuizError::NoSelection` if nothing is selected.
    pub fn next(&mut self, now: DateTime<Utc>) -> Result<QuizStep, QuizError> {
        if self.finished {
            return Err(QuizError::AlreadyFinished);
        }
        if self.is_expired(now) {
            self.selected = None;
            return Err(QuizError::TimeUp);
        }
        let choice = self.selected.take().ok_or(QuizError::NoSelection)?;
        self.answers[self.current] = Some(choice);

        if self.is_last() {
            self.finished = true;
            return Ok(QuizStep::Finished);
        }
        self.current += 1;
        self.selected = self.answers[self.current];
        Ok(QuizStep::Advanced {
            position: self.current,
        })
    }

    /// Go back one question, restoring the answer recorded there.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AtFirstQuestion` on the first question.
    pub fn previous(&mut self) -> Result<(), QuizError> {
        if self.finished {
            return Err(QuizError::AlreadyFinished);
        }
        if self.current == 0 {
            return Err(QuizError::AtFirstQuestion);
        }
        self.current -= 1;
        self.selected = self.answers[self.current];
        Ok(())
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(QUIZ_TIME_LIMIT_SECS)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Seconds left on the timer, never negative.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline() - now).num_seconds().max(0)
    }

    /// Answers recorded so far; unanswered questions are `None`.
    #[must_use]
    pub fn submission(&self) -> Submission {
        Submission::new(self.answers.clone())
    }
}

/// Formats seconds as `m:ss` for the quiz timer.
#[must_use]
pub fn format_remaining(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}
