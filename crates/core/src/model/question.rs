use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

use crate::model::QuestionId;

const MAX_LABEL_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubConceptError {
    #[error("sub-concept label is empty")]
    Empty,
    #[error("sub-concept label is too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
}

/// Short tag naming the idea a question tests (e.g. `taxation`).
///
/// Labels are trimmed on construction, so `" taxation "` and `"taxation"` are the same concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubConcept(String);

impl SubConcept {
    /// Validate and build a label.
    ///
    /// # Errors
    ///
    /// Returns `SubConceptError` if the trimmed label is empty or too long.
    pub fn new(label: impl Into<String>) -> Result<Self, SubConceptError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(SubConceptError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_LABEL_LEN {
            return Err(SubConceptError::TooLong {
                len,
                max: MAX_LABEL_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label with underscores shown as spaces, for display.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl Borrow<str> for SubConcept {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubConcept {
    type Error = SubConceptError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubConcept> for String {
    fn from(value: SubConcept) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt is empty")]
    EmptyPrompt,
    #[error("question needs at least two options, got {0}")]
    TooFewOptions(usize),
    #[error("option {0} is blank")]
    BlankOption(usize),
    #[error("correct index {correct} is out of range for {options} options")]
    CorrectOutOfRange { correct: usize, options: usize },
    #[error(transparent)]
    Concept(#[from] SubConceptError),
}

/// Unvalidated question input, as authored in a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub concept: String,
    pub difficulty: Difficulty,
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is empty, there are fewer than two options,
    /// an option is blank, the correct index is out of range, or the label is invalid.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions(self.options.len()));
        }
        if let Some(blank) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::BlankOption(blank));
        }
        if self.correct >= self.options.len() {
            return Err(QuestionError::CorrectOutOfRange {
                correct: self.correct,
                options: self.options.len(),
            });
        }
        let concept = SubConcept::new(self.concept)?;

        Ok(Question {
            id: self.id,
            prompt,
            options: self.options,
            correct: self.correct,
            concept,
            difficulty: self.difficulty,
            explanation: self.explanation.trim().to_owned(),
        })
    }
}

/// A multiple-choice question. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    concept: SubConcept,
    difficulty: Difficulty,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct]
    }

    /// Text of the given option, if it exists.
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn concept(&self) -> &SubConcept {
        &self.concept
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Whether the given answer is the correct one. `None` is never correct.
    #[must_use]
    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct)
    }
}
