use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{QuestionError, SubConceptError, TopicParseError};
use crate::quiz::QuizError;
use crate::scoring::ScoringError;
use crate::session::TransitionError;

/// Umbrella error for callers that do not care which domain rule was violated.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    SubConcept(#[from] SubConceptError),
    #[error(transparent)]
    Topic(#[from] TopicParseError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
