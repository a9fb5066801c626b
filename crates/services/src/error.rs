//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::session::TransitionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the chat-completions client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("AI features are not configured")]
    Disabled,
    #[error("AI service returned an empty response")]
    EmptyResponse,
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("AI reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors emitted by quiz analysis providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error("analysis reply is unusable: {0}")]
    InvalidReply(String),
}

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("no weak areas to generate content for")]
    NoWeakAreas,
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error("generated content is unusable: {0}")]
    InvalidReply(String),
}

/// Errors emitted by speech playback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("nothing to read aloud")]
    EmptyText,
    #[error("remote voice is not configured")]
    Disabled,
    #[error("voice service returned no audio")]
    EmptyAudio,
    #[error("voice request failed with status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("audio playback failed: {0}")]
    Playback(String),
    #[error("no voice available")]
    Unavailable,
}

/// Errors emitted by `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] academy_core::Error),
}
