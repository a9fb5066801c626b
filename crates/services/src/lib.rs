#![forbid(unsafe_code)]

pub mod ai;
pub mod analysis;
pub mod app_services;
pub mod content;
pub mod error;
pub mod speech;
pub mod study;

pub use academy_core::Clock;

pub use analysis::{AnalysisProvider, OpenAiAnalysisProvider};
pub use app_services::AppServices;
pub use content::ContentService;
pub use error::{AiError, AnalysisError, AppServicesError, ContentError, SpeechError, StudyError};
pub use speech::{PlaybackRoute, SpeechPlayer};
pub use study::StudyService;
