#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, LearningProgressRepository, ProgressRepository, QuizSessionRecord,
    QuizSessionRepository, SectionProgressRecord, Storage, StorageError,
};
