mod analysis;
mod ids;
mod material;
mod progress;
mod question;
mod submission;
mod topic;

pub use analysis::{AnalysisOutcome, AnalysisSource, QuizAnalysis, StudentLevel};
pub use ids::{ParseIdError, QuestionId, UserId};
pub use material::{LearningMaterial, MaterialContent, MaterialSection};
pub use progress::{PASSING_SCORE, ProgressBook, TopicProgress};
pub use question::{Difficulty, Question, QuestionDraft, QuestionError, SubConcept, SubConceptError};
pub use submission::{ScoreResult, Submission};
pub use topic::{Topic, TopicParseError};
