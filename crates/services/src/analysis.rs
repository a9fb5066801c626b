//! Remote quiz analysis.

use std::fmt::Write as _;

use academy_core::model::{Question, QuizAnalysis, Submission, Topic};
use async_trait::async_trait;

use crate::ai::{ChatPrompt, OpenAiClient, parse_json_reply};
use crate::error::AnalysisError;

const TUTOR_SYSTEM_PROMPT: &str =
    "You are an expert American Revolution history tutor. Provide precise, educational analysis.";

/// Produces personalized feedback for a finished quiz.
///
/// Implementations may fail freely; callers fall back to the local score.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(
        &self,
        topic: Topic,
        questions: &[Question],
        submission: &Submission,
    ) -> Result<QuizAnalysis, AnalysisError>;
}

/// Analysis backed by an OpenAI-compatible chat completion.
#[derive(Clone)]
pub struct OpenAiAnalysisProvider {
    client: OpenAiClient,
}

impl OpenAiAnalysisProvider {
    #[must_use]
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiAnalysisProvider {
    async fn analyze(
        &self,
        topic: Topic,
        questions: &[Question],
        submission: &Submission,
    ) -> Result<QuizAnalysis, AnalysisError> {
        let prompt = ChatPrompt {
            system: TUTOR_SYSTEM_PROMPT.to_owned(),
            user: analysis_prompt(topic, questions, submission),
            temperature: 0.3,
            max_tokens: 800,
        };
        let reply = self.client.complete(&prompt).await?;
        let analysis: QuizAnalysis = parse_json_reply(&reply)?;
        if analysis.feedback.trim().is_empty() && analysis.weak_areas.is_empty() {
            return Err(AnalysisError::InvalidReply(
                "reply has neither feedback nor weak areas".into(),
            ));
        }
        Ok(analysis)
    }
}

/// Builds the tutor prompt listing every incorrect answer.
#[must_use]
pub fn analysis_prompt(topic: Topic, questions: &[Question], submission: &Submission) -> String {
    let mut prompt = format!(
        "Analyze this student's quiz performance on the American Revolution topic: \"{}\"\n\nIncorrect answers:\n",
        topic.title()
    );

    for (position, question) in questions.iter().enumerate() {
        let answer = submission.get(position);
        if question.is_correct(answer) {
            continue;
        }
        let student = answer
            .and_then(|index| question.option(index))
            .unwrap_or("No answer");
        let _ = write!(
            prompt,
            "\nQuestion: {}\nCorrect Answer: {}\nStudent Answer: {}\nTopic: {}\n",
            question.prompt(),
            question.correct_option(),
            student,
            question.concept(),
        );
    }

    prompt.push_str(
        "\nPlease provide:\n\
         1. Specific weak areas (be precise about historical concepts)\n\
         2. Personalized feedback explaining what the student needs to work on\n\
         3. 3-4 specific recommendations for improvement\n\n\
         Respond in JSON format:\n\
         {\n  \"weakAreas\": [\"specific_concept_1\", \"specific_concept_2\"],\n  \
         \"personalizedFeedback\": \"detailed feedback\",\n  \
         \"recommendations\": [\"recommendation 1\", \"recommendation 2\", \"recommendation 3\"]\n}\n",
    );
    prompt
}
