//! Personalized study content generated on demand.

use academy_core::model::{
    LearningMaterial, MaterialContent, StudentLevel, SubConcept, Topic,
};
use serde::Deserialize;

use crate::ai::{ChatPrompt, OpenAiClient, parse_json_reply};
use crate::error::ContentError;

const EDUCATOR_SYSTEM_PROMPT: &str = "You are an expert American Revolution history educator. Create engaging, accurate educational content.";

#[derive(Debug, Deserialize)]
struct GeneratedContent {
    title: String,
    content: MaterialContent,
}

/// Generates a `LearningMaterial` aimed at a learner's weak areas.
///
/// There is no offline fallback: failures are returned to the caller.
#[derive(Clone)]
pub struct ContentService {
    client: OpenAiClient,
}

impl ContentService {
    #[must_use]
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.client.enabled()
    }

    /// Generate material for `topic`, keyed by the first weak area.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NoWeakAreas` for an empty focus list, or an AI/reply
    /// error if generation fails.
    pub async fn generate(
        &self,
        topic: Topic,
        weak_areas: &[SubConcept],
        level: StudentLevel,
    ) -> Result<LearningMaterial, ContentError> {
        let concept = weak_areas.first().cloned().ok_or(ContentError::NoWeakAreas)?;

        let prompt = ChatPrompt {
            system: EDUCATOR_SYSTEM_PROMPT.to_owned(),
            user: content_prompt(topic, weak_areas, level),
            temperature: 0.4,
            max_tokens: 1200,
        };
        let reply = self.client.complete(&prompt).await?;
        let generated: GeneratedContent = parse_json_reply(&reply)?;
        material_from_reply(concept, generated)
    }
}

fn material_from_reply(
    concept: SubConcept,
    generated: GeneratedContent,
) -> Result<LearningMaterial, ContentError> {
    if generated.title.trim().is_empty() {
        return Err(ContentError::InvalidReply("missing title".into()));
    }
    if generated.content.overview.trim().is_empty() {
        return Err(ContentError::InvalidReply("missing overview".into()));
    }
    Ok(LearningMaterial::new(
        concept,
        generated.title.trim(),
        generated.content,
    ))
}

#[must_use]
pub fn content_prompt(topic: Topic, weak_areas: &[SubConcept], level: StudentLevel) -> String {
    let focus = weak_areas
        .iter()
        .map(SubConcept::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Create personalized learning content for a student studying the American Revolution.\n\n\
         Topic: {topic}\n\
         Student's weak areas: {focus}\n\
         Student level: {level}\n\n\
         Generate detailed content with:\n\
         1. Overview - Clear explanation of the concept\n\
         2. Key Points - 4-5 important bullet points\n\
         3. Deep Dive - Detailed explanation focusing on the weak areas\n\
         4. Examples - 3-4 specific historical examples\n\n\
         Focus specifically on addressing the student's weak areas: {focus}\n\n\
         Respond in JSON format:\n\
         {{\n  \"title\": \"content title\",\n  \"content\": {{\n    \
         \"overview\": \"overview text\",\n    \
         \"keyPoints\": [\"point 1\", \"point 2\", \"point 3\", \"point 4\"],\n    \
         \"deepDive\": \"detailed explanation\",\n    \
         \"examples\": [\"example 1\", \"example 2\", \"example 3\"]\n  }}\n}}\n",
        topic = topic.title(),
        level = level.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepts(labels: &[&str]) -> Vec<SubConcept> {
        labels.iter().map(|l| SubConcept::new(*l).unwrap()).collect()
    }

    #[test]
    fn prompt_names_topic_focus_and_level() {
        let prompt = content_prompt(
            Topic::Causes,
            &concepts(&["taxation", "enlightenment"]),
            StudentLevel::Intermediate,
        );
        assert!(prompt.contains("Topic: Causes of the Revolution"));
        assert!(prompt.contains("Student's weak areas: taxation, enlightenment"));
        assert!(prompt.contains("Student level: intermediate"));
        assert!(prompt.contains("\"keyPoints\""));
    }

    #[test]
    fn fenced_reply_becomes_material() {
        let reply = r#"```json
{
  "title": "Taxation and Protest",
  "content": {
    "overview": "Britain taxed the colonies.",
    "keyPoints": ["Stamp Act"],
    "deepDive": "Parliament needed revenue.",
    "examples": ["Boston Tea Party"]
  }
}
```"#;
        let generated: GeneratedContent = parse_json_reply(reply).unwrap();
        let material =
            material_from_reply(SubConcept::new("taxation").unwrap(), generated).unwrap();
        assert_eq!(material.title(), "Taxation and Protest");
        assert_eq!(material.concept().as_str(), "taxation");
        assert_eq!(material.content().key_points, vec!["Stamp Act".to_string()]);
    }

    #[test]
    fn blank_title_is_rejected() {
        let generated = GeneratedContent {
            title: "  ".into(),
            content: MaterialContent {
                overview: "x".into(),
                key_points: Vec::new(),
                deep_dive: String::new(),
                examples: Vec::new(),
            },
        };
        assert!(matches!(
            material_from_reply(SubConcept::new("taxation").unwrap(), generated),
            Err(ContentError::InvalidReply(_))
        ));
    }

    #[tokio::test]
    async fn empty_focus_is_rejected_before_any_request() {
        let service = ContentService::new(OpenAiClient::new(None));
        let result = service
            .generate(Topic::Causes, &[], StudentLevel::Beginner)
            .await;
        assert!(matches!(result, Err(ContentError::NoWeakAreas)));
    }
}
