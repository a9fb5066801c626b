use serde::{Deserialize, Serialize};

use crate::model::SubConcept;

/// Structured study content for one sub-concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialContent {
    pub overview: String,
    pub key_points: Vec<String>,
    pub deep_dive: String,
    pub examples: Vec<String>,
}

/// Tabs a learner can step through (and have read aloud) for a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSection {
    Overview,
    KeyPoints,
    DeepDive,
    Examples,
}

impl MaterialSection {
    pub const ALL: [MaterialSection; 4] = [
        MaterialSection::Overview,
        MaterialSection::KeyPoints,
        MaterialSection::DeepDive,
        MaterialSection::Examples,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            MaterialSection::Overview => "Overview",
            MaterialSection::KeyPoints => "Key Points",
            MaterialSection::DeepDive => "Deep Dive",
            MaterialSection::Examples => "Examples",
        }
    }
}

/// Remediation entry keyed by the sub-concept it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningMaterial {
    concept: SubConcept,
    title: String,
    content: MaterialContent,
}

impl LearningMaterial {
    #[must_use]
    pub fn new(concept: SubConcept, title: impl Into<String>, content: MaterialContent) -> Self {
        Self {
            concept,
            title: title.into(),
            content,
        }
    }

    #[must_use]
    pub fn concept(&self) -> &SubConcept {
        &self.concept
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &MaterialContent {
        &self.content
    }

    /// Text handed to speech playback for a section.
    #[must_use]
    pub fn narration(&self, section: MaterialSection) -> String {
        match section {
            MaterialSection::Overview => self.content.overview.clone(),
            MaterialSection::KeyPoints => {
                format!("Key Points: {}.", self.content.key_points.join(". "))
            }
            MaterialSection::DeepDive => self.content.deep_dive.clone(),
            MaterialSection::Examples => {
                format!("Examples: {}.", self.content.examples.join(". "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> LearningMaterial {
        LearningMaterial::new(
            SubConcept::new("taxation").unwrap(),
            "British Taxation Policies",
            MaterialContent {
                overview: "Britain taxed the colonies.".into(),
                key_points: vec!["Sugar Act".into(), "Stamp Act".into()],
                deep_dive: "No taxation without representation.".into(),
                examples: vec!["Tea Act".into()],
            },
        )
    }

    #[test]
    fn narration_joins_lists() {
        let m = material();
        assert_eq!(
            m.narration(MaterialSection::KeyPoints),
            "Key Points: Sugar Act. Stamp Act."
        );
        assert_eq!(m.narration(MaterialSection::Examples), "Examples: Tea Act.");
        assert_eq!(
            m.narration(MaterialSection::Overview),
            "Britain taxed the colonies."
        );
    }

    #[test]
    fn content_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(material().content()).unwrap();
        assert!(json.get("keyPoints").is_some());
        assert!(json.get("deepDive").is_some());
    }
}
