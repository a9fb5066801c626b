//! Topic-keyed question banks and learning-material catalogs.

mod builtin;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{LearningMaterial, Question, SubConcept, Topic};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no questions for topic {0}")]
    TopicNotFound(Topic),
    #[error("topic {topic} already has material for {concept}")]
    DuplicateMaterial { topic: Topic, concept: SubConcept },
}

/// Questions per topic, in presentation order.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    topics: BTreeMap<Topic, Vec<Question>>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the question list for a topic. Empty lists are not stored.
    pub fn insert(&mut self, topic: Topic, questions: Vec<Question>) {
        if questions.is_empty() {
            self.topics.remove(&topic);
        } else {
            self.topics.insert(topic, questions);
        }
    }

    /// Questions for a topic.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::TopicNotFound` if the bank has no questions for the topic.
    pub fn questions(&self, topic: Topic) -> Result<&[Question], CatalogError> {
        self.topics
            .get(&topic)
            .map(Vec::as_slice)
            .ok_or(CatalogError::TopicNotFound(topic))
    }

    pub fn topics(&self) -> impl Iterator<Item = Topic> + '_ {
        self.topics.keys().copied()
    }
}

/// Learning materials per topic, each keyed by the sub-concept it covers.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    topics: BTreeMap<Topic, Vec<LearningMaterial>>,
}

impl MaterialCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a material to a topic, keeping authoring order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateMaterial` if the topic already covers that sub-concept.
    pub fn insert(&mut self, topic: Topic, material: LearningMaterial) -> Result<(), CatalogError> {
        let entries = self.topics.entry(topic).or_default();
        if entries.iter().any(|m| m.concept() == material.concept()) {
            return Err(CatalogError::DuplicateMaterial {
                topic,
                concept: material.concept().clone(),
            });
        }
        entries.push(material);
        Ok(())
    }

    /// Materials for a topic in catalog order, or `None` if the topic has no authored content.
    #[must_use]
    pub fn materials(&self, topic: Topic) -> Option<&[LearningMaterial]> {
        self.topics.get(&topic).map(Vec::as_slice)
    }

    #[must_use]
    pub fn get(&self, topic: Topic, concept: &str) -> Option<&LearningMaterial> {
        self.materials(topic)?
            .iter()
            .find(|m| m.concept().as_str() == concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialContent;

    fn material(label: &str) -> LearningMaterial {
        LearningMaterial::new(
            SubConcept::new(label).unwrap(),
            label.to_uppercase(),
            MaterialContent {
                overview: String::new(),
                key_points: Vec::new(),
                deep_dive: String::new(),
                examples: Vec::new(),
            },
        )
    }

    #[test]
    fn missing_topic_is_explicit() {
        let bank = QuestionBank::new();
        assert_eq!(
            bank.questions(Topic::Figures).unwrap_err(),
            CatalogError::TopicNotFound(Topic::Figures)
        );
    }

    #[test]
    fn duplicate_material_is_rejected() {
        let mut catalog = MaterialCatalog::new();
        catalog.insert(Topic::Causes, material("taxation")).unwrap();
        let err = catalog
            .insert(Topic::Causes, material("taxation"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateMaterial { .. }));
    }

    #[test]
    fn lookup_by_concept() {
        let mut catalog = MaterialCatalog::new();
        catalog.insert(Topic::Causes, material("taxation")).unwrap();
        assert!(catalog.get(Topic::Causes, "taxation").is_some());
        assert!(catalog.get(Topic::Causes, "enlightenment").is_none());
        assert!(catalog.materials(Topic::Events).is_none());
    }

    #[test]
    fn builtin_bank_covers_every_topic() {
        let bank = QuestionBank::builtin().unwrap();
        for topic in Topic::ALL {
            assert!(!bank.questions(topic).unwrap().is_empty(), "{topic}");
        }
        assert_eq!(bank.questions(Topic::Causes).unwrap().len(), 3);
    }

    #[test]
    fn builtin_catalog_matches_causes_questions() {
        let bank = QuestionBank::builtin().unwrap();
        let catalog = MaterialCatalog::builtin().unwrap();
        for question in bank.questions(Topic::Causes).unwrap() {
            assert!(
                catalog
                    .get(Topic::Causes, question.concept().as_str())
                    .is_some()
            );
        }
    }
}
