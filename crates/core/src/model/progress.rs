use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::model::{AnalysisOutcome, SubConcept, Topic};

/// Score a quiz run needs to count the topic as completed.
pub const PASSING_SCORE: u8 = 70;

/// Latest quiz outcome for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicProgress {
    completed: bool,
    score: u8,
    weak_areas: BTreeSet<SubConcept>,
}

impl TopicProgress {
    #[must_use]
    pub fn new(score: u8, weak_areas: BTreeSet<SubConcept>) -> Self {
        Self {
            completed: score >= PASSING_SCORE,
            score: score.min(100),
            weak_areas,
        }
    }

    /// Rehydrate progress from a persisted snapshot.
    #[must_use]
    pub fn from_persisted(completed: bool, score: u8, weak_areas: BTreeSet<SubConcept>) -> Self {
        Self {
            completed,
            score: score.min(100),
            weak_areas,
        }
    }

    #[must_use]
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        Self::new(
            outcome.result().percentage(),
            outcome.result().missed().clone(),
        )
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn weak_areas(&self) -> &BTreeSet<SubConcept> {
        &self.weak_areas
    }

    /// Whether a learner returning to the topic should go straight back to studying.
    #[must_use]
    pub fn has_unresolved_weak_areas(&self) -> bool {
        !self.completed && !self.weak_areas.is_empty()
    }
}

/// Per-topic progress for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressBook {
    topics: BTreeMap<Topic, TopicProgress>,
}

impl ProgressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress for a topic, or the untouched default if it was never attempted.
    #[must_use]
    pub fn get(&self, topic: Topic) -> TopicProgress {
        self.topics.get(&topic).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn attempted(&self, topic: Topic) -> bool {
        self.topics.contains_key(&topic)
    }

    /// Replace a topic's progress with a new snapshot.
    pub fn replace(&mut self, topic: Topic, progress: TopicProgress) {
        self.topics.insert(topic, progress);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Topic, &TopicProgress)> {
        self.topics.iter().map(|(topic, progress)| (*topic, progress))
    }
}

impl FromIterator<(Topic, TopicProgress)> for ProgressBook {
    fn from_iter<T: IntoIterator<Item = (Topic, TopicProgress)>>(iter: T) -> Self {
        Self {
            topics: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak(labels: &[&str]) -> BTreeSet<SubConcept> {
        labels.iter().map(|l| SubConcept::new(*l).unwrap()).collect()
    }

    #[test]
    fn completion_follows_pass_mark() {
        assert!(TopicProgress::new(70, BTreeSet::new()).completed());
        assert!(!TopicProgress::new(69, weak(&["taxation"])).completed());
    }

    #[test]
    fn unresolved_requires_incomplete_and_weak_areas() {
        assert!(TopicProgress::new(33, weak(&["taxation"])).has_unresolved_weak_areas());
        assert!(!TopicProgress::new(100, BTreeSet::new()).has_unresolved_weak_areas());
        assert!(!TopicProgress::new(67, BTreeSet::new()).has_unresolved_weak_areas());
        assert!(!TopicProgress::new(80, weak(&["taxation"])).has_unresolved_weak_areas());
    }

    #[test]
    fn replace_swaps_whole_snapshot() {
        let mut book = ProgressBook::new();
        book.replace(Topic::Causes, TopicProgress::new(33, weak(&["taxation"])));
        book.replace(Topic::Causes, TopicProgress::new(100, BTreeSet::new()));
        let progress = book.get(Topic::Causes);
        assert!(progress.completed());
        assert!(progress.weak_areas().is_empty());
        assert!(!book.attempted(Topic::Events));
        assert_eq!(book.get(Topic::Events), TopicProgress::default());
    }
}
