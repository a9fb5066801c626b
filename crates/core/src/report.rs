use std::collections::BTreeMap;

use crate::model::{ProgressBook, SubConcept, Topic, TopicProgress};

const TOP_WEAK_AREAS: usize = 5;

/// Qualitative label for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    VeryGood,
    Good,
    NeedsWork,
    NotStarted,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            80..=89 => Self::VeryGood,
            70..=79 => Self::Good,
            1..=69 => Self::NeedsWork,
            0 => Self::NotStarted,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::NeedsWork => "Needs Work",
            Self::NotStarted => "Not Started",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    Completed,
    InProgress,
    NotStarted,
}

impl TopicStatus {
    #[must_use]
    pub fn of(progress: &TopicProgress) -> Self {
        if progress.completed() {
            Self::Completed
        } else if progress.score() > 0 {
            Self::InProgress
        } else {
            Self::NotStarted
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::NotStarted => "Not Started",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLine {
    pub topic: Topic,
    pub status: TopicStatus,
    pub score: u8,
    pub weak_areas: Vec<SubConcept>,
}

/// Aggregate view over every topic, used by the progress screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub topics: Vec<TopicLine>,
    pub completed_topics: usize,
    pub overall_percent: u8,
    pub average_score: u8,
    pub average_band: ScoreBand,
    /// Most frequent weak areas across topics, highest count first.
    pub top_weak_areas: Vec<(SubConcept, usize)>,
}

impl ProgressReport {
    #[must_use]
    pub fn from_book(book: &ProgressBook) -> Self {
        let topics: Vec<TopicLine> = Topic::ALL
            .into_iter()
            .map(|topic| {
                let progress = book.get(topic);
                TopicLine {
                    topic,
                    status: TopicStatus::of(&progress),
                    score: progress.score(),
                    weak_areas: progress.weak_areas().iter().cloned().collect(),
                }
            })
            .collect();

        let total = topics.len();
        let completed_topics = topics
            .iter()
            .filter(|line| line.status == TopicStatus::Completed)
            .count();
        let score_sum: usize = topics.iter().map(|line| usize::from(line.score)).sum();
        let average_score = u8::try_from((2 * score_sum + total) / (2 * total)).unwrap_or(100);
        let overall_percent =
            u8::try_from((200 * completed_topics + total) / (2 * total)).unwrap_or(100);

        let mut counts: BTreeMap<SubConcept, usize> = BTreeMap::new();
        for line in &topics {
            for area in &line.weak_areas {
                *counts.entry(area.clone()).or_default() += 1;
            }
        }
        let mut top_weak_areas: Vec<(SubConcept, usize)> = counts.into_iter().collect();
        // Stable sort keeps label order among equal counts.
        top_weak_areas.sort_by(|a, b| b.1.cmp(&a.1));
        top_weak_areas.truncate(TOP_WEAK_AREAS);

        Self {
            topics,
            completed_topics,
            overall_percent,
            average_score,
            average_band: ScoreBand::for_score(average_score),
            top_weak_areas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn weak(labels: &[&str]) -> BTreeSet<SubConcept> {
        labels.iter().map(|l| SubConcept::new(*l).unwrap()).collect()
    }

    #[test]
    fn empty_book_reports_nothing_started() {
        let report = ProgressReport::from_book(&ProgressBook::new());
        assert_eq!(report.completed_topics, 0);
        assert_eq!(report.average_score, 0);
        assert_eq!(report.average_band, ScoreBand::NotStarted);
        assert!(report.topics.iter().all(|l| l.status == TopicStatus::NotStarted));
        assert!(report.top_weak_areas.is_empty());
    }

    #[test]
    fn aggregates_scores_and_weak_areas() {
        let mut book = ProgressBook::new();
        book.replace(Topic::Causes, TopicProgress::new(100, BTreeSet::new()));
        book.replace(Topic::Events, TopicProgress::new(33, weak(&["battles", "taxation"])));
        book.replace(Topic::Figures, TopicProgress::new(50, weak(&["taxation"])));

        let report = ProgressReport::from_book(&book);
        assert_eq!(report.completed_topics, 1);
        assert_eq!(report.overall_percent, 25);
        // (100 + 33 + 50 + 0) / 4 = 45.75
        assert_eq!(report.average_score, 46);
        assert_eq!(report.average_band, ScoreBand::NeedsWork);
        assert_eq!(report.topics[1].status, TopicStatus::InProgress);
        assert_eq!(report.top_weak_areas[0].0.as_str(), "taxation");
        assert_eq!(report.top_weak_areas[0].1, 2);
        assert_eq!(report.top_weak_areas[1].0.as_str(), "battles");
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::for_score(95), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(80), ScoreBand::VeryGood);
        assert_eq!(ScoreBand::for_score(70), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(1), ScoreBand::NeedsWork);
        assert_eq!(ScoreBand::for_score(0), ScoreBand::NotStarted);
    }
}
