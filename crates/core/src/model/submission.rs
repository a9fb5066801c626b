use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::SubConcept;

/// Selected option per question, positionally matching the question list.
///
/// `None` marks a question left unanswered (e.g. the timer ran out).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Submission {
    answers: Vec<Option<usize>>,
}

impl Submission {
    #[must_use]
    pub fn new(answers: Vec<Option<usize>>) -> Self {
        Self { answers }
    }

    /// Submission where every question was answered.
    #[must_use]
    pub fn from_indices(indices: &[usize]) -> Self {
        Self::new(indices.iter().copied().map(Some).collect())
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.answers.get(position).copied().flatten()
    }
}

/// Outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    percentage: u8,
    correct: usize,
    total: usize,
    missed: BTreeSet<SubConcept>,
}

impl ScoreResult {
    pub(crate) fn new(correct: usize, total: usize, missed: BTreeSet<SubConcept>) -> Self {
        Self {
            percentage: rounded_percentage(correct, total),
            correct,
            total,
            missed,
        }
    }

    /// Integer percentage in `0..=100`.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Unique sub-concepts of incorrectly answered questions.
    #[must_use]
    pub fn missed(&self) -> &BTreeSet<SubConcept> {
        &self.missed
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage >= super::PASSING_SCORE
    }

    /// Same score, with the missed set narrowed to `focus`.
    ///
    /// Labels outside the locally missed set are ignored. If nothing survives the
    /// intersection the local missed set is kept.
    #[must_use]
    pub fn narrowed_to<'a>(&self, focus: impl IntoIterator<Item = &'a SubConcept>) -> Self {
        let narrowed: BTreeSet<SubConcept> = focus
            .into_iter()
            .filter(|label| self.missed.contains(*label))
            .cloned()
            .collect();
        if narrowed.is_empty() {
            return self.clone();
        }
        Self {
            missed: narrowed,
            ..self.clone()
        }
    }
}

/// `round(100 * correct / total)`, rounding halves up.
fn rounded_percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    let pct = (200 * correct + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepts(labels: &[&str]) -> BTreeSet<SubConcept> {
        labels.iter().map(|l| SubConcept::new(*l).unwrap()).collect()
    }

    #[test]
    fn rounds_like_the_percentage_formula() {
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(1, 2), 50);
        assert_eq!(rounded_percentage(0, 5), 0);
        assert_eq!(rounded_percentage(5, 5), 100);
    }

    #[test]
    fn pass_mark_is_seventy() {
        assert!(ScoreResult::new(7, 10, BTreeSet::new()).passed());
        assert!(!ScoreResult::new(2, 3, BTreeSet::new()).passed());
    }

    #[test]
    fn narrowing_keeps_only_locally_missed_labels() {
        let local = ScoreResult::new(1, 3, concepts(&["taxation", "enlightenment"]));
        let remote = concepts(&["taxation", "invented_label"]);
        let narrowed = local.narrowed_to(&remote);
        assert_eq!(narrowed.missed(), &concepts(&["taxation"]));
        assert_eq!(narrowed.percentage(), local.percentage());
    }

    #[test]
    fn narrowing_to_nothing_keeps_local_set() {
        let local = ScoreResult::new(1, 3, concepts(&["taxation"]));
        let narrowed = local.narrowed_to(&concepts(&["unrelated"]));
        assert_eq!(narrowed, local);
    }

    #[test]
    fn unanswered_positions_read_as_none() {
        let submission = Submission::new(vec![Some(1), None]);
        assert_eq!(submission.get(0), Some(1));
        assert_eq!(submission.get(1), None);
        assert_eq!(submission.get(7), None);
    }
}
