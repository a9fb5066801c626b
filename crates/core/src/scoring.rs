//! Scores a submission against the question list it answers.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{Question, ScoreResult, Submission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("submission has {answers} answers for {questions} questions")]
    LengthMismatch { questions: usize, answers: usize },
    #[error("cannot score an empty question list")]
    NoQuestions,
}

/// Compare each answer to its question's correct index.
///
/// Unanswered positions count as incorrect. The missed set holds each
/// sub-concept of an incorrect position once.
///
/// # Errors
///
/// Returns `ScoringError::LengthMismatch` if the submission does not have exactly one
/// entry per question, and `ScoringError::NoQuestions` for an empty list.
pub fn score(questions: &[Question], submission: &Submission) -> Result<ScoreResult, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::NoQuestions);
    }
    if questions.len() != submission.len() {
        return Err(ScoringError::LengthMismatch {
            questions: questions.len(),
            answers: submission.len(),
        });
    }

    let mut correct = 0_usize;
    let mut missed = BTreeSet::new();
    for (question, answer) in questions.iter().zip(submission.answers()) {
        if question.is_correct(*answer) {
            correct += 1;
        } else {
            missed.insert(question.concept().clone());
        }
    }

    Ok(ScoreResult::new(correct, questions.len(), missed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionDraft, QuestionId, SubConcept};

    fn question(id: u32, correct: usize, concept: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            prompt: format!("Question {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            concept: concept.into(),
            difficulty: Difficulty::Medium,
            explanation: String::new(),
        }
        .validate()
        .unwrap()
    }

    fn three_questions() -> Vec<Question> {
        vec![
            question(1, 1, "taxation"),
            question(2, 2, "colonial_response"),
            question(3, 1, "enlightenment"),
        ]
    }

    fn labels(result: &ScoreResult) -> Vec<&str> {
        result.missed().iter().map(SubConcept::as_str).collect()
    }

    #[test]
    fn one_wrong_out_of_three() {
        let result = score(&three_questions(), &Submission::from_indices(&[1, 0, 1])).unwrap();
        assert_eq!(result.percentage(), 67);
        assert_eq!(result.correct(), 2);
        assert_eq!(labels(&result), vec!["colonial_response"]);
    }

    #[test]
    fn perfect_submission_has_no_misses() {
        let result = score(&three_questions(), &Submission::from_indices(&[1, 2, 1])).unwrap();
        assert_eq!(result.percentage(), 100);
        assert!(result.missed().is_empty());
        assert!(result.passed());
    }

    #[test]
    fn all_wrong_misses_every_label() {
        let result = score(&three_questions(), &Submission::from_indices(&[0, 0, 0])).unwrap();
        assert_eq!(result.percentage(), 0);
        assert_eq!(
            labels(&result),
            vec!["colonial_response", "enlightenment", "taxation"]
        );
    }

    #[test]
    fn duplicate_labels_are_reported_once() {
        let questions = vec![
            question(1, 0, "taxation"),
            question(2, 0, "taxation"),
            question(3, 0, "enlightenment"),
            question(4, 0, "enlightenment"),
        ];
        let result = score(&questions, &Submission::from_indices(&[1, 1, 0, 1])).unwrap();
        assert_eq!(result.percentage(), 25);
        assert_eq!(labels(&result), vec!["enlightenment", "taxation"]);
    }

    #[test]
    fn unanswered_counts_as_wrong() {
        let submission = Submission::new(vec![Some(1), None, Some(1)]);
        let result = score(&three_questions(), &submission).unwrap();
        assert_eq!(result.percentage(), 67);
        assert_eq!(labels(&result), vec!["colonial_response"]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = score(&three_questions(), &Submission::from_indices(&[1, 2])).unwrap_err();
        assert_eq!(
            err,
            ScoringError::LengthMismatch {
                questions: 3,
                answers: 2
            }
        );
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert_eq!(
            score(&[], &Submission::default()).unwrap_err(),
            ScoringError::NoQuestions
        );
    }

    #[test]
    fn percentage_matches_formula_for_every_mask() {
        let questions = three_questions();
        let correct = [1_usize, 2, 1];
        for mask in 0_u8..8 {
            let answers: Vec<usize> = (0..3)
                .map(|i| if mask & (1 << i) != 0 { correct[i] } else { 3 })
                .collect();
            let right = mask.count_ones() as f64;
            let expected = (100.0 * right / 3.0).round() as u8;
            let first = score(&questions, &Submission::from_indices(&answers)).unwrap();
            let second = score(&questions, &Submission::from_indices(&answers)).unwrap();
            assert_eq!(first.percentage(), expected);
            assert_eq!(first, second);
        }
    }
}
