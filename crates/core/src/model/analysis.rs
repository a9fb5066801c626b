use serde::{Deserialize, Serialize};

use crate::model::{ScoreResult, SubConcept};

/// Record returned by an external analysis provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnalysis {
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub weak_areas: Vec<String>,
    #[serde(default, rename = "personalizedFeedback")]
    pub feedback: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Remote,
    Fallback,
}

impl AnalysisSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisSource::Remote => "remote",
            AnalysisSource::Fallback => "fallback",
        }
    }
}

/// Score plus feedback shown on the result screen.
///
/// The score always comes from the local scorer; a remote analysis can only contribute
/// feedback, recommendations, and a narrower focus within the locally missed concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    result: ScoreResult,
    feedback: String,
    recommendations: Vec<String>,
    source: AnalysisSource,
}

impl AnalysisOutcome {
    /// Locally computed outcome with generic feedback.
    #[must_use]
    pub fn fallback(local: ScoreResult) -> Self {
        let (feedback, recommendations) = if local.passed() {
            (
                "Great work! You've demonstrated strong knowledge in this topic.".to_owned(),
                vec![
                    "Continue to the next topic".to_owned(),
                    "Review any challenging concepts".to_owned(),
                ],
            )
        } else {
            (
                format!(
                    "You scored {}%. Let's work on improving your understanding of the areas you missed.",
                    local.percentage()
                ),
                vec![
                    "Review the missed topics".to_owned(),
                    "Study the learning materials".to_owned(),
                    "Retake the quiz when ready".to_owned(),
                ],
            )
        };
        Self {
            result: local,
            feedback,
            recommendations,
            source: AnalysisSource::Fallback,
        }
    }

    /// Merge a remote analysis into the local result.
    ///
    /// Remote weak areas that are not valid labels or were not missed locally are dropped;
    /// if none remain the local missed set stands. Blank feedback falls back to the local text.
    #[must_use]
    pub fn from_remote(local: ScoreResult, analysis: QuizAnalysis) -> Self {
        let remote_labels: Vec<SubConcept> = analysis
            .weak_areas
            .into_iter()
            .filter_map(|label| SubConcept::new(label).ok())
            .collect();
        let result = local.narrowed_to(&remote_labels);
        let generic = Self::fallback(local);

        let feedback = if analysis.feedback.trim().is_empty() {
            generic.feedback
        } else {
            analysis.feedback.trim().to_owned()
        };
        let recommendations: Vec<String> = analysis
            .recommendations
            .into_iter()
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty())
            .collect();
        let recommendations = if recommendations.is_empty() {
            generic.recommendations
        } else {
            recommendations
        };

        Self {
            result,
            feedback,
            recommendations,
            source: AnalysisSource::Remote,
        }
    }

    #[must_use]
    pub fn result(&self) -> &ScoreResult {
        &self.result
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    #[must_use]
    pub fn source(&self) -> AnalysisSource {
        self.source
    }
}

/// Learner level passed to personalized content generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl StudentLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StudentLevel::Beginner => "beginner",
            StudentLevel::Intermediate => "intermediate",
            StudentLevel::Advanced => "advanced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn local(correct: usize, total: usize, missed: &[&str]) -> ScoreResult {
        let missed: BTreeSet<SubConcept> =
            missed.iter().map(|l| SubConcept::new(*l).unwrap()).collect();
        ScoreResult::new(correct, total, missed)
    }

    #[test]
    fn fallback_keeps_local_result() {
        let result = local(2, 3, &["colonial_response"]);
        let outcome = AnalysisOutcome::fallback(result.clone());
        assert_eq!(outcome.result(), &result);
        assert_eq!(outcome.source(), AnalysisSource::Fallback);
        assert!(outcome.feedback().starts_with("You scored 67%"));
        assert_eq!(outcome.recommendations().len(), 3);
    }

    #[test]
    fn fallback_for_passing_score_congratulates() {
        let outcome = AnalysisOutcome::fallback(local(3, 3, &[]));
        assert!(outcome.feedback().starts_with("Great work!"));
    }

    #[test]
    fn remote_score_is_ignored() {
        let result = local(1, 3, &["taxation", "enlightenment"]);
        let remote = QuizAnalysis {
            score: 99,
            weak_areas: vec!["taxation".into()],
            feedback: "Focus on the Stamp Act.".into(),
            recommendations: vec!["Reread the overview".into()],
        };
        let outcome = AnalysisOutcome::from_remote(result, remote);
        assert_eq!(outcome.result().percentage(), 33);
        assert_eq!(outcome.result().missed().len(), 1);
        assert_eq!(outcome.feedback(), "Focus on the Stamp Act.");
        assert_eq!(outcome.source(), AnalysisSource::Remote);
    }

    #[test]
    fn empty_remote_weak_areas_use_local_set() {
        let result = local(1, 3, &["taxation", "enlightenment"]);
        let outcome = AnalysisOutcome::from_remote(result.clone(), QuizAnalysis::default());
        assert_eq!(outcome.result(), &result);
        assert!(!outcome.feedback().is_empty());
        assert!(!outcome.recommendations().is_empty());
    }

    #[test]
    fn analysis_parses_provider_json() {
        let raw = r#"{
            "weakAreas": ["taxation"],
            "personalizedFeedback": "Review taxes.",
            "recommendations": ["a", "b"]
        }"#;
        let parsed: QuizAnalysis = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.weak_areas, vec!["taxation".to_string()]);
        assert_eq!(parsed.feedback, "Review taxes.");
        assert_eq!(parsed.score, 0);
    }
}
