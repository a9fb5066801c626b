//! Maps missed sub-concepts to the learning materials that cover them.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::catalog::MaterialCatalog;
use crate::model::{LearningMaterial, SubConcept, Topic};

/// Catalog entries whose concept was missed, in catalog order.
///
/// Missed labels without a catalog entry are left out.
pub fn select_materials<I, S>(entries: &[LearningMaterial], missed: I) -> Vec<LearningMaterial>
where
    I: IntoIterator<Item = S>,
    S: Borrow<SubConcept>,
{
    let wanted: BTreeSet<SubConcept> = missed.into_iter().map(|s| s.borrow().clone()).collect();
    entries
        .iter()
        .filter(|m| wanted.contains(m.concept()))
        .cloned()
        .collect()
}

/// What a learner should study after a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remediation {
    /// Nothing was missed.
    NothingToReview,
    /// Concepts were missed but none of them has authored content.
    ContentPending { missing: Vec<SubConcept> },
    /// Materials to study, plus missed concepts that still lack content.
    Study {
        materials: Vec<LearningMaterial>,
        uncovered: Vec<SubConcept>,
    },
}

impl Remediation {
    /// Build a plan from a topic's catalog entries and the missed set.
    pub fn plan<I, S>(entries: &[LearningMaterial], missed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Borrow<SubConcept>,
    {
        let missed: BTreeSet<SubConcept> = missed.into_iter().map(|s| s.borrow().clone()).collect();
        if missed.is_empty() {
            return Self::NothingToReview;
        }

        let materials = select_materials(entries, &missed);
        let uncovered: Vec<SubConcept> = missed
            .into_iter()
            .filter(|label| !materials.iter().any(|m| m.concept() == label))
            .collect();

        if materials.is_empty() {
            Self::ContentPending { missing: uncovered }
        } else {
            Self::Study {
                materials,
                uncovered,
            }
        }
    }

    /// Plan against a topic in the catalog. A topic without content acts as an empty catalog.
    pub fn for_topic<I, S>(catalog: &MaterialCatalog, topic: Topic, missed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Borrow<SubConcept>,
    {
        Self::plan(catalog.materials(topic).unwrap_or_default(), missed)
    }

    #[must_use]
    pub fn materials(&self) -> &[LearningMaterial] {
        match self {
            Self::Study { materials, .. } => materials,
            _ => &[],
        }
    }

    /// Missed concepts with no authored content.
    #[must_use]
    pub fn uncovered(&self) -> &[SubConcept] {
        match self {
            Self::NothingToReview => &[],
            Self::ContentPending { missing } => missing,
            Self::Study { uncovered, .. } => uncovered,
        }
    }

    #[must_use]
    pub fn has_materials(&self) -> bool {
        !self.materials().is_empty()
    }
}
