//! Content shipped with the application.

use crate::Error;
use crate::model::{
    Difficulty, LearningMaterial, MaterialContent, Question, QuestionDraft, QuestionId,
    SubConcept, Topic,
};

use super::{MaterialCatalog, QuestionBank};

fn question(
    id: u32,
    prompt: &str,
    options: [&str; 4],
    correct: usize,
    concept: &str,
    difficulty: Difficulty,
    explanation: &str,
) -> Result<Question, Error> {
    Ok(QuestionDraft {
        id: QuestionId::new(id),
        prompt: prompt.to_owned(),
        options: options.iter().map(|o| (*o).to_owned()).collect(),
        correct,
        concept: concept.to_owned(),
        difficulty,
        explanation: explanation.to_owned(),
    }
    .validate()?)
}

fn material(
    concept: &str,
    title: &str,
    overview: &str,
    key_points: &[&str],
    deep_dive: &str,
    examples: &[&str],
) -> Result<LearningMaterial, Error> {
    Ok(LearningMaterial::new(
        SubConcept::new(concept)?,
        title,
        MaterialContent {
            overview: overview.to_owned(),
            key_points: key_points.iter().map(|p| (*p).to_owned()).collect(),
            deep_dive: deep_dive.to_owned(),
            examples: examples.iter().map(|e| (*e).to_owned()).collect(),
        },
    ))
}

impl QuestionBank {
    /// American Revolution question bank.
    ///
    /// # Errors
    ///
    /// Returns `Error` if any bundled question fails validation.
    #[allow(clippy::too_many_lines)]
    pub fn builtin() -> Result<Self, Error> {
        let mut bank = Self::new();

        bank.insert(
            Topic::Causes,
            vec![
                question(
                    1,
                    "Which act imposed a tax on paper goods and legal documents in the American colonies?",
                    ["Sugar Act", "Stamp Act", "Tea Act", "Intolerable Acts"],
                    1,
                    "taxation",
                    Difficulty::Easy,
                    "The Stamp Act of 1765 required colonists to pay a tax on printed materials, which was one of the first direct taxes imposed by Britain.",
                )?,
                question(
                    2,
                    "What was the colonial response to \"taxation without representation\"?",
                    [
                        "Immediate acceptance",
                        "Peaceful negotiations only",
                        "Boycotts and protests",
                        "Military action",
                    ],
                    2,
                    "colonial_response",
                    Difficulty::Medium,
                    "Colonists organized boycotts of British goods and held protests, believing they should not be taxed without having representation in Parliament.",
                )?,
                question(
                    3,
                    "Which philosopher's ideas about natural rights heavily influenced American revolutionary thought?",
                    ["Thomas Hobbes", "John Locke", "Voltaire", "Montesquieu"],
                    1,
                    "enlightenment",
                    Difficulty::Hard,
                    "John Locke's ideas about life, liberty, and property as natural rights were fundamental to American revolutionary ideology.",
                )?,
            ],
        );

        bank.insert(
            Topic::Events,
            vec![question(
                1,
                "Where did the first shots of the American Revolution take place?",
                ["Lexington and Concord", "Boston", "Philadelphia", "New York"],
                0,
                "battles",
                Difficulty::Easy,
                "The battles of Lexington and Concord on April 19, 1775, marked the beginning of armed conflict in the American Revolution.",
            )?],
        );

        bank.insert(
            Topic::Figures,
            vec![question(
                1,
                "Who was the primary author of the Declaration of Independence?",
                [
                    "John Adams",
                    "Benjamin Franklin",
                    "Thomas Jefferson",
                    "George Washington",
                ],
                2,
                "founding_fathers",
                Difficulty::Easy,
                "Thomas Jefferson was chosen by the Continental Congress to draft the Declaration of Independence in 1776.",
            )?],
        );

        bank.insert(
            Topic::Documents,
            vec![question(
                1,
                "In what year was the Declaration of Independence signed?",
                ["1775", "1776", "1777", "1778"],
                1,
                "founding_documents",
                Difficulty::Easy,
                "The Declaration of Independence was approved by the Continental Congress on July 4, 1776.",
            )?],
        );

        Ok(bank)
    }
}

impl MaterialCatalog {
    /// Authored remediation content. Only the causes topic has entries so far.
    ///
    /// # Errors
    ///
    /// Returns `Error` if a bundled entry has an invalid label or duplicates another.
    pub fn builtin() -> Result<Self, Error> {
        let mut catalog = Self::new();

        catalog.insert(
            Topic::Causes,
            material(
                "taxation",
                "British Taxation Policies",
                "After the French and Indian War (1754-1763), Britain faced massive debt and decided to tax the American colonies to help pay for it. This marked a significant shift in British colonial policy.",
                &[
                    "The Sugar Act (1764) - First attempt at direct taxation",
                    "The Stamp Act (1765) - Tax on printed materials",
                    "The Tea Act (1773) - Led to the Boston Tea Party",
                    "The Intolerable Acts (1774) - Punishment for Boston Tea Party",
                ],
                "The colonists opposed these taxes not just because of the financial burden, but because they had no representation in Parliament. The phrase \"taxation without representation\" became a rallying cry for colonial resistance.",
                &[
                    "Stamp Act required tax stamps on newspapers, legal documents, and playing cards",
                    "Tea Act gave British East India Company monopoly on tea sales in colonies",
                    "Colonists responded with boycotts, protests, and the formation of groups like Sons of Liberty",
                ],
            )?,
        )?;

        catalog.insert(
            Topic::Causes,
            material(
                "colonial_response",
                "Colonial Resistance and Response",
                "Colonists developed various forms of resistance to British policies, from peaceful protests to organized boycotts and eventually armed resistance.",
                &[
                    "Non-importation agreements and boycotts",
                    "Formation of resistance groups like Sons of Liberty",
                    "Committees of Correspondence for communication",
                    "Continental Congresses for unified colonial action",
                ],
                "Colonial resistance evolved from individual complaints to organized, coordinated efforts across all thirteen colonies. This unity was crucial for the eventual success of the revolution.",
                &[
                    "Boston Tea Party (1773) - Direct action against Tea Act",
                    "First Continental Congress (1774) - Coordinated colonial response",
                    "Boycotts reduced British imports by 40% in some years",
                ],
            )?,
        )?;

        catalog.insert(
            Topic::Causes,
            material(
                "enlightenment",
                "Enlightenment Ideas and Natural Rights",
                "Enlightenment philosophers provided the intellectual foundation for American revolutionary thought, particularly concepts of natural rights and government by consent.",
                &[
                    "John Locke's theory of natural rights (life, liberty, property)",
                    "Social contract theory - government derives power from consent",
                    "Separation of powers (Montesquieu)",
                    "Popular sovereignty - power belongs to the people",
                ],
                "These ideas fundamentally challenged the divine right of kings and absolute monarchy, providing colonists with philosophical justification for resistance and eventually independence.",
                &[
                    "Declaration of Independence echoes Locke's natural rights theory",
                    "Colonial assemblies practiced self-governance based on consent",
                    "Pamphlets like \"Common Sense\" spread Enlightenment ideas to common people",
                ],
            )?,
        )?;

        Ok(catalog)
    }
}
