//! Core data models that flow between decomposition, synthesis,
//! retrieval, and evaluation.

use serde::{Deserialize, Serialize};

/// The atomic retrievable record derived from one table cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactUnit {
    /// Row label.
    pub entity: String,
    /// Column label.
    pub attribute: String,
    /// Cell content after missing-value normalization.
    pub value: String,
}

impl FactUnit {
    pub fn new(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// A [`FactUnit`] paired with the text a search backend should match
/// queries against.
///
/// Built by [`IndexLayout::render`](crate::decompose::IndexLayout::render).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFact {
    pub unit: FactUnit,
    pub text: String,
}

/// A synthesized question and its ground-truth answer for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub expected_answer: String,
}

/// Outcome of asking the retrieval collaborator for the best unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalResult {
    Found(FactUnit),
    NotFound,
}

impl From<Option<FactUnit>> for RetrievalResult {
    fn from(unit: Option<FactUnit>) -> Self {
        match unit {
            Some(u) => RetrievalResult::Found(u),
            None => RetrievalResult::NotFound,
        }
    }
}

/// One row of the evaluation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub expected_answer: String,
    pub actual_answer: String,
    pub actual_context: String,
}

impl EvaluationRecord {
    /// True when the retrieved answer equals the expected one exactly.
    pub fn is_exact_match(&self) -> bool {
        self.expected_answer == self.actual_answer
    }
}
