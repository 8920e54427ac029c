//! Standardized question/answer synthesis.
//!
//! For every cell, in the same attribute-major order as
//! [`decompose`](crate::decompose::decompose), the template is rendered
//! with the cell's entity and attribute to form the question, and the
//! cell's value becomes the expected answer.
//!
//! # Answer coercion
//!
//! Cells are kept as their source text, so the expected answer is the
//! field exactly as it appeared in the file after missing-value
//! normalization. `10` stays `10` and `10.50` stays `10.50`; nothing is
//! re-formatted. Exact-match scoring in
//! [`EvaluationSummary`](crate::evaluate::EvaluationSummary) compares
//! these strings byte for byte.

use serde::Serialize;

use crate::error::TemplateError;
use crate::models::QaPair;
use crate::table::Table;
use crate::template::QuestionTemplate;

/// Column labels of a QA table. Cosmetic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaColumns {
    pub question: String,
    pub answer: String,
}

impl QaColumns {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

impl Default for QaColumns {
    fn default() -> Self {
        Self::new("question", "expected_answer")
    }
}

/// Synthesized pairs under caller-supplied column labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaTable {
    pub columns: QaColumns,
    pub pairs: Vec<QaPair>,
}

impl QaTable {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Parse `template` and synthesize one pair per cell.
///
/// # Errors
///
/// [`TemplateError`] if the template is invalid. Nothing is produced in
/// that case.
pub fn synthesize(
    table: &Table,
    template: &str,
    columns: QaColumns,
) -> Result<QaTable, TemplateError> {
    let template = QuestionTemplate::parse(template)?;
    Ok(QaTable {
        columns,
        pairs: synthesize_pairs(table, &template),
    })
}

/// Synthesize with an already-parsed template.
pub fn synthesize_pairs(table: &Table, template: &QuestionTemplate) -> Vec<QaPair> {
    table
        .cells()
        .map(|c| QaPair {
            question: template.render(c.entity, c.attribute),
            expected_answer: c.value.to_string(),
        })
        .collect()
}
