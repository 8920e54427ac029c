//! Evaluation harness.
//!
//! For every synthesized question the harness asks the retrieval
//! collaborator for the single best unit, extracts the answer and its
//! provenance, and records them next to the expected answer.
//!
//! The loop never aborts on a retrieval: an empty result or an error from
//! the collaborator becomes a row with empty actual answer and context.
//! The output therefore always has exactly one row per table cell, in
//! synthesizer order. There are no retries and no timeouts; both are the
//! collaborator's business.

use std::future::Future;

use anyhow::Result;
use serde::Serialize;

use crate::error::TemplateError;
use crate::extract::{answer_of, context_of};
use crate::models::{EvaluationRecord, FactUnit, QaPair, RetrievalResult};
use crate::store::{best_match, FactStore};
use crate::synthesize::synthesize_pairs;
use crate::table::Table;
use crate::template::QuestionTemplate;

/// Column labels of the evaluation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationColumns {
    pub question: String,
    pub expected_answer: String,
    pub actual_answer: String,
    pub actual_context: String,
}

impl EvaluationColumns {
    pub fn as_array(&self) -> [&str; 4] {
        [
            &self.question,
            &self.expected_answer,
            &self.actual_answer,
            &self.actual_context,
        ]
    }
}

impl Default for EvaluationColumns {
    fn default() -> Self {
        Self {
            question: "question".to_string(),
            expected_answer: "expected_answer".to_string(),
            actual_answer: "actual_answer".to_string(),
            actual_context: "actual_context".to_string(),
        }
    }
}

/// Build the evaluation row for `pair` from what retrieval returned.
pub fn record_for(pair: QaPair, result: &RetrievalResult) -> EvaluationRecord {
    EvaluationRecord {
        question: pair.question,
        expected_answer: pair.expected_answer,
        actual_answer: answer_of(result),
        actual_context: context_of(result),
    }
}

/// Collapse a collaborator outcome into a [`RetrievalResult`], logging
/// failures instead of propagating them.
pub fn absorb_miss(question: &str, outcome: Result<Option<FactUnit>>) -> RetrievalResult {
    match outcome {
        Ok(unit) => RetrievalResult::from(unit),
        Err(e) => {
            tracing::warn!(question, error = %e, "retrieval failed; recording empty answer");
            RetrievalResult::NotFound
        }
    }
}

/// Evaluate every pair in order with `retrieve`.
pub async fn evaluate_pairs<F, Fut>(pairs: Vec<QaPair>, mut retrieve: F) -> Vec<EvaluationRecord>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<FactUnit>>>,
{
    let mut records = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let outcome = retrieve(pair.question.clone()).await;
        let result = absorb_miss(&pair.question, outcome);
        let record = record_for(pair, &result);
        tracing::debug!(
            question = %record.question,
            expected = %record.expected_answer,
            actual = %record.actual_answer,
            context = %record.actual_context,
            "evaluation row"
        );
        records.push(record);
    }
    records
}

/// Synthesize questions from `table` with `template` and evaluate them.
///
/// `retrieve` receives each question and returns the best matching unit,
/// if any.
///
/// # Errors
///
/// Only [`TemplateError`]; retrieval problems never fail the run.
pub async fn evaluate<F, Fut>(
    table: &Table,
    template: &str,
    retrieve: F,
) -> Result<Vec<EvaluationRecord>, TemplateError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<FactUnit>>>,
{
    let template = QuestionTemplate::parse(template)?;
    Ok(evaluate_pairs(synthesize_pairs(table, &template), retrieve).await)
}

/// [`evaluate`] with a [`FactStore`] as the collaborator (top-1 query).
pub async fn evaluate_with_store<S: FactStore + ?Sized>(
    store: &S,
    table: &Table,
    template: &QuestionTemplate,
) -> Vec<EvaluationRecord> {
    evaluate_pairs(synthesize_pairs(table, template), |q| async move {
        best_match(store, &q).await
    })
    .await
}

/// Aggregate scores over an evaluation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    /// Rows, one per cell.
    pub total: usize,
    /// Rows where retrieval returned a unit.
    pub retrieved: usize,
    /// Rows whose actual answer equals the expected answer.
    pub exact_matches: usize,
    /// `exact_matches / total`, `0.0` for an empty table.
    pub accuracy: f64,
}

impl EvaluationSummary {
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let total = records.len();
        let retrieved = records
            .iter()
            .filter(|r| !r.actual_context.is_empty())
            .count();
        let exact_matches = records.iter().filter(|r| r.is_exact_match()).count();
        let accuracy = if total == 0 {
            0.0
        } else {
            exact_matches as f64 / total as f64
        };
        Self {
            total,
            retrieved,
            exact_matches,
            accuracy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::{decompose, DecomposeMode, IndexLayout};
    use crate::store::memory::InMemoryFactStore;
    use anyhow::anyhow;

    const TEMPLATE: &str = "$index_label的$column_label是什么？";

    fn fruit() -> Table {
        Table::from_rows(
            &["Item", "Price", "Color"],
            &[&["Apple", "10$/KG", "Green"], &["Grape", "5$/KG", "Purple"]],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_all_misses_still_produce_every_row() {
        let records = evaluate(&fruit(), TEMPLATE, |_q| async { Ok(None) })
            .await
            .unwrap();
        assert_eq!(records.len(), 4);
        let expected: Vec<&str> = records.iter().map(|r| r.expected_answer.as_str()).collect();
        assert_eq!(expected, vec!["10$/KG", "5$/KG", "Green", "Purple"]);
        for r in &records {
            assert_eq!(r.actual_answer, "");
            assert_eq!(r.actual_context, "");
        }
        assert_eq!(records[0].question, "Apple的Price是什么？");
    }

    #[tokio::test]
    async fn test_errors_are_absorbed() {
        let mut calls = 0;
        let records = evaluate(&fruit(), TEMPLATE, |_q| {
            calls += 1;
            let n = calls;
            async move {
                if n % 2 == 0 {
                    Err(anyhow!("backend unavailable"))
                } else {
                    Ok(Some(FactUnit::new("Apple", "Price", "10$/KG")))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(calls, 4);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].actual_context, "(Apple, Price)");
        assert_eq!(records[1].actual_answer, "");
        assert_eq!(records[2].actual_answer, "10$/KG");
        assert_eq!(records[3].actual_context, "");
    }

    #[tokio::test]
    async fn test_template_error_before_any_retrieval() {
        let mut calls = 0;
        let err = evaluate(&fruit(), "$what", |_q| {
            calls += 1;
            async { Ok(None) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownPlaceholder { .. }));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_round_trip_through_memory_store() {
        let table = fruit();
        let store = InMemoryFactStore::new();
        let facts = IndexLayout::MiniTable(DecomposeMode::from_entity_label(Some("Item")))
            .prepare(decompose(&table));
        store.index(&facts).await.unwrap();

        let template = QuestionTemplate::parse(TEMPLATE).unwrap();
        let records = evaluate_with_store(&store, &table, &template).await;
        let summary = EvaluationSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.retrieved, 4);
        assert_eq!(summary.exact_matches, 4);
        assert!((summary.accuracy - 1.0).abs() < 1e-9);
        assert_eq!(records[3].actual_context, "(Grape, Color)");
    }

    #[tokio::test]
    async fn test_empty_store_evaluates_to_misses() {
        let store = InMemoryFactStore::new();
        let template = QuestionTemplate::parse(TEMPLATE).unwrap();
        let records = evaluate_with_store(&store, &fruit(), &template).await;
        let summary = EvaluationSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.retrieved, 0);
        assert_eq!(summary.exact_matches, 0);
    }

    #[test]
    fn test_summary_counts_empty_expected_as_match_on_miss() {
        let records = vec![
            EvaluationRecord {
                question: "q1".into(),
                expected_answer: "".into(),
                actual_answer: "".into(),
                actual_context: "".into(),
            },
            EvaluationRecord {
                question: "q2".into(),
                expected_answer: "x".into(),
                actual_answer: "y".into(),
                actual_context: "(a, b)".into(),
            },
        ];
        let s = EvaluationSummary::from_records(&records);
        assert_eq!(s.total, 2);
        assert_eq!(s.retrieved, 1);
        assert_eq!(s.exact_matches, 1);
        assert!((s.accuracy - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        let s = EvaluationSummary::from_records(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.accuracy, 0.0);
    }

    #[test]
    fn test_column_labels() {
        assert_eq!(
            EvaluationColumns::default().as_array(),
            ["question", "expected_answer", "actual_answer", "actual_context"]
        );
    }
}
