//! `tqa eval`: run the evaluation harness against the configured store.
//!
//! With `concurrency > 1` questions are dispatched on a [`JoinSet`] bounded
//! by a [`Semaphore`]; rows are re-sorted by question position afterwards,
//! so the output is identical to a sequential run.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use tableqa_core::evaluate::{absorb_miss, evaluate_pairs, record_for, EvaluationSummary};
use tableqa_core::models::{EvaluationRecord, QaPair};
use tableqa_core::store::{best_match, FactStore};
use tableqa_core::synthesize::synthesize_pairs;
use tableqa_core::template::QuestionTemplate;

use crate::config::Config;
use crate::export::{self, EvalFormat, EvaluationReport};
use crate::ingest::index_table;
use crate::loader;
use crate::store::StoreHandle;

/// Command-line overrides for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub template: Option<String>,
    pub output: Option<PathBuf>,
    pub format: EvalFormat,
    pub concurrency: Option<usize>,
    pub reindex: bool,
}

/// Evaluate `pairs` against `store` with at most `concurrency` queries in
/// flight. Output order follows `pairs`.
pub async fn evaluate_concurrent<S>(
    store: Arc<S>,
    pairs: Vec<QaPair>,
    concurrency: usize,
) -> Result<Vec<EvaluationRecord>>
where
    S: FactStore + 'static,
{
    if concurrency <= 1 {
        let store = store.as_ref();
        return Ok(evaluate_pairs(pairs, |q| async move { best_match(store, &q).await }).await);
    }

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();
    for (position, pair) in pairs.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            let outcome = best_match(store.as_ref(), &pair.question).await;
            drop(permit);
            let result = absorb_miss(&pair.question, outcome);
            (position, record_for(pair, &result))
        });
    }

    let mut rows = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        rows.push(joined.context("evaluation task panicked")?);
    }
    rows.sort_by_key(|(position, _)| *position);
    Ok(rows.into_iter().map(|(_, record)| record).collect())
}

pub async fn run_eval(config: &Config, path: &Path, opts: EvalOptions) -> Result<()> {
    let table = loader::load(path, &config.table)
        .with_context(|| format!("Failed to load table {}", path.display()))?;
    let template_src = opts
        .template
        .unwrap_or_else(|| config.questions.template.clone());
    let template = QuestionTemplate::parse(&template_src)?;
    let concurrency = opts.concurrency.unwrap_or(config.evaluation.concurrency).max(1);

    let store = Arc::new(StoreHandle::open(&config.store)?);
    if store.is_ephemeral() || opts.reindex {
        if opts.reindex {
            store.recreate().await?;
        }
        let count = index_table(store.as_ref(), &table, &config.index_layout()?).await?;
        tracing::info!(units = count, "indexed table before evaluation");
    }

    let pairs = synthesize_pairs(&table, &template);
    tracing::info!(questions = pairs.len(), concurrency, "evaluating");
    let records = evaluate_concurrent(store, pairs, concurrency).await?;

    let summary = EvaluationSummary::from_records(&records);
    tracing::info!(
        total = summary.total,
        retrieved = summary.retrieved,
        exact_matches = summary.exact_matches,
        accuracy = %format!("{:.3}", summary.accuracy),
        "evaluation finished"
    );

    let columns = config.evaluation.evaluation_columns();
    match opts.format {
        EvalFormat::Csv => export::write_to(opts.output.as_deref(), |w| {
            export::write_evaluation_csv(w, &columns, &records)
        })?,
        EvalFormat::Json => {
            let report = EvaluationReport::new(path, &template_src, records);
            export::write_to(opts.output.as_deref(), |w| export::write_json(w, &report))?
        }
    }
    if let Some(out) = &opts.output {
        tracing::info!(path = %out.display(), "wrote evaluation results");
    }
    Ok(())
}
