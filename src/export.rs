//! Writers for QA tables and evaluation results.
//!
//! Tables are written as CSV with the configured column labels as the
//! header row; evaluation runs can also be written as a JSON report.
//! Every writer targets either a file (parent directories are created) or
//! stdout for piping.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use tableqa_core::evaluate::{EvaluationColumns, EvaluationSummary};
use tableqa_core::models::EvaluationRecord;
use tableqa_core::synthesize::QaTable;

/// Output format of `tqa eval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EvalFormat {
    Csv,
    Json,
}

/// A complete evaluation run as written by `--format json`.
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub template: String,
    pub summary: EvaluationSummary,
    pub records: Vec<EvaluationRecord>,
}

impl EvaluationReport {
    pub fn new(source: &Path, template: &str, records: Vec<EvaluationRecord>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            source: source.display().to_string(),
            template: template.to_string(),
            summary: EvaluationSummary::from_records(&records),
            records,
        }
    }
}

/// Run `write` against `output` (a file) or stdout.
pub fn write_to<F>(output: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

pub fn write_qa_csv(w: &mut dyn Write, qa: &QaTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record([qa.columns.question.as_str(), qa.columns.answer.as_str()])?;
    for pair in &qa.pairs {
        wtr.write_record([pair.question.as_str(), pair.expected_answer.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_evaluation_csv(
    w: &mut dyn Write,
    columns: &EvaluationColumns,
    records: &[EvaluationRecord],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(columns.as_array())?;
    for r in records {
        wtr.write_record([
            r.question.as_str(),
            r.expected_answer.as_str(),
            r.actual_answer.as_str(),
            r.actual_context.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(w: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}
