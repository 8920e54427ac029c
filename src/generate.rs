//! `tqa decompose` and `tqa generate`: offline views of a table.

use anyhow::{Context, Result};
use std::path::Path;

use tableqa_core::decompose::decompose_mini_tables;
use tableqa_core::synthesize::synthesize;

use crate::config::Config;
use crate::export;
use crate::loader;

/// Print every unit, as mini-tables or as JSON lines.
pub fn run_decompose(config: &Config, path: &Path, json: bool) -> Result<()> {
    let table = loader::load(path, &config.table)
        .with_context(|| format!("Failed to load table {}", path.display()))?;
    let units = decompose_mini_tables(&table, &config.table.decompose_mode());

    export::write_to(None, |w| {
        for (unit, mini) in &units {
            if json {
                serde_json::to_writer(&mut *w, unit)?;
                writeln!(w)?;
            } else {
                writeln!(w, "{}\n", mini.to_text())?;
            }
        }
        Ok(())
    })
}

/// Synthesize the QA table and write it as CSV.
pub fn run_generate(
    config: &Config,
    path: &Path,
    template: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let table = loader::load(path, &config.table)
        .with_context(|| format!("Failed to load table {}", path.display()))?;
    let template = template.unwrap_or(&config.questions.template);
    let qa = synthesize(&table, template, config.questions.qa_columns())?;
    tracing::info!(pairs = qa.len(), "synthesized questions");

    export::write_to(output, |w| export::write_qa_csv(w, &qa))?;
    if let Some(path) = output {
        tracing::info!(path = %path.display(), "wrote QA table");
    }
    Ok(())
}
