//! Table ingestion: load, decompose, and index.
//!
//! ```text
//! file.csv ──▶ loader::load ──▶ decompose ──▶ IndexLayout::prepare ──▶ FactStore::index
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use tableqa_core::decompose::{decompose, IndexLayout};
use tableqa_core::store::FactStore;
use tableqa_core::table::Table;

use crate::config::Config;
use crate::loader;
use crate::store::StoreHandle;

/// Decompose `table` and index every unit. Returns the unit count.
pub async fn index_table<S: FactStore + ?Sized>(
    store: &S,
    table: &Table,
    layout: &IndexLayout,
) -> Result<usize> {
    let facts = layout.prepare(decompose(table));
    tracing::debug!(units = facts.len(), "decomposed table");
    store.index(&facts).await?;
    Ok(facts.len())
}

/// `tqa index <csv>`
pub async fn run_index(config: &Config, path: &Path, recreate: bool) -> Result<()> {
    let table = loader::load(path, &config.table)
        .with_context(|| format!("Failed to load table {}", path.display()))?;
    let store = StoreHandle::open(&config.store)?;
    if store.is_ephemeral() {
        tracing::warn!("store.provider is 'memory'; the index is discarded when tqa exits");
    }
    if recreate {
        store.recreate().await?;
    }

    let count = index_table(&store, &table, &config.index_layout()?).await?;

    println!("Index {}", path.display());
    println!("  entities:     {}", table.entities().len());
    println!("  attributes:   {}", table.attributes().len());
    println!("  indexed units: {}", count);
    println!("ok");
    Ok(())
}
