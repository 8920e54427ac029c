//! `tqa query`: ask the configured store directly.

use anyhow::{bail, Result};

use tableqa_core::extract::provenance;
use tableqa_core::store::FactStore;

use crate::config::Config;
use crate::store::StoreHandle;

pub async fn run_query(config: &Config, text: &str, top_k: Option<usize>) -> Result<()> {
    let top_k = top_k.unwrap_or(config.store.top_k);
    if top_k == 0 {
        bail!("--top-k must be >= 1");
    }
    let store = StoreHandle::open(&config.store)?;
    if store.is_ephemeral() {
        tracing::warn!("store.provider is 'memory'; nothing is indexed in a fresh process");
    }

    let units = store.query(text, top_k).await?;
    if units.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, unit) in units.iter().enumerate() {
        println!("{}. {}", i + 1, unit.value);
        println!("    context: {}", provenance(unit));
        println!();
    }
    Ok(())
}
