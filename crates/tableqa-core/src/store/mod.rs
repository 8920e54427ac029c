//! Retrieval collaborator abstraction.
//!
//! The [`FactStore`] trait is the whole contract between the core and a
//! search backend: index some units, then ask for the best units for a
//! piece of text. Any keyword or embedding backend that satisfies it can
//! be plugged into the evaluation harness.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FactUnit, IndexedFact};

/// Abstract retrieval backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`index`](FactStore::index) | Add units (with their searchable text) to the index |
/// | [`query`](FactStore::query) | Ranked units for a query, best first |
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Add or replace units. A unit with the same `(entity, attribute)`
    /// as one already indexed replaces it.
    async fn index(&self, facts: &[IndexedFact]) -> Result<()>;

    /// Up to `top_k` units ranked by relevance, best first. May be empty.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<FactUnit>>;
}

/// Ask `store` for the single best unit.
pub async fn best_match<S: FactStore + ?Sized>(store: &S, text: &str) -> Result<Option<FactUnit>> {
    Ok(store.query(text, 1).await?.into_iter().next())
}
