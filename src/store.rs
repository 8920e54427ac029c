//! Store selection from configuration.

use anyhow::Result;
use async_trait::async_trait;

use tableqa_core::models::{FactUnit, IndexedFact};
use tableqa_core::store::memory::InMemoryFactStore;
use tableqa_core::store::FactStore;

use crate::config::{StoreConfig, StoreProvider};
use crate::elastic::ElasticsearchStore;

/// The configured retrieval backend.
pub enum StoreHandle {
    Memory(InMemoryFactStore),
    Elasticsearch(ElasticsearchStore),
}

impl StoreHandle {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(match config.provider {
            StoreProvider::Memory => StoreHandle::Memory(InMemoryFactStore::new()),
            StoreProvider::Elasticsearch => {
                StoreHandle::Elasticsearch(ElasticsearchStore::new(config)?)
            }
        })
    }

    /// True when the index only lives as long as this process.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, StoreHandle::Memory(_))
    }

    /// Drop all indexed units.
    pub async fn recreate(&self) -> Result<()> {
        match self {
            StoreHandle::Memory(_) => Ok(()),
            StoreHandle::Elasticsearch(es) => es.recreate().await,
        }
    }
}

#[async_trait]
impl FactStore for StoreHandle {
    async fn index(&self, facts: &[IndexedFact]) -> Result<()> {
        match self {
            StoreHandle::Memory(s) => s.index(facts).await,
            StoreHandle::Elasticsearch(s) => s.index(facts).await,
        }
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<FactUnit>> {
        match self {
            StoreHandle::Memory(s) => s.query(text, top_k).await,
            StoreHandle::Elasticsearch(s) => s.query(text, top_k).await,
        }
    }
}
