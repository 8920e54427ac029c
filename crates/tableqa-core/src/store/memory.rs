//! In-memory [`FactStore`] for tests and offline runs.
//!
//! Units live in a `Vec` behind `std::sync::RwLock`. Scoring is a
//! deterministic substring match, not a relevance model:
//!
//! - `+2` if the unit's entity occurs in the query,
//! - `+2` if the unit's attribute occurs in the query,
//! - `+1` per whitespace-separated query term contained in the indexed text.
//!
//! Equal scores are ordered by the length of the matched entity plus
//! attribute, so `Apple Pie` beats `Apple` for a question about `Apple Pie`.
//! Units scoring zero are not returned. Remaining ties keep index order.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{FactUnit, IndexedFact};

use super::FactStore;

/// In-memory store.
pub struct InMemoryFactStore {
    facts: RwLock<Vec<IndexedFact>>,
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self {
            facts: RwLock::new(Vec::new()),
        }
    }

    /// Number of indexed units.
    pub fn len(&self) -> usize {
        self.facts.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryFactStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `(score, specificity)`; specificity is the character length of the
/// entity and attribute matched in the query.
fn score(query: &str, terms: &[&str], fact: &IndexedFact) -> (u32, usize) {
    let mut s = 0;
    let mut specificity = 0;
    for label in [&fact.unit.entity, &fact.unit.attribute] {
        if !label.is_empty() && query.contains(label.as_str()) {
            s += 2;
            specificity += label.chars().count();
        }
    }
    let text = fact.text.to_lowercase();
    let s = s + terms.iter().filter(|t| text.contains(*t)).count() as u32;
    (s, specificity)
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    async fn index(&self, facts: &[IndexedFact]) -> Result<()> {
        let mut stored = self
            .facts
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        for fact in facts {
            match stored.iter_mut().find(|f| {
                f.unit.entity == fact.unit.entity && f.unit.attribute == fact.unit.attribute
            }) {
                Some(existing) => *existing = fact.clone(),
                None => stored.push(fact.clone()),
            }
        }
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<FactUnit>> {
        let lowered = text.to_lowercase();
        let terms: Vec<&str> = lowered.split_whitespace().collect();
        let stored = self
            .facts
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;

        let mut candidates: Vec<((u32, usize), &IndexedFact)> = stored
            .iter()
            .map(|f| (score(text, &terms, f), f))
            .filter(|((s, _), _)| *s > 0)
            .collect();
        // stable: equal scores keep index order
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.truncate(top_k);

        Ok(candidates.into_iter().map(|(_, f)| f.unit.clone()).collect())
    }
}
