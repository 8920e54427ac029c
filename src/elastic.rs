//! Elasticsearch-backed [`FactStore`].
//!
//! Talks to the REST API with `reqwest`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | index | `POST {url}/_bulk?refresh=true` (NDJSON) |
//! | query | `POST {url}/{index}/_search` with a `match` on `content` |
//! | recreate | `DELETE {url}/{index}` |
//!
//! Each unit is stored as `{content, entity, attribute, value}` under an id
//! derived from `(entity, attribute)`, so indexing the same table twice
//! overwrites rather than duplicates.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::time::Duration;

use tableqa_core::models::{FactUnit, IndexedFact};
use tableqa_core::store::FactStore;

use crate::config::StoreConfig;

pub struct ElasticsearchStore {
    client: reqwest::Client,
    url: String,
    index: String,
    username: Option<String>,
    password: Option<String>,
    max_retries: u32,
}

impl ElasticsearchStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Drop the index. A missing index is not an error.
    pub async fn recreate(&self) -> Result<()> {
        let url = format!("{}/{}", self.url, self.index);
        let resp = self
            .send(|| self.client.delete(&url), &[404])
            .await?;
        tracing::info!(index = %self.index, status = %resp.status(), "dropped index");
        Ok(())
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => req.basic_auth(user, self.password.as_deref()),
            None => req,
        }
    }

    /// Send a request built by `build`, retrying transient failures.
    ///
    /// Statuses in `accept` are returned like successes.
    async fn send<F>(&self, build: F, accept: &[u16]) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            match self.authorize(build()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() || accept.contains(&status.as_u16()) {
                        return Ok(response);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        tracing::warn!(attempt, %status, "elasticsearch request failed; retrying");
                        last_err = Some(anyhow!("Elasticsearch error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Elasticsearch error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(anyhow!(
                        "Elasticsearch connection error (is it running at {}?): {}",
                        self.url,
                        e
                    ));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Elasticsearch request failed after retries")))
    }
}

#[async_trait]
impl FactStore for ElasticsearchStore {
    async fn index(&self, facts: &[IndexedFact]) -> Result<()> {
        if facts.is_empty() {
            return Ok(());
        }
        let body = bulk_body(&self.index, facts)?;
        let url = format!("{}/_bulk?refresh=true", self.url);
        let resp = self
            .send(
                || {
                    self.client
                        .post(&url)
                        .header("Content-Type", "application/x-ndjson")
                        .body(body.clone())
                },
                &[],
            )
            .await?;

        let json: Value = resp.json().await?;
        if let Some(reason) = first_bulk_error(&json) {
            bail!("Elasticsearch bulk indexing failed: {}", reason);
        }
        tracing::info!(index = %self.index, units = facts.len(), "indexed units");
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<FactUnit>> {
        let url = format!("{}/{}/_search", self.url, self.index);
        let body = json!({
            "size": top_k,
            "query": { "match": { "content": text } },
        });
        let resp = self
            .send(|| self.client.post(&url).json(&body), &[])
            .await?;
        let json: Value = resp.json().await?;
        parse_hits(&json)
    }
}

/// Stable document id for a unit: hex SHA-256 of `entity \x1f attribute`.
pub fn document_id(unit: &FactUnit) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unit.entity.as_bytes());
    hasher.update([0x1fu8]);
    hasher.update(unit.attribute.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build the NDJSON body of a `_bulk` request.
pub fn bulk_body(index: &str, facts: &[IndexedFact]) -> Result<String> {
    let mut body = String::new();
    for fact in facts {
        let action = json!({ "index": { "_index": index, "_id": document_id(&fact.unit) } });
        let source = json!({
            "content": fact.text,
            "entity": fact.unit.entity,
            "attribute": fact.unit.attribute,
            "value": fact.unit.value,
        });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&source)?);
        body.push('\n');
    }
    Ok(body)
}

/// Reason of the first failed item in a `_bulk` response, if any.
pub fn first_bulk_error(json: &Value) -> Option<String> {
    if !json.get("errors").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    let items = json.get("items").and_then(Value::as_array)?;
    let reason = items
        .iter()
        .filter_map(|item| item.as_object()?.values().next())
        .find_map(|op| op.get("error"))
        .map(|err| {
            err.get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string())
        })
        .unwrap_or_else(|| "unknown error".to_string());
    Some(reason)
}

/// Turn `hits.hits[]._source` into units, best first.
///
/// Hits without string `entity`, `attribute`, and `value` fields are
/// skipped.
pub fn parse_hits(json: &Value) -> Result<Vec<FactUnit>> {
    let hits = json
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Invalid Elasticsearch response: missing hits array"))?;

    let mut units = Vec::with_capacity(hits.len());
    for hit in hits {
        let source = hit.get("_source");
        let field = |name: &str| {
            source
                .and_then(|s| s.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        match (field("entity"), field("attribute"), field("value")) {
            (Some(entity), Some(attribute), Some(value)) => units.push(FactUnit {
                entity,
                attribute,
                value,
            }),
            _ => {
                let id = hit.get("_id").and_then(Value::as_str).unwrap_or("?");
                tracing::warn!(id, "skipping search hit that is not a fact unit");
            }
        }
    }
    Ok(units)
}
