use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use tableqa_core::decompose::{DecomposeMode, IndexLayout};
use tableqa_core::evaluate::EvaluationColumns;
use tableqa_core::synthesize::QaColumns;
use tableqa_core::table::{MissingValues, DEFAULT_NA_VALUES};
use tableqa_core::template::QuestionTemplate;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub questions: QuestionsConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Name of the entity column in labeled mini-tables. Unset means bare.
    #[serde(default)]
    pub entity_label: Option<String>,
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            entity_label: None,
            na_values: default_na_values(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}
fn default_na_values() -> Vec<String> {
    DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect()
}

impl TableConfig {
    /// The delimiter as a byte. Valid after [`load_config`].
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    pub fn missing_values(&self) -> MissingValues {
        MissingValues::new(self.na_values.iter().cloned())
    }

    pub fn decompose_mode(&self) -> DecomposeMode {
        DecomposeMode::from_entity_label(self.entity_label.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuestionsConfig {
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_qa_columns")]
    pub columns: [String; 2],
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            columns: default_qa_columns(),
        }
    }
}

fn default_template() -> String {
    "$index_label的$column_label是什么？".to_string()
}
fn default_qa_columns() -> [String; 2] {
    ["question".to_string(), "expected_answer".to_string()]
}

impl QuestionsConfig {
    pub fn qa_columns(&self) -> QaColumns {
        QaColumns::new(self.columns[0].clone(), self.columns[1].clone())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IndexConfig {
    /// When set, units are indexed under this rendered question instead
    /// of their mini-table text.
    #[serde(default)]
    pub text_template: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    #[serde(default = "default_eval_columns")]
    pub columns: [String; 4],
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            columns: default_eval_columns(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_eval_columns() -> [String; 4] {
    let d = EvaluationColumns::default();
    [d.question, d.expected_answer, d.actual_answer, d.actual_context]
}
fn default_concurrency() -> usize {
    1
}

impl EvaluationConfig {
    pub fn evaluation_columns(&self) -> EvaluationColumns {
        let [question, expected_answer, actual_answer, actual_context] = self.columns.clone();
        EvaluationColumns {
            question,
            expected_answer,
            actual_answer,
            actual_context,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    #[default]
    Memory,
    Elasticsearch,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub provider: StoreProvider,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Memory,
            url: default_url(),
            index: default_index(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            top_k: default_top_k(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}
fn default_index() -> String {
    "tableqa".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_top_k() -> usize {
    5
}

impl Config {
    /// How units are rendered for the index.
    pub fn index_layout(&self) -> Result<IndexLayout> {
        Ok(match &self.index.text_template {
            Some(t) => IndexLayout::Question(
                QuestionTemplate::parse(t).context("invalid index.text_template")?,
            ),
            None => IndexLayout::MiniTable(self.table.decompose_mode()),
        })
    }
}

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/tqa.toml";

/// Load the config named on the command line, or the default file if
/// present. Only an explicitly named file is required to exist.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path, true),
        None => load_config(Path::new(DEFAULT_CONFIG_PATH), false),
    }
}

/// Load and validate a config file.
///
/// If `path` does not exist and `required` is false, built-in defaults are
/// returned.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    if !path.exists() && !required {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate table
    let d = config.table.delimiter.as_bytes();
    if d.len() != 1 || !d[0].is_ascii() {
        bail!(
            "table.delimiter must be a single ASCII character, got {:?}",
            config.table.delimiter
        );
    }

    // Validate templates
    QuestionTemplate::parse(&config.questions.template)
        .context("invalid questions.template")?;
    config.index_layout()?;

    // Validate evaluation
    if config.evaluation.concurrency == 0 {
        bail!("evaluation.concurrency must be >= 1");
    }

    // Validate store
    if config.store.top_k == 0 {
        bail!("store.top_k must be >= 1");
    }
    if config.store.provider == StoreProvider::Elasticsearch {
        if config.store.url.trim().is_empty() {
            bail!("store.url must be set when provider is 'elasticsearch'");
        }
        if config.store.index.trim().is_empty() {
            bail!("store.index must be set when provider is 'elasticsearch'");
        }
    }

    Ok(())
}
