//! # tableqa
//!
//! Retrieval evaluation over tabular data.
//!
//! A table is split into one fact unit per cell, the units are indexed in a
//! search backend, and one templated question per cell is asked back. The
//! answer of the best hit is compared against the cell it was generated
//! from, which measures how well the backend retrieves single facts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌────────────┐
//! │ CSV file │──▶│ Table        │──▶│ Decompose  │──▶ FactStore::index
//! └──────────┘   │ (normalized) │   └────────────┘
//!                └──────┬───────┘
//!                       ▼
//!                ┌──────────────┐   ┌────────────┐   ┌──────────────┐
//!                │ Synthesize   │──▶│ Evaluate   │──▶│ CSV / JSON   │
//!                │ (templates)  │   │ (top-1)    │   │ report       │
//!                └──────────────┘   └────────────┘   └──────────────┘
//! ```
//!
//! The pure pipeline lives in `tableqa-core`; this crate adds file
//! loading, configuration, the Elasticsearch backend, and the `tqa` CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`loader`] | Delimited-file loading |
//! | [`elastic`] | Elasticsearch backend |
//! | [`store`] | Backend selection |
//! | [`ingest`] | Decompose and index a table |
//! | [`search`] | Direct queries |
//! | [`generate`] | Decompose and question-table output |
//! | [`eval`] | Evaluation runs |
//! | [`export`] | CSV and JSON writers |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod elastic;
pub mod eval;
pub mod export;
pub mod generate;
pub mod ingest;
pub mod loader;
pub mod logging;
pub mod search;
pub mod store;
