//! # tableqa core
//!
//! Pure logic for question answering over small tables: the table model,
//! mini-table decomposition, standardized question synthesis, answer
//! extraction, and the evaluation harness, plus the [`store::FactStore`]
//! trait that retrieval backends implement.
//!
//! This crate performs no filesystem or network I/O and depends on no
//! async runtime. Loading files and talking to a search backend live in
//! the `tableqa` application crate.
//!
//! ```text
//! records ──▶ Table ──┬──▶ decompose ──▶ FactUnit ──▶ FactStore::index
//!                     │
//!                     └──▶ synthesize ──▶ QaPair ──▶ evaluate ──▶ EvaluationRecord
//!                                                      │   ▲
//!                                        FactStore::query   extract
//! ```

pub mod decompose;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod models;
pub mod store;
pub mod synthesize;
pub mod table;
pub mod template;
