//! Answer and provenance extraction from a retrieval result.
//!
//! Both functions are total. A miss yields `""` so the evaluation loop
//! can always produce a row.

use crate::models::{FactUnit, RetrievalResult};

/// The unit's value, or `""` on a miss.
pub fn answer_of(result: &RetrievalResult) -> String {
    match result {
        RetrievalResult::Found(unit) => unit.value.clone(),
        RetrievalResult::NotFound => String::new(),
    }
}

/// `"(entity, attribute)"` for the unit, or `""` on a miss.
pub fn context_of(result: &RetrievalResult) -> String {
    match result {
        RetrievalResult::Found(unit) => provenance(unit),
        RetrievalResult::NotFound => String::new(),
    }
}

/// Format the `(entity, attribute)` pair a unit came from.
pub fn provenance(unit: &FactUnit) -> String {
    format!("({}, {})", unit.entity, unit.attribute)
}
