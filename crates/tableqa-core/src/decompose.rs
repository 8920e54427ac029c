//! Cell decomposition: one [`FactUnit`] per table cell.
//!
//! Units come out attribute-major (columns in header order), entity-minor
//! (rows in file order). Indexing assigns no other ordering key, so this
//! order is part of the contract.
//!
//! Each unit can be shown as a tiny table, a [`MiniTable`], in one of two
//! shapes selected by [`DecomposeMode`]:
//!
//! ```text
//! Bare                 Labeled { entity_label: "Item" }
//! ┌────────┐           ┌───────┬────────┐
//! │ Price  │           │ Item  │ Price  │
//! ├────────┤           ├───────┼────────┤
//! │ Apple  │           │ Apple │ 10$/KG │
//! │ 10$/KG │           └───────┴────────┘
//! └────────┘
//! ```
//!
//! The mini-table (or a question template, see [`IndexLayout`]) is the
//! text a search backend matches queries against.

use serde::Serialize;

use crate::models::{FactUnit, IndexedFact};
use crate::table::Table;
use crate::template::QuestionTemplate;

/// Shape of the per-cell record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecomposeMode {
    /// Single column named after the attribute; rows are the entity and
    /// the value. Entity identity is positional.
    #[default]
    Bare,
    /// Two columns `[entity_label, attribute]` and one row
    /// `[entity, value]`. Entity identity is a named field.
    Labeled { entity_label: String },
}

impl DecomposeMode {
    /// `Labeled` when a label name is given, `Bare` otherwise.
    pub fn from_entity_label(entity_label: Option<&str>) -> Self {
        match entity_label {
            Some(label) => DecomposeMode::Labeled {
                entity_label: label.to_string(),
            },
            None => DecomposeMode::Bare,
        }
    }
}

/// A one-cell table: column names plus rows of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiniTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MiniTable {
    /// Build the record for `unit` in the given shape.
    pub fn of(unit: &FactUnit, mode: &DecomposeMode) -> Self {
        match mode {
            DecomposeMode::Bare => MiniTable {
                columns: vec![unit.attribute.clone()],
                rows: vec![vec![unit.entity.clone()], vec![unit.value.clone()]],
            },
            DecomposeMode::Labeled { entity_label } => MiniTable {
                columns: vec![entity_label.clone(), unit.attribute.clone()],
                rows: vec![vec![unit.entity.clone(), unit.value.clone()]],
            },
        }
    }

    /// Header line then data lines, fields joined by ` | `.
    pub fn to_text(&self) -> String {
        std::iter::once(&self.columns)
            .chain(self.rows.iter())
            .map(|fields| fields.join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decompose `table` into one unit per cell, attribute-major.
///
/// Pure: calling it twice on the same table yields equal sequences.
pub fn decompose(table: &Table) -> Vec<FactUnit> {
    table
        .cells()
        .map(|c| FactUnit::new(c.entity, c.attribute, c.value))
        .collect()
}

/// Decompose and render each unit as a [`MiniTable`].
pub fn decompose_mini_tables(table: &Table, mode: &DecomposeMode) -> Vec<(FactUnit, MiniTable)> {
    decompose(table)
        .into_iter()
        .map(|u| {
            let mini = MiniTable::of(&u, mode);
            (u, mini)
        })
        .collect()
}

/// What text a unit is indexed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLayout {
    /// The unit's [`MiniTable`] rendered with [`MiniTable::to_text`].
    MiniTable(DecomposeMode),
    /// A standard question for the unit, e.g. `"$index_label, $column_label"`.
    Question(QuestionTemplate),
}

impl Default for IndexLayout {
    fn default() -> Self {
        IndexLayout::MiniTable(DecomposeMode::Bare)
    }
}

impl IndexLayout {
    pub fn render(&self, unit: &FactUnit) -> String {
        match self {
            IndexLayout::MiniTable(mode) => MiniTable::of(unit, mode).to_text(),
            IndexLayout::Question(template) => template.render(&unit.entity, &unit.attribute),
        }
    }

    /// Pair every unit with its indexed text, preserving order.
    pub fn prepare(&self, units: Vec<FactUnit>) -> Vec<IndexedFact> {
        units
            .into_iter()
            .map(|unit| {
                let text = self.render(&unit);
                IndexedFact { unit, text }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fruit() -> Table {
        Table::from_rows(
            &["Item", "Price", "Color"],
            &[&["Apple", "10$/KG", "Green"], &["Grape", "5$/KG", "Purple"]],
        )
        .unwrap()
    }

    #[test]
    fn test_decompose_order_and_values() {
        let units = decompose(&fruit());
        assert_eq!(
            units,
            vec![
                FactUnit::new("Apple", "Price", "10$/KG"),
                FactUnit::new("Grape", "Price", "5$/KG"),
                FactUnit::new("Apple", "Color", "Green"),
                FactUnit::new("Grape", "Color", "Purple"),
            ]
        );
    }

    #[test]
    fn test_decompose_is_bijection_over_cells() {
        let table = Table::from_rows(
            &["Name", "A", "B", "C"],
            &[
                &["r1", "1", "", "x"],
                &["r2", "2", "NA", "y"],
                &["r3", "3", "z", ""],
            ],
        )
        .unwrap();
        let units = decompose(&table);
        assert_eq!(units.len(), 9);

        let mut seen: HashMap<(&str, &str), &str> = HashMap::new();
        for u in &units {
            let prev = seen.insert((u.entity.as_str(), u.attribute.as_str()), u.value.as_str());
            assert!(prev.is_none(), "duplicate unit for {:?}", u);
            assert_eq!(table.cell(&u.entity, &u.attribute), Some(u.value.as_str()));
        }
    }

    #[test]
    fn test_decompose_idempotent() {
        let table = fruit();
        assert_eq!(decompose(&table), decompose(&table));
    }

    #[test]
    fn test_bare_mini_table() {
        let mini = MiniTable::of(&FactUnit::new("Apple", "Price", "10$/KG"), &DecomposeMode::Bare);
        assert_eq!(mini.columns, vec!["Price"]);
        assert_eq!(mini.rows, vec![vec!["Apple"], vec!["10$/KG"]]);
        assert_eq!(mini.to_text(), "Price\nApple\n10$/KG");
    }

    #[test]
    fn test_labeled_mini_table() {
        let mode = DecomposeMode::from_entity_label(Some("Item"));
        let mini = MiniTable::of(&FactUnit::new("Grape", "Color", "Purple"), &mode);
        assert_eq!(mini.columns, vec!["Item", "Color"]);
        assert_eq!(mini.rows, vec![vec!["Grape", "Purple"]]);
        assert_eq!(mini.to_text(), "Item | Color\nGrape | Purple");
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(DecomposeMode::from_entity_label(None), DecomposeMode::Bare);
        assert_eq!(
            DecomposeMode::from_entity_label(Some("Fruit")),
            DecomposeMode::Labeled {
                entity_label: "Fruit".to_string()
            }
        );
    }

    #[test]
    fn test_labeled_example_units() {
        let pairs = decompose_mini_tables(&fruit(), &DecomposeMode::from_entity_label(Some("Item")));
        let texts: Vec<String> = pairs.iter().map(|(_, m)| m.to_text()).collect();
        assert_eq!(
            texts,
            vec![
                "Item | Price\nApple | 10$/KG",
                "Item | Price\nGrape | 5$/KG",
                "Item | Color\nApple | Green",
                "Item | Color\nGrape | Purple",
            ]
        );
    }

    #[test]
    fn test_question_layout() {
        let layout = IndexLayout::Question(QuestionTemplate::parse("$index_label, $column_label").unwrap());
        let facts = layout.prepare(decompose(&fruit()));
        assert_eq!(facts.len(), 4);
        assert_eq!(facts[0].text, "Apple, Price");
        assert_eq!(facts[3].text, "Grape, Color");
        assert_eq!(facts[3].unit.value, "Purple");
    }
}
