//! The entity × attribute grid every other stage reads from.
//!
//! A [`Table`] is built once from tokenized records (the first record is
//! the header, the first field of every record is the entity label) and is
//! immutable afterwards. Normalization is deliberately minimal:
//!
//! - fields listed in [`MissingValues`] become `""`;
//! - nothing is trimmed or coerced;
//! - a repeated header label becomes `<name>.<n>` (`Price`, `Price.1`), so
//!   attributes stay unique;
//! - a repeated entity label overwrites the earlier row's values but keeps
//!   the earlier row's position.
//!
//! # Example
//!
//! ```rust
//! use tableqa_core::table::Table;
//!
//! let table = Table::from_rows(
//!     &["Item", "Price", "Color"],
//!     &[&["Apple", "10$/KG", "Green"], &["Grape", "5$/KG", "NA"]],
//! )
//! .unwrap();
//! assert_eq!(table.cell("Grape", "Color"), Some(""));
//! assert_eq!(table.cell_count(), 4);
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::DataLoadError;

/// The NA spellings `pandas.read_csv` recognizes by default.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Set of raw field spellings treated as a missing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingValues {
    values: HashSet<String>,
}

impl MissingValues {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Only the empty field counts as missing.
    pub fn empty_only() -> Self {
        Self::new([""])
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.values.contains(field)
    }
}

impl Default for MissingValues {
    fn default() -> Self {
        Self::new(DEFAULT_NA_VALUES.iter().copied())
    }
}

/// Rename repeated header labels to `<name>.<n>`, leaving the first
/// occurrence untouched. A generated name that is itself taken moves on
/// to the next `n`.
fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let mut name = label.clone();
        let mut n = 1;
        while taken.contains(&name) {
            name = format!("{}.{}", label, n);
            n += 1;
        }
        if name != label {
            tracing::warn!(label = %label, renamed = %name, "duplicate header label renamed");
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

/// One cell visited by [`Table::cells`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef<'a> {
    pub entity: &'a str,
    pub attribute: &'a str,
    pub value: &'a str,
    /// Zero-based position in attribute-major, entity-minor order.
    pub position: usize,
}

/// Immutable grid of entities (rows) by attributes (columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    entity_header: String,
    entities: Vec<String>,
    attributes: Vec<String>,
    /// `rows[entity][attribute]`
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from numbered records.
    ///
    /// Each item is `(line, fields)`; `line` is only used in error
    /// messages. The first record is the header.
    ///
    /// # Errors
    ///
    /// - [`DataLoadError::Empty`] if there is no record at all.
    /// - [`DataLoadError::NoDataRows`] if there is only a header.
    /// - [`DataLoadError::Ragged`] if a record's field count differs from
    ///   the header's.
    pub fn from_records<I>(records: I, missing: &MissingValues) -> Result<Self, DataLoadError>
    where
        I: IntoIterator<Item = (usize, Vec<String>)>,
    {
        let mut records = records.into_iter();
        let (_, header) = records.next().ok_or(DataLoadError::Empty)?;
        if header.is_empty() {
            return Err(DataLoadError::Empty);
        }
        let width = header.len();

        let mut header = dedup_labels(header).into_iter();
        let entity_header = header.next().unwrap_or_default();
        let attributes: Vec<String> = header.collect();

        let mut entities: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (line, fields) in records {
            if fields.len() != width {
                return Err(DataLoadError::Ragged {
                    line,
                    expected: width,
                    found: fields.len(),
                });
            }
            let mut fields = fields.into_iter();
            let entity = fields.next().unwrap_or_default();
            let values: Vec<String> = fields
                .map(|f| if missing.is_missing(&f) { String::new() } else { f })
                .collect();

            match positions.get(&entity) {
                Some(&pos) => {
                    tracing::warn!(entity = %entity, line, "duplicate entity; later row overwrites earlier values");
                    rows[pos] = values;
                }
                None => {
                    positions.insert(entity.clone(), entities.len());
                    entities.push(entity);
                    rows.push(values);
                }
            }
        }

        if entities.is_empty() {
            return Err(DataLoadError::NoDataRows);
        }

        Ok(Self {
            entity_header,
            entities,
            attributes,
            rows,
        })
    }

    /// Convenience constructor for literal tables, numbering records from 1
    /// and applying the default NA list.
    pub fn from_rows(header: &[&str], rows: &[&[&str]]) -> Result<Self, DataLoadError> {
        let records = std::iter::once(header)
            .chain(rows.iter().copied())
            .enumerate()
            .map(|(i, r)| (i + 1, r.iter().map(|s| s.to_string()).collect()));
        Self::from_records(records, &MissingValues::default())
    }

    /// Header of the label column. Carried for display only.
    pub fn entity_header(&self) -> &str {
        &self.entity_header
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Value at `(entity, attribute)`.
    pub fn cell(&self, entity: &str, attribute: &str) -> Option<&str> {
        let row = self.entities.iter().position(|e| e == entity)?;
        let col = self.attributes.iter().position(|a| a == attribute)?;
        Some(self.rows[row][col].as_str())
    }

    /// Number of cells, `entities × attributes`.
    pub fn cell_count(&self) -> usize {
        self.entities.len() * self.attributes.len()
    }

    /// Visit every cell, attributes in column order on the outside and
    /// entities in row order on the inside.
    ///
    /// Decomposition and synthesis both walk this iterator, which is what
    /// keeps their outputs aligned position by position.
    pub fn cells(&self) -> impl Iterator<Item = CellRef<'_>> + '_ {
        let n_entities = self.entities.len();
        self.attributes
            .iter()
            .enumerate()
            .flat_map(move |(col, attribute)| {
                self.entities
                    .iter()
                    .enumerate()
                    .map(move |(row, entity)| CellRef {
                        entity,
                        attribute,
                        value: &self.rows[row][col],
                        position: col * n_entities + row,
                    })
            })
    }
}
