//! Delimited-file loading.
//!
//! Reads a CSV-style file into a [`Table`]: the first record is the header
//! (its first field names the label column and is otherwise unused) and the
//! first field of every later record is the entity label. Tokenizing is done
//! by the `csv` crate; all normalization happens in
//! [`Table::from_records`].

use std::io::Read;
use std::path::Path;

use tableqa_core::error::DataLoadError;
use tableqa_core::table::{MissingValues, Table};

use crate::config::TableConfig;

/// Load the file at `path` using the delimiter and NA list from `config`.
pub fn load(path: &Path, config: &TableConfig) -> Result<Table, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|e| DataLoadError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let table = load_from_reader(file, config.delimiter_byte(), &config.missing_values())?;
    tracing::info!(
        path = %path.display(),
        entities = table.entities().len(),
        attributes = table.attributes().len(),
        "loaded table"
    );
    Ok(table)
}

/// Load a table from any reader.
pub fn load_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    missing: &MissingValues,
) -> Result<Table, DataLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records: Vec<(usize, Vec<String>)> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| DataLoadError::Malformed {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            reason: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(records.len() + 1);
        records.push((line, record.iter().map(str::to_string).collect()));
    }

    Table::from_records(records, missing)
}
