//! Reading pedigree and proband files

use super::CsvFormat;
use crate::graph::{PedigreeError, PedigreeResult, PersonId, RawRow, RECORD_COLUMNS};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

const BOM: char = '\u{feff}';

/// Reads raw rows from a pedigree file
///
/// With a header the four required columns are located by name, in any
/// order; without one the first four fields are taken positionally. Rows
/// come back in canonical column order and are decoded later by
/// `Record::from_row`.
#[derive(Debug, Clone, Default)]
pub struct PedigreeReader {
    format: CsvFormat,
}

impl PedigreeReader {
    pub fn new(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Read every row of the file at `path`
    pub fn read_path(&self, path: impl AsRef<Path>) -> PedigreeResult<Vec<RawRow>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PedigreeError::io(path, e))?;
        let rows = self.read(BufReader::new(file))?;
        info!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Read every row from `reader`
    pub fn read<R: BufRead>(&self, reader: R) -> PedigreeResult<Vec<RawRow>> {
        let mut lines = reader.lines().enumerate();
        let mut positions: Vec<usize> = (0..RECORD_COLUMNS.len()).collect();

        if self.format.header {
            let header = match lines.next() {
                Some((_, line)) => line.map_err(|e| PedigreeError::io("<input>", e))?,
                None => String::new(),
            };
            positions = self.locate_columns(&header)?;
            debug!("Column positions from header: {:?}", positions);
        }

        let mut rows = Vec::new();
        for (index, line) in lines {
            let line = line.map_err(|e| PedigreeError::io("<input>", e))?;
            let mut line = line.trim();
            if index == 0 {
                line = line.trim_start_matches(BOM).trim_start();
            }
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(self.format.separator).collect();
            // Stop at the first missing column so decoding reports a short row.
            let canonical: Vec<String> = positions
                .iter()
                .map_while(|&p| fields.get(p).map(|f| f.to_string()))
                .collect();

            rows.push(RawRow::new(index + 1, canonical));
        }

        Ok(rows)
    }

    fn locate_columns(&self, header: &str) -> PedigreeResult<Vec<usize>> {
        let names: Vec<&str> = header
            .trim_start_matches(BOM)
            .trim()
            .split(self.format.separator)
            .map(str::trim)
            .collect();

        let mut positions = Vec::with_capacity(RECORD_COLUMNS.len());
        let mut missing = Vec::new();
        for column in RECORD_COLUMNS {
            match names.iter().position(|n| *n == column) {
                Some(p) => positions.push(p),
                None => missing.push(column.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(PedigreeError::MissingColumns { missing });
        }
        Ok(positions)
    }
}

/// Split a comma-separated list of identifiers, ignoring blanks
pub fn parse_proband_list(list: &str) -> Vec<PersonId> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PersonId::from)
        .collect()
}

/// Read identifiers from a file with one identifier per line and no header
pub fn read_proband_file(path: impl AsRef<Path>) -> PedigreeResult<Vec<PersonId>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PedigreeError::io(path, e))?;

    let mut ids = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| PedigreeError::io(path, e))?;
        let line = line.trim();
        if !line.is_empty() {
            ids.push(PersonId::from(line));
        }
    }
    Ok(ids)
}
