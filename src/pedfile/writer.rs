//! Writing genealogies back to pedigree files

use super::CsvFormat;
use crate::graph::{Genealogy, PedigreeError, PedigreeResult, RECORD_COLUMNS};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes a genealogy as a pedigree file, one row per individual in
/// identifier order
#[derive(Debug, Clone, Default)]
pub struct PedigreeWriter {
    format: CsvFormat,
}

impl PedigreeWriter {
    pub fn new(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Write to a new file at `path`; an existing file is never replaced
    ///
    /// Nothing is created when a field would not read back as written.
    pub fn write_path(&self, genealogy: &Genealogy, path: impl AsRef<Path>) -> PedigreeResult<()> {
        let path = path.as_ref();
        self.check(genealogy)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => PedigreeError::OutputExists(path.to_path_buf()),
                _ => PedigreeError::io(path, e),
            })?;

        let mut out = BufWriter::new(file);
        self.write(genealogy, &mut out)
            .and_then(|_| out.flush())
            .map_err(|e| PedigreeError::io(path, e))?;

        info!("Wrote {} records to {}", genealogy.len(), path.display());
        Ok(())
    }

    /// Refuse records with a field containing the separator
    ///
    /// `line` in the error is the line the record would have occupied.
    pub fn check(&self, genealogy: &Genealogy) -> PedigreeResult<()> {
        let first = if self.format.header { 2 } else { 1 };
        for (n, record) in genealogy.iter().enumerate() {
            if let Some(field) = record.fields().into_iter().find(|f| f.contains(self.format.separator)) {
                return Err(PedigreeError::MalformedRecord {
                    line: first + n,
                    reason: format!(
                        "field {:?} of ind={} contains the separator {:?}",
                        field, record.ind, self.format.separator
                    ),
                });
            }
        }
        Ok(())
    }

    /// Write to any sink
    pub fn write<W: Write>(&self, genealogy: &Genealogy, out: &mut W) -> io::Result<()> {
        let sep = self.format.separator.to_string();
        if self.format.header {
            writeln!(out, "{}", RECORD_COLUMNS.join(sep.as_str()))?;
        }
        for record in genealogy {
            writeln!(out, "{}", record.fields().join(sep.as_str()))?;
        }
        Ok(())
    }
}
