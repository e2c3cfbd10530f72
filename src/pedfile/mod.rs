//! Tabular pedigree files
//!
//! Four columns `ind,father,mother,sex`, an optional header line, and a
//! configurable single-character separator. Unknown parents are written as
//! the configured missing-parent value.

mod reader;
mod writer;

pub use reader::{parse_proband_list, read_proband_file, PedigreeReader};
pub use writer::PedigreeWriter;

use serde::Deserialize;

/// Layout of a pedigree file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsvFormat {
    /// Field separator
    pub separator: char,
    /// Whether the first line names the columns
    pub header: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            separator: ',',
            header: true,
        }
    }
}

impl CsvFormat {
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}
