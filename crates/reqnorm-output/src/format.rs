use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OutputError;

/// Default field delimiter for delimited output.
pub const DEFAULT_DELIMITER: char = ';';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Options shared by every writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub format: OutputFormat,
    pub delimiter: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            delimiter: DEFAULT_DELIMITER as u8,
        }
    }
}

impl WriteOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Sets the CSV delimiter. Only single-byte ASCII delimiters are allowed.
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self, OutputError> {
        if !delimiter.is_ascii() || delimiter == '\\' || delimiter == '\n' {
            return Err(OutputError::InvalidDelimiter(delimiter));
        }
        self.delimiter = delimiter as u8;
        Ok(self)
    }
}
