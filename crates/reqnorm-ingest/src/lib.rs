//! Raw document reading for requirement normalization.
//!
//! Readers turn a file into [`RawDocument`] sheets of labeled cells; nothing
//! here interprets what the labels mean.

pub mod csv_table;
pub mod discovery;
pub mod document;
pub mod error;
pub mod reader;
pub mod structured_text;

pub use csv_table::{CsvReader, sniff_delimiter};
pub use discovery::{DocumentFilter, list_documents};
pub use document::{RawDocument, RawRow, SheetData, disambiguate_labels};
pub use error::{IngestError, Result};
pub use reader::{AutoReader, DocumentKind, DocumentReader, FormatReader};
pub use structured_text::{STRUCTURED_COLUMNS, StructuredTextReader};
