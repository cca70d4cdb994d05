//! Output writers for standardized requirement records.

pub mod common;
pub mod error;
pub mod format;
pub mod template;
pub mod writer;

pub use common::{OUTPUT_SUFFIX, ensure_parent_dir, output_path_for, write_atomic};
pub use error::{OutputError, Result};
pub use format::{DEFAULT_DELIMITER, OutputFormat, WriteOptions};
pub use template::{sample_record, write_template};
pub use writer::{render, render_csv, render_json, write_records};
