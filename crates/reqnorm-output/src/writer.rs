//! Serializers for standardized records.
//!
//! Delimited output never quotes: the delimiter, quotes and backslashes inside
//! a value are escaped with a backslash instead, and line breaks are written
//! as `\n` / `\r`, so every record stays on one line and the column count
//! never varies.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use reqnorm_model::{CanonicalField, RequirementRecord};

use crate::common::write_atomic;
use crate::error::Result;
use crate::format::{OutputFormat, WriteOptions};

const ESCAPE: char = '\\';

fn escape_value(value: &str, delimiter: u8) -> String {
    let delimiter = char::from(delimiter);
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => {
                if ch == delimiter || matches!(ch, '"' | ESCAPE) {
                    out.push(ESCAPE);
                }
                out.push(ch);
            }
        }
    }
    out
}

/// Header plus one line per record, in the given order.
pub fn render_csv(records: &[RequirementRecord], delimiter: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Never)
            .from_writer(&mut buf);
        writer.write_record(CanonicalField::ALL.iter().map(|field| field.label()))?;
        for record in records {
            writer.write_record(
                record
                    .values()
                    .iter()
                    .map(|value| escape_value(value, delimiter)),
            )?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buf)
}

/// Pretty JSON array of objects keyed by canonical label, in field order.
pub fn render_json(records: &[RequirementRecord]) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(records)?;
    buf.push(b'\n');
    Ok(buf)
}

pub fn render(records: &[RequirementRecord], options: &WriteOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Csv => render_csv(records, options.delimiter),
        OutputFormat::Json => render_json(records),
    }
}

/// Replace `path` with the rendered records.
pub fn write_records(path: &Path, records: &[RequirementRecord], options: &WriteOptions) -> Result<()> {
    let bytes = render(records, options)?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), records = records.len(), format = %options.format, "records written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_instead_of_quoting() {
        assert_eq!(escape_value(r#"a;b "c" \d"#, b';'), r#"a\;b \"c\" \\d"#);
        assert_eq!(escape_value("a,b", b';'), "a,b");
    }

    #[test]
    fn line_breaks_stay_on_one_line() {
        let escaped = escape_value("first\r\nsecond", b';');
        assert_eq!(escaped, r"first\r\nsecond");
        assert!(!escaped.contains(['\n', '\r']));
    }
}
