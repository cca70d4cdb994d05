//! Delimited-text reader with delimiter sniffing and header detection.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::document::{RawDocument, RawRow, SheetData, disambiguate_labels};
use crate::error::{IngestError, Result};

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
/// Lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 20;
/// Rows inspected when looking for the header.
const HEADER_PROBE_ROWS: usize = 10;

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Count of `delimiter` outside double quotes.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Pick the delimiter that splits the most sample lines into the same
/// non-zero number of fields. Defaults to `,`.
pub fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let mut best = (b',', 0usize, 0usize);
    for delimiter in DELIMITERS {
        let mut counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, delimiter))
            .filter(|count| *count > 0)
            .collect();
        if counts.is_empty() {
            continue;
        }
        counts.sort_unstable();
        // Most frequent count; ties prefer the larger count.
        let mut mode = (0usize, 0usize);
        let mut idx = 0;
        while idx < counts.len() {
            let value = counts[idx];
            let run = counts[idx..].iter().take_while(|c| **c == value).count();
            if run >= mode.1 {
                mode = (value, run);
            }
            idx += run;
        }
        let (width, support) = mode;
        if (support, width) > (best.2, best.1) {
            best = (delimiter, width, support);
        }
    }
    best.0
}

#[derive(Debug, Default, Clone, Copy)]
struct RowStats {
    width: usize,
    non_empty: usize,
    numeric: usize,
    alpha: usize,
}

impl RowStats {
    fn ratio(count: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    fn non_empty_ratio(self) -> f64 {
        Self::ratio(self.non_empty, self.width)
    }

    fn numeric_ratio(self) -> f64 {
        Self::ratio(self.numeric, self.non_empty)
    }

    fn alpha_ratio(self) -> f64 {
        Self::ratio(self.alpha, self.non_empty)
    }
}

/// Stats of `row` against the widest row of the probe, so a lone title
/// cell above a wide table does not look like a header.
fn row_stats(row: &[String], width: usize) -> RowStats {
    let mut stats = RowStats {
        width: width.max(row.len()),
        ..RowStats::default()
    };
    for cell in row {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            continue;
        }
        stats.non_empty += 1;
        if trimmed.parse::<f64>().is_ok() {
            stats.numeric += 1;
        }
        if trimmed.chars().any(char::is_alphabetic) {
            stats.alpha += 1;
        }
    }
    stats
}

fn is_header_like(stats: RowStats) -> bool {
    stats.non_empty >= 1
        && stats.non_empty_ratio() >= 0.5
        && stats.alpha_ratio() >= 0.5
        && stats.numeric_ratio() <= 0.1
}

fn detect_header_row(rows: &[Vec<String>]) -> usize {
    let probe = &rows[..rows.len().min(HEADER_PROBE_ROWS)];
    let width = probe.iter().map(Vec::len).max().unwrap_or(0);
    probe
        .iter()
        .position(|row| is_header_like(row_stats(row, width)))
        .unwrap_or(0)
}

/// Reader for `.csv`, `.tsv` and delimited `.txt` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReader {
    /// Fixed delimiter; sniffed when `None`.
    pub delimiter: Option<u8>,
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    pub fn read(&self, path: &Path) -> Result<RawDocument> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::file_read(path, e))?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("data")
            .to_string();
        let sheet = self.parse_bytes(&bytes, &name, path)?;
        Ok(RawDocument {
            path: path.to_path_buf(),
            sheets: vec![sheet],
        })
    }

    /// Parse delimited bytes into one sheet. Malformed UTF-8 is decoded
    /// lossily so the normalizer can flag it per cell.
    pub fn parse_bytes(&self, bytes: &[u8], name: &str, origin: &Path) -> Result<SheetData> {
        let decoded = String::from_utf8_lossy(bytes);
        let text = decoded.trim_start_matches('\u{feff}');
        let delimiter = self.delimiter.unwrap_or_else(|| sniff_delimiter(text));
        debug!(path = %origin.display(), delimiter = %(delimiter as char).escape_default(), "reading delimited text");

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());
        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| IngestError::CsvParse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
            let row: Vec<String> = record.iter().map(normalize_cell).collect();
            if row.iter().all(|value| value.is_empty()) {
                continue;
            }
            raw_rows.push(row);
        }
        if raw_rows.is_empty() {
            return Ok(SheetData::new(name, Vec::new()));
        }

        let header_index = detect_header_row(&raw_rows);
        let mut labels: Vec<String> = raw_rows[header_index]
            .iter()
            .map(|value| normalize_header(value))
            .collect();
        while labels.last().is_some_and(String::is_empty) {
            labels.pop();
        }
        let columns = disambiguate_labels(labels);

        let mut sheet = SheetData::new(name, columns);
        for record in raw_rows.iter().skip(header_index + 1) {
            let row: RawRow = sheet
                .columns
                .iter()
                .enumerate()
                .map(|(idx, label)| (label.clone(), record.get(idx).cloned().unwrap_or_default()))
                .collect();
            if row.values().all(String::is_empty) {
                continue;
            }
            sheet.rows.push(row);
        }
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn sniffs_semicolons() {
        let text = "Req ID;Desc;Compliance\nR-1;Log events, always;C\nR-2;\"a;b\";NC\n";
        assert_eq!(sniff_delimiter(text), b';');
    }

    #[test]
    fn sniffs_tabs_and_defaults_to_comma() {
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("single column\nvalue\n"), b',');
    }

    #[test]
    fn skips_title_row_above_header() {
        let table = rows(&[
            &["System Requirements Export"],
            &["Req ID", "Title", "Compliance"],
            &["R-1", "Logging", "C"],
        ]);
        assert_eq!(detect_header_row(&table), 1);
    }

    #[test]
    fn first_row_is_header_by_default() {
        let table = rows(&[&["ID", "Definition"], &["1", "Shall boot"]]);
        assert_eq!(detect_header_row(&table), 0);
    }
}
