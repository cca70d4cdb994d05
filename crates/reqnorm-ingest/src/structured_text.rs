//! Keyword-block reader for text extracted from structured requirement PDFs.
//!
//! A block opens at a line starting with `ID :` and closes at
//! `Compliance Comment :`. Extraction sometimes drops the leading `C`, so
//! `ompliance Comment :` anywhere in a line also closes the block. Lines
//! without a keyword continue the definition (after `Object Type :`) or the
//! justification (after `Justification & Comments :`); elsewhere they are
//! dropped.

use std::path::Path;

use tracing::debug;

use crate::document::{RawDocument, RawRow, SheetData};
use crate::error::{IngestError, Result};

const BLOCK_START: &str = "ID :";
const BLOCK_END: &str = "Compliance Comment :";
const BLOCK_END_TRUNCATED: &str = "ompliance Comment :";

/// Column labels emitted, in order.
pub const STRUCTURED_COLUMNS: [&str; 9] = [
    "ID",
    "Object Type",
    "Definition",
    "Source",
    "Verification Method",
    "Compliance",
    "Subsystem Allocation",
    "Justification & Comments",
    "Compliance Comment",
];

/// `(keyword prefix, column)`. `Definition` has no keyword.
const KEYWORDS: [(&str, &str); 8] = [
    ("ID :", "ID"),
    ("Object Type :", "Object Type"),
    ("Source :", "Source"),
    ("Verification Method :", "Verification Method"),
    ("Compliance :", "Compliance"),
    ("Subsystem Allocation :", "Subsystem Allocation"),
    ("Justification & Comments :", "Justification & Comments"),
    ("Compliance Comment :", "Compliance Comment"),
];

fn collapse(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn keyword_value(line: &str) -> Option<(&'static str, &str)> {
    for (keyword, column) in KEYWORDS {
        if let Some(rest) = line.strip_prefix(keyword) {
            return Some((column, rest.trim()));
        }
    }
    line.find(BLOCK_END_TRUNCATED)
        .map(|pos| ("Compliance Comment", line[pos + BLOCK_END_TRUNCATED.len()..].trim()))
}

fn continuation_target(column: &str) -> Option<&'static str> {
    match column {
        "Object Type" => Some("Definition"),
        "Justification & Comments" => Some("Justification & Comments"),
        _ => None,
    }
}

fn group_blocks(lines: &[String]) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    for line in lines {
        if line.starts_with(BLOCK_START) {
            current = Some(vec![line.as_str()]);
        } else if let Some(block) = current.as_mut() {
            block.push(line.as_str());
            if line.starts_with(BLOCK_END) || line.contains(BLOCK_END_TRUNCATED) {
                blocks.extend(current.take());
            }
        }
    }
    blocks
}

fn parse_block(block: &[&str]) -> RawRow {
    let mut row: RawRow = STRUCTURED_COLUMNS
        .iter()
        .map(|column| (column.to_string(), String::new()))
        .collect();
    let mut continuing: Option<&'static str> = None;
    for line in block {
        match keyword_value(line) {
            Some((column, value)) => {
                row.insert(column.to_string(), value.to_string());
                continuing = continuation_target(column);
            }
            None => {
                if let Some(target) = continuing
                    && let Some(value) = row.get_mut(target)
                {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(line);
                }
            }
        }
    }
    row
}

/// Reader for `.req.txt` keyword-block documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredTextReader;

impl StructuredTextReader {
    pub fn read(&self, path: &Path) -> Result<RawDocument> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::file_read(path, e))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .unwrap_or("requirements")
            .to_string();
        let sheet = self.parse_text(&String::from_utf8_lossy(&bytes), &name);
        debug!(path = %path.display(), blocks = sheet.rows.len(), "parsed structured text");
        Ok(RawDocument {
            path: path.to_path_buf(),
            sheets: vec![sheet],
        })
    }

    pub fn parse_text(&self, text: &str, name: &str) -> SheetData {
        let lines: Vec<String> = text
            .trim_start_matches('\u{feff}')
            .lines()
            .map(collapse)
            .filter(|line| !line.is_empty())
            .collect();
        let mut sheet = SheetData::new(
            name,
            STRUCTURED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        sheet.rows = group_blocks(&lines)
            .iter()
            .map(|block| parse_block(block))
            .collect();
        sheet
    }
}
