use std::path::{Path, PathBuf};

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use reqnorm_core::{DocumentError, DocumentReport};
use reqnorm_model::{ProcessingWarning, WarningKind};

/// One line of the run summary.
pub struct DocumentLine<'a> {
    pub path: &'a Path,
    pub result: Result<&'a DocumentReport, &'a DocumentError>,
    pub output: Option<&'a PathBuf>,
}

pub fn print_summary(lines: &[DocumentLine<'_>], extra_warnings: &[ProcessingWarning]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Sheet"),
        header_cell("Records"),
        header_cell("Cached"),
        header_cell("Auto"),
        header_cell("Asked"),
        header_cell("Skipped"),
        header_cell("Warnings"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_records = 0usize;
    let mut total_warnings = 0usize;
    for line in lines {
        let name = display_name(line.path);
        match line.result {
            Ok(report) => {
                total_records += report.records.len();
                total_warnings += report.warnings.len();
                table.add_row(vec![
                    Cell::new(name).fg(Color::Blue).add_attribute(Attribute::Bold),
                    Cell::new(&report.sheet),
                    Cell::new(report.records.len()),
                    count_cell(report.stats.from_cache, Color::Green),
                    count_cell(report.stats.automatic, Color::Green),
                    count_cell(report.stats.interactive, Color::Cyan),
                    count_cell(report.stats.skipped, Color::DarkGrey),
                    count_cell(report.warnings.len(), Color::Yellow),
                    output_cell(line.output),
                ]);
            }
            Err(error) => {
                let status = if error.is_cancellation() {
                    Cell::new("cancelled").fg(Color::Yellow)
                } else {
                    Cell::new(error.to_string()).fg(Color::Red)
                };
                table.add_row(vec![
                    Cell::new(name).fg(Color::Red).add_attribute(Attribute::Bold),
                    status,
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    if lines.len() > 1 {
        table.add_row(vec![
            Cell::new("TOTAL").fg(Color::Cyan).add_attribute(Attribute::Bold),
            dim_cell("-"),
            Cell::new(total_records).add_attribute(Attribute::Bold),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            count_cell(total_warnings, Color::Yellow).add_attribute(Attribute::Bold),
            dim_cell("-"),
        ]);
    }
    println!("{table}");

    let warnings: Vec<&ProcessingWarning> = extra_warnings
        .iter()
        .chain(
            lines
                .iter()
                .filter_map(|line| line.result.ok())
                .flat_map(|report| report.warnings.iter()),
        )
        .collect();
    print_warning_table(&warnings);
}

fn print_warning_table(warnings: &[&ProcessingWarning]) {
    if warnings.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Message"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
    align_column(&mut table, 1, CellAlignment::Right);
    for warning in warnings {
        table.add_row(vec![
            Cell::new(display_name(&warning.document)),
            warning
                .row
                .map_or_else(|| dim_cell("-"), Cell::new),
            warning
                .column
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            kind_cell(warning.kind),
            Cell::new(&warning.message),
        ]);
    }
    println!();
    println!("Warnings:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn kind_cell(kind: WarningKind) -> Cell {
    let color = match kind {
        WarningKind::UnrecognizedCompliance | WarningKind::MalformedText => Color::Yellow,
        WarningKind::MappingConflict => Color::Magenta,
        WarningKind::StaleCache | WarningKind::CacheUnreadable | WarningKind::CacheUnwritable => Color::DarkGrey,
    };
    Cell::new(kind.as_str()).fg(color)
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(path) => Cell::new(path.display()).fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
