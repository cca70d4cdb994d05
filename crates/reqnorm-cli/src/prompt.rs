//! Terminal implementation of the interactive resolver.

use std::io::{self, BufRead, Write};

use indicatif::ProgressBar;
use tracing::debug;

use reqnorm_map::{
    ColumnRequest, ColumnResolution, InteractiveResolver, ResolutionReason, SheetRequest,
    SheetResolution,
};
use reqnorm_model::CanonicalField;

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    Index(usize),
    Name(String),
    Skip,
    Cancel,
    Default,
}

fn parse_answer(line: &str) -> Answer {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => Answer::Default,
        "s" | "skip" => Answer::Skip,
        "c" | "cancel" | "q" | "quit" => Answer::Cancel,
        _ => match trimmed.parse::<usize>() {
            Ok(index) => Answer::Index(index),
            Err(_) => Answer::Name(trimmed.to_string()),
        },
    }
}

fn describe(reason: &ResolutionReason) -> String {
    match reason {
        ResolutionReason::NoMatch => "no known synonym matches".to_string(),
        ResolutionReason::Ambiguous(fields) => {
            let names: Vec<_> = fields.iter().map(CanonicalField::label).collect();
            format!("matches several fields ({})", names.join(", "))
        }
        ResolutionReason::ConflictWith { field, claimed_by } => {
            format!("'{field}' is already taken by column '{claimed_by}'")
        }
        ResolutionReason::AnswerRejected(field) => {
            format!("'{field}' is already taken, choose another field")
        }
    }
}

/// Asks on a terminal (or any reader/writer pair). End of input cancels.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
    progress: Option<ProgressBar>,
}

impl TerminalResolver<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            progress: None,
        }
    }

    /// Hide `bar` while a question is on screen.
    pub fn set_progress(&mut self, bar: Option<ProgressBar>) {
        self.progress = bar;
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(error) => {
                debug!(%error, "failed to read answer");
                None
            }
        }
    }

    fn suspended<T>(&mut self, ask: impl FnOnce(&mut Self) -> io::Result<T>) -> io::Result<T> {
        match self.progress.clone() {
            Some(bar) => bar.suspend(|| ask(self)),
            None => ask(self),
        }
    }

    fn ask_column(&mut self, request: &ColumnRequest<'_>) -> io::Result<ColumnResolution> {
        let free = request.free_fields();
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Column '{}' in {}: {}",
            request.label,
            request.document.display(),
            describe(&request.reason)
        )?;
        for (idx, field) in free.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {}", idx + 1, field)?;
        }
        if let Some(suggestion) = request.suggestion {
            writeln!(self.output, "  closest match: {suggestion}")?;
        }
        loop {
            match request.suggestion {
                Some(suggestion) => write!(
                    self.output,
                    "Number or field name, s = skip, c = cancel [Enter = {suggestion}]: "
                )?,
                None => write!(self.output, "Number or field name, s = skip, c = cancel: ")?,
            }
            self.output.flush()?;
            let Some(line) = self.read_line() else {
                return Ok(ColumnResolution::Cancel);
            };
            match parse_answer(&line) {
                Answer::Skip => return Ok(ColumnResolution::Skip),
                Answer::Cancel => return Ok(ColumnResolution::Cancel),
                Answer::Default => {
                    if let Some(suggestion) = request.suggestion {
                        return Ok(ColumnResolution::Field(suggestion));
                    }
                }
                Answer::Index(index) => {
                    if let Some(field) = index.checked_sub(1).and_then(|i| free.get(i)) {
                        return Ok(ColumnResolution::Field(*field));
                    }
                    writeln!(self.output, "  no option {index}")?;
                }
                Answer::Name(name) => match name.parse::<CanonicalField>() {
                    Ok(field) => return Ok(ColumnResolution::Field(field)),
                    Err(_) => writeln!(self.output, "  unknown field '{name}'")?,
                },
            }
        }
    }

    fn ask_sheet(&mut self, request: &SheetRequest<'_>) -> io::Result<SheetResolution> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "{} has several sheets:",
            request.document.display()
        )?;
        for (idx, sheet) in request.sheets.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {}", idx + 1, sheet)?;
        }
        loop {
            write!(self.output, "Sheet number or name, c = cancel: ")?;
            self.output.flush()?;
            let Some(line) = self.read_line() else {
                return Ok(SheetResolution::Cancel);
            };
            match parse_answer(&line) {
                Answer::Cancel => return Ok(SheetResolution::Cancel),
                Answer::Index(index) => {
                    if let Some(sheet) = index.checked_sub(1).and_then(|i| request.sheets.get(i)) {
                        return Ok(SheetResolution::Sheet(sheet.clone()));
                    }
                    writeln!(self.output, "  no option {index}")?;
                }
                Answer::Name(name) => {
                    if let Some(sheet) = request
                        .sheets
                        .iter()
                        .find(|sheet| sheet.eq_ignore_ascii_case(&name))
                    {
                        return Ok(SheetResolution::Sheet(sheet.clone()));
                    }
                    writeln!(self.output, "  unknown sheet '{name}'")?;
                }
                Answer::Default | Answer::Skip => {}
            }
        }
    }
}

impl<R: BufRead, W: Write> InteractiveResolver for TerminalResolver<R, W> {
    fn resolve_column(&mut self, request: &ColumnRequest<'_>) -> ColumnResolution {
        self.suspended(|this| this.ask_column(request))
            .unwrap_or(ColumnResolution::Cancel)
    }

    fn resolve_sheet(&mut self, request: &SheetRequest<'_>) -> SheetResolution {
        self.suspended(|this| this.ask_sheet(request))
            .unwrap_or(SheetResolution::Cancel)
    }
}
