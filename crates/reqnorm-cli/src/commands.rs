use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, info_span, warn};

use reqnorm_core::{BatchOptions, DocumentOutcome, ProcessingContext, StandardizationPipeline};
use reqnorm_ingest::list_documents;
use reqnorm_map::{InteractiveResolver, MappingCache, ScriptedResolver};
use reqnorm_output::{
    OutputFormat, WriteOptions, output_path_for, write_records, write_template,
};
use reqnorm_standards::SchemaCatalog;

use crate::cli::{BatchArgs, FormatArg, ProcessArgs, TemplateArgs};
use crate::summary::{DocumentLine, apply_table_style, header_cell, print_summary};
use reqnorm_cli::config::Settings;
use reqnorm_cli::prompt::TerminalResolver;

/// How a command ended, as reported through the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failed => 1,
            RunStatus::Cancelled => 130,
        }
    }
}

fn output_format(format: FormatArg) -> OutputFormat {
    match format {
        FormatArg::Csv => OutputFormat::Csv,
        FormatArg::Json => OutputFormat::Json,
    }
}

fn open_pipeline(settings: &Settings) -> Result<StandardizationPipeline> {
    let catalog = settings.catalog()?;
    let context = ProcessingContext::new(catalog).with_normalization(settings.normalization());
    let cache = MappingCache::open(&settings.cache_path);
    info!(path = %settings.cache_path.display(), entries = cache.len(), "mapping cache opened");
    Ok(StandardizationPipeline::new(context, cache))
}

fn resolver(non_interactive: bool, progress: Option<&ProgressBar>) -> Box<dyn InteractiveResolver> {
    if non_interactive {
        Box::new(ScriptedResolver::non_interactive())
    } else {
        let mut terminal = TerminalResolver::stdio();
        terminal.set_progress(progress.cloned());
        Box::new(terminal)
    }
}

pub fn run_process(settings: &Settings, args: &ProcessArgs) -> Result<RunStatus> {
    let span = info_span!("process", file = %args.file.display());
    let _guard = span.enter();
    let format = output_format(args.format);
    let options = settings.write_options(format)?;
    let mut pipeline = open_pipeline(settings)?;
    let cache_warning = pipeline.cache_warning();
    let mut resolver = resolver(args.non_interactive, None);

    let result = pipeline.process_document(&args.file, resolver.as_mut());
    let mut output = None;
    let status = match &result {
        Ok(report) => {
            let path = args.output.clone().unwrap_or_else(|| {
                output_path_for(&settings.output_dir, &args.file, format.extension())
            });
            write_records(&path, &report.records, &options)
                .with_context(|| format!("write {}", path.display()))?;
            output = Some(path);
            RunStatus::Success
        }
        Err(error) if error.is_cancellation() => {
            warn!(%error, "processing cancelled");
            RunStatus::Cancelled
        }
        Err(error) => {
            error!(%error, "document failed");
            RunStatus::Failed
        }
    };

    let line = DocumentLine {
        path: &args.file,
        result: result.as_ref(),
        output: output.as_ref(),
    };
    print_summary(std::slice::from_ref(&line), cache_warning.as_slice());
    Ok(status)
}

fn progress_bar(len: usize, non_interactive: bool) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    if non_interactive {
        bar.enable_steady_tick(Duration::from_millis(120));
    }
    bar
}

pub fn run_batch(settings: &Settings, args: &BatchArgs) -> Result<RunStatus> {
    let span = info_span!("batch", dir = %args.dir.display());
    let _guard = span.enter();
    let format = output_format(args.format);
    let options = settings.write_options(format)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.output_dir.clone());

    let paths = list_documents(&args.dir, args.filter)
        .with_context(|| format!("list documents in {}", args.dir.display()))?;
    if paths.is_empty() {
        println!("No {} documents in {}", args.filter, args.dir.display());
        return Ok(RunStatus::Success);
    }
    info!(documents = paths.len(), filter = %args.filter, "batch started");

    let mut pipeline = open_pipeline(settings)?;
    let cache_warning = pipeline.cache_warning();
    let bar = progress_bar(paths.len(), args.non_interactive);
    let mut resolver = resolver(args.non_interactive, Some(&bar));

    let mut outputs: Vec<Option<PathBuf>> = Vec::with_capacity(paths.len());
    let mut write_failures = 0usize;
    let result = pipeline.process_batch_with(
        &paths,
        resolver.as_mut(),
        BatchOptions {
            read_threads: args.read_threads.max(1),
        },
        |outcome: &DocumentOutcome| {
            bar.inc(1);
            bar.set_message(display(&outcome.path));
            let written = outcome.report().and_then(|report| {
                let path = output_path_for(&output_dir, &outcome.path, format.extension());
                match write_records(&path, &report.records, &options) {
                    Ok(()) => Some(path),
                    Err(error) => {
                        error!(path = %path.display(), %error, "failed to write output");
                        write_failures += 1;
                        None
                    }
                }
            });
            outputs.push(written);
        },
    );
    bar.finish_and_clear();

    if let Some(combined) = &args.combined {
        let records: Vec<_> = result.records().cloned().collect();
        write_records(combined, &records, &options)
            .with_context(|| format!("write {}", combined.display()))?;
        println!("Combined output: {} ({} records)", combined.display(), records.len());
    }

    let lines: Vec<DocumentLine<'_>> = result
        .outcomes
        .iter()
        .zip(&outputs)
        .map(|(outcome, output)| DocumentLine {
            path: &outcome.path,
            result: outcome.result.as_ref(),
            output: output.as_ref(),
        })
        .collect();
    print_summary(&lines, cache_warning.as_slice());

    let status = if result.has_failures() || write_failures > 0 {
        RunStatus::Failed
    } else {
        RunStatus::Success
    };
    Ok(status)
}

pub fn run_clear_cache(settings: &Settings) -> Result<RunStatus> {
    let mut cache = MappingCache::open(&settings.cache_path);
    let entries = cache.len();
    cache
        .clear()
        .with_context(|| format!("clear {}", settings.cache_path.display()))?;
    println!(
        "Cleared {entries} cached decision(s) at {}",
        settings.cache_path.display()
    );
    Ok(RunStatus::Success)
}

pub fn run_template(settings: &Settings, args: &TemplateArgs) -> Result<RunStatus> {
    let options: WriteOptions = settings.write_options(output_format(args.format))?;
    write_template(&args.output, &options)
        .with_context(|| format!("write template {}", args.output.display()))?;
    println!("Template written to {}", args.output.display());
    Ok(RunStatus::Success)
}

pub fn run_fields(settings: &Settings) -> Result<RunStatus> {
    let catalog: SchemaCatalog = settings.catalog()?;
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Field"), header_cell("Synonyms")]);
    apply_table_style(&mut table);
    for (idx, definition) in catalog.fields().iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            definition.field.label().to_string(),
            definition.synonyms().join(", "),
        ]);
    }
    println!("{table}");
    println!(
        "Loose matching: {}",
        if catalog.loose_matching() { "on" } else { "off" }
    );
    Ok(RunStatus::Success)
}

fn display(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
