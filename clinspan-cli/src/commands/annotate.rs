//! Annotate command implementation

use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{DocumentRecord, JsonFormatter, JsonlFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use clinspan_engine::{Annotation, Annotator};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Arguments for the annotate command
#[derive(Debug, Args)]
pub struct AnnotateArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Annotator configuration file
    #[arg(short, long, value_name = "FILE", env = "CLINSPAN_CONFIG")]
    pub config: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Worker threads (default: one per core)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of per-file records
    Json,
    /// One compact JSON record per line
    Jsonl,
    /// Human-readable listing
    Text,
}

impl AnnotateArgs {
    /// Execute the annotate command
    pub fn execute(&self) -> Result<()> {
        super::init_logging(self.verbose, self.quiet);

        log::info!("Starting annotation");
        log::debug!("Arguments: {:?}", self);

        let annotator = Annotator::from_config_file(&self.config)
            .map_err(|e| CliError::ConfigError(e.to_string()))
            .with_context(|| format!("Failed to load annotator from {}", self.config.display()))?;
        let files = resolve_patterns(&self.input)?;

        let results = match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .context("Failed to build thread pool")?;
                pool.install(|| self.annotate_files(&annotator, &files))
            }
            None => self.annotate_files(&annotator, &files),
        };

        let mut formatter = self.formatter()?;
        let mut failed = 0usize;
        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(annotation) => formatter.format_document(&DocumentRecord {
                    file: path.display().to_string(),
                    annotation,
                })?,
                Err(e) => {
                    failed += 1;
                    log::warn!("Skipping {}: {e:#}", path.display());
                    if !self.quiet {
                        eprintln!("Skipping {}: {e:#}", path.display());
                    }
                }
            }
        }
        formatter.finish()?;

        log::info!("Annotated {} of {} file(s)", files.len() - failed, files.len());
        if failed == files.len() {
            return Err(CliError::AllInputsFailed(failed).into());
        }
        Ok(())
    }

    /// Read and annotate every file in parallel, keeping input order
    fn annotate_files(&self, annotator: &Annotator, files: &[PathBuf]) -> Vec<Result<Annotation>> {
        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        let results = files
            .par_iter()
            .map(|path| {
                let result = annotate_file(annotator, path);
                progress.file_completed(&path.display().to_string());
                result
            })
            .collect();

        progress.finish();
        results
    }

    fn formatter(&self) -> Result<Box<dyn OutputFormatter>> {
        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?,
            )),
            None => Box::new(io::stdout()),
        };

        Ok(match self.format {
            OutputFormat::Json => Box::new(JsonFormatter::new(writer)),
            OutputFormat::Jsonl => Box::new(JsonlFormatter::new(writer)),
            OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        })
    }
}

fn annotate_file(annotator: &Annotator, path: &Path) -> Result<Annotation> {
    let text = FileReader::read_text(path)?;
    annotator
        .annotate(&text)
        .with_context(|| format!("Failed to annotate: {}", path.display()))
}
