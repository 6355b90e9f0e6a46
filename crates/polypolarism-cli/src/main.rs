//! Polypolarism CLI

mod error;
mod render;

use std::io::IsTerminal;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use miette::Report;
use polypolarism_analyzer::check_units;
use polypolarism_syntax::Module;
use tracing_subscriber::EnvFilter;

use error::CliError;
use render::{render_json, render_text, TextOptions};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "POLYPOLARISM_LOG";

#[derive(Parser)]
#[command(name = "polypolarism")]
#[command(version)]
#[command(about = "Static schema checker for data frame functions")]
struct Cli {
    /// Unit files (*.json) or directories to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Disable colored output
    #[arg(long)]
    no_color: bool,
    /// Also show declared and inferred schemas
    #[arg(short, long)]
    verbose: bool,
    /// Number of worker threads (defaults to available parallelism)
    #[arg(short, long)]
    jobs: Option<NonZeroUsize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{:?}", Report::new(err));
            ExitCode::FAILURE
        }
    }
}

/// Check every unit named on the command line. Returns whether all
/// functions passed.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let units = load_units(&cli.paths)?;
    let jobs = cli
        .jobs
        .or_else(|| std::thread::available_parallelism().ok())
        .map_or(1, NonZeroUsize::get);
    tracing::debug!(units = units.len(), jobs, "checking units");

    let reports = check_units(&units, jobs);

    let output = match cli.format {
        Format::Text => {
            let options = TextOptions {
                color: !cli.no_color && std::io::stdout().is_terminal(),
                verbose: cli.verbose,
            };
            render_text(&reports, options)
        }
        Format::Json => {
            let mut json = render_json(&reports)?;
            json.push('\n');
            json
        }
    };
    print!("{}", output);

    Ok(reports.iter().all(|report| report.passed()))
}

fn load_units(paths: &[PathBuf]) -> Result<Vec<Module>, CliError> {
    let mut units = Vec::new();
    for path in paths {
        if path.is_dir() {
            for file in discover_unit_files(path) {
                match load_unit(&file) {
                    Ok(unit) => units.push(unit),
                    Err(err) => {
                        tracing::warn!(path = %file.display(), error = %err, "skipping unit file");
                    }
                }
            }
        } else if path.is_file() {
            units.push(load_unit(path)?);
        } else {
            return Err(CliError::PathNotFound { path: path.clone() });
        }
    }
    Ok(units)
}

/// Unit files under `dir`, recursively, in sorted order.
fn discover_unit_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    discover_recursive(dir, &mut files);
    files.sort();
    files
}

fn discover_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %dir.display(), error = %err, "cannot read directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            discover_recursive(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
}

fn load_unit(path: &Path) -> Result<Module, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut unit: Module = serde_json::from_str(&source).map_err(|source| CliError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if unit.path.is_none() {
        unit.path = Some(path.display().to_string());
    }
    Ok(unit)
}
