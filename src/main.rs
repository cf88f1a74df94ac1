//! dit - data inspection toolkit CLI

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dit::ddl;
use dit::diff::{parse_metric_spec, DiffEngine, KeySpec, Metric};
use dit::output::{delimiter_for_path, render_diff, render_peek, render_profile, write_output};
use dit::profile::profile;
use dit::reader::{ReadOptions, ReaderFactory};

const DEFAULT_LINES: usize = 10;

/// Inspect, profile, schema-infer and diff tabular data files
#[derive(Parser, Debug)]
#[command(name = "dit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Peek into a file
    Peek {
        file: PathBuf,

        /// Number of lines to output
        #[arg(short = 'n', long, default_value_t = DEFAULT_LINES)]
        lines: usize,

        /// Write to output file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two files with key matching
    Diff {
        /// Keys in format: left_key[=right_key], comma-separated for
        /// composite keys
        keys: String,

        left: PathBuf,
        right: PathBuf,

        /// Metrics specification: inline JSON or path to a JSON file, e.g.
        /// [{"agg": "mean", "left": "a", "right": "b"}]
        #[arg(short, long)]
        metrics: Option<String>,

        /// Show all rows, not just differences
        #[arg(short, long)]
        all: bool,

        /// Write comparison to output file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Infer a SQL schema for a file
    Infer {
        file: PathBuf,

        /// Number of lines to infer the schema from
        #[arg(short = 'n', long, default_value_t = DEFAULT_LINES)]
        lines: usize,

        /// Table name used in the create table statement
        #[arg(short, long, default_value = "default")]
        table: String,

        /// Write to output file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyse fields of a data file
    Prof {
        file: PathBuf,

        /// Write to output file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Peek { file, lines, output } => cmd_peek(&file, lines, output.as_deref()),
        Command::Diff {
            keys,
            left,
            right,
            metrics,
            all,
            output,
        } => cmd_diff(&keys, &left, &right, metrics.as_deref(), all, output.as_deref()),
        Command::Infer {
            file,
            lines,
            table,
            output,
        } => cmd_infer(&file, lines, &table, output.as_deref()),
        Command::Prof { file, output } => cmd_prof(&file, output.as_deref()),
    }
}

fn read_file(factory: &ReaderFactory, path: &std::path::Path, opts: &ReadOptions) -> Result<dit::Table> {
    factory
        .read(path, opts)
        .with_context(|| format!("failed to read {}", path.display()))
}

fn cmd_peek(file: &std::path::Path, lines: usize, output: Option<&std::path::Path>) -> Result<()> {
    log::info!("peeking at {}...", file.display());

    let factory = ReaderFactory::new();
    let table = read_file(&factory, file, &ReadOptions::with_limit(lines))?;

    let delimiter = output.and_then(delimiter_for_path);
    let text = render_peek(&table, file, delimiter);
    write_output(&text, output)?;
    Ok(())
}

fn cmd_diff(
    keys: &str,
    left: &std::path::Path,
    right: &std::path::Path,
    metrics: Option<&str>,
    all: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let key_spec = KeySpec::parse(keys)?;
    let metric_list: Vec<Metric> = match metrics {
        Some(spec) => parse_metric_spec(spec)?,
        None => Vec::new(),
    };

    // The two sources touch disjoint memory; read them in parallel and
    // join before the engine runs.
    let factory = ReaderFactory::new();
    let opts = ReadOptions::default();
    let (left_table, right_table) = rayon::join(
        || read_file(&factory, left, &opts),
        || read_file(&factory, right, &opts),
    );
    let (left_table, right_table) = (left_table?, right_table?);

    let report = DiffEngine::new(all).diff(&left_table, &right_table, &key_spec, &metric_list)?;
    log::debug!(
        "diff: {} differing rows, {} metrics",
        report.summary.differing_rows(),
        report.metrics.len()
    );

    let delimiter = output.and_then(delimiter_for_path);
    let text = render_diff(&report, left, right, delimiter);
    write_output(&text, output)?;
    Ok(())
}

fn cmd_infer(
    file: &std::path::Path,
    lines: usize,
    table_name: &str,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let lines = if lines < 1 {
        log::warn!("expected -n to be at least 1, defaulting to {DEFAULT_LINES}");
        DEFAULT_LINES
    } else {
        lines
    };

    let factory = ReaderFactory::new();
    let table = read_file(&factory, file, &ReadOptions::with_limit(lines))?;

    let mut text = ddl::create_table(&table, table_name);
    text.push('\n');
    write_output(&text, output)?;
    Ok(())
}

fn cmd_prof(file: &std::path::Path, output: Option<&std::path::Path>) -> Result<()> {
    let factory = ReaderFactory::new();
    let table = read_file(&factory, file, &ReadOptions::default())?;

    let profiles = profile(&table);
    let text = render_profile(&profiles);
    write_output(&text, output)?;
    Ok(())
}
