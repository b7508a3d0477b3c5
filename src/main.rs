mod collect;
mod config;
mod error;
mod extract;
mod report;

use clap::Parser;
use config::{load_config, ReportConfig, DEFAULT_CONFIG_FILE};
use error::ReportError;
use extract::{CounterExtractor, DEFAULT_COUNTER_PATTERN};
use std::path::{Path, PathBuf};

/// Collect `name: value` counters from benchmark result files into a CSV
/// report with one column per benchmark.
#[derive(Parser, Debug)]
#[command(name = "parse", version, about)]
pub struct Cli {
    /// Directory holding the result files, relative to the working directory
    #[arg(value_name = "RESULT_DIR")]
    result_dir: PathBuf,

    /// File name prefix of the benchmark family
    #[arg(value_name = "ACCESS_PATTERN")]
    access_pattern: String,

    /// Comma-separated benchmark identifiers, in report order
    #[arg(value_name = "ARGS")]
    args: String,

    /// Output CSV, relative to RESULT_DIR
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: PathBuf,

    /// Config file path (default: parse.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep one row per benchmark instead of transposing
    #[arg(long)]
    no_transpose: bool,

    /// List the files each benchmark would read, write nothing
    #[arg(long)]
    dry_run: bool,

    /// Log every file and counter count
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn benchmarks(&self) -> Vec<&str> {
        self.args.split(',').collect()
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    tracing::debug!(?cli, "parsed CLI arguments");

    let result = std::env::current_dir()
        .map_err(|e| ReportError::io(".", e))
        .and_then(|cwd| run(&cli, &cwd));

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Resolve paths against `base`, then collect, write and transpose.
fn run(cli: &Cli, base: &Path) -> Result<(), ReportError> {
    let config = match &cli.config {
        Some(path) => load_config(&base.join(path), true)?,
        None => load_config(&base.join(DEFAULT_CONFIG_FILE), false)?,
    };
    let extractor = build_extractor(&config)?;
    tracing::debug!(
        pattern = extractor.pattern(),
        transpose = config.output.transpose,
        "resolved config"
    );
    let transpose = config.output.transpose && !cli.no_transpose;

    let result_dir = base.join(&cli.result_dir);
    let output = result_dir.join(&cli.output_file);
    let benchmarks = cli.benchmarks();

    if cli.dry_run {
        print!("{}", dry_run_plan(cli, &result_dir, &output, transpose)?);
        return Ok(());
    }

    tracing::info!(
        result_dir = %result_dir.display(),
        access_pattern = %cli.access_pattern,
        benchmarks = benchmarks.len(),
        "collecting results"
    );

    let table =
        collect::collect_table(&result_dir, &cli.access_pattern, &benchmarks, &extractor)?;
    table.write_csv(&output)?;
    if transpose {
        report::transpose_file(&output)?;
    }

    tracing::info!(
        output = %output.display(),
        benchmarks = table.records().len(),
        fields = table.fields().len(),
        transposed = transpose,
        "report written"
    );
    Ok(())
}

fn build_extractor(config: &ReportConfig) -> Result<CounterExtractor, ReportError> {
    if config.extract.counter_pattern == DEFAULT_COUNTER_PATTERN {
        Ok(CounterExtractor::default())
    } else {
        CounterExtractor::new(&config.extract.counter_pattern)
    }
}

/// Describe what a real run would read and write.
fn dry_run_plan(
    cli: &Cli,
    result_dir: &Path,
    output: &Path,
    transpose: bool,
) -> Result<String, ReportError> {
    let mut plan = format!("result dir: {}\n", result_dir.display());
    for benchmark in cli.benchmarks() {
        let files = collect::collect_files(result_dir, &cli.access_pattern, benchmark)?;
        plan.push_str(&format!("{benchmark}: {} file(s)\n", files.len()));
        for file in &files {
            plan.push_str(&format!("  {}\n", file.display()));
        }
    }
    plan.push_str(&format!(
        "output: {}{}\n",
        output.display(),
        if transpose { " (transposed)" } else { "" }
    ));
    Ok(plan)
}
