use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chartsync::export::export_dataset;
use chartsync::ingest::{chart_from_payload, dataset_from_payload};
use chartsync::notice::{compose_warning, MISSING_DATASET_NOTICE};
use chartsync::{annotate, reconcile, Chart, Dataset, ExportOptions};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chartsync")]
#[command(about = "Keep chart series in sync with an edited dataset", long_about = None)]
struct Args {
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-derive chart series from the current dataset
    Refresh {
        /// Chart JSON file ('-' for stdin)
        #[arg(long)]
        chart: PathBuf,
        /// Dataset JSON file ('-' for stdin)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Write the refreshed chart here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Attach inferred column bindings to a freshly generated chart
    Annotate {
        #[arg(long)]
        chart: PathBuf,
        #[arg(long)]
        data: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serialize a dataset as delimited text
    Export {
        #[arg(long)]
        data: PathBuf,
        /// File name for the export (defaults to the configured name)
        #[arg(long)]
        name: Option<String>,
        /// Export options as JSON, e.g. '{"filename": "sales.csv"}'
        #[arg(long)]
        options: Option<String>,
        /// File or directory to write to instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the rows containing a search term
    Search {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        term: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match args.command {
        Command::Refresh { chart, data, output } => run_refresh(&chart, data.as_deref(), output.as_deref()),
        Command::Annotate { chart, data, output } => run_annotate(&chart, &data, output.as_deref()),
        Command::Export {
            data,
            name,
            options,
            output,
        } => run_export(&data, name.as_deref(), options.as_deref(), output.as_deref()),
        Command::Search { data, term } => run_search(&data, &term),
    }
}

fn run_refresh(chart_path: &Path, data_path: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let chart = load_chart(chart_path)?;
    let dataset = data_path.map(load_dataset).transpose()?;

    let refreshed = match reconcile(&chart, dataset.as_ref()) {
        Ok(result) => {
            if let Some(message) = compose_warning(&result.diagnostics) {
                warn!(affected = ?result.diagnostics.affected_indices(), "refresh incomplete");
                eprintln!("Warning: {}", message);
            }
            result.chart
        }
        Err(e) => {
            warn!(error = %e, "refresh skipped");
            eprintln!("Warning: {}", MISSING_DATASET_NOTICE);
            chart
        }
    };

    write_json(&refreshed, output)
}

fn run_annotate(chart_path: &Path, data_path: &Path, output: Option<&Path>) -> Result<()> {
    let chart = load_chart(chart_path)?;
    let dataset = load_dataset(data_path)?;
    write_json(&annotate(&chart, &dataset), output)
}

fn run_export(
    data_path: &Path,
    name: Option<&str>,
    options: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let dataset = load_dataset(data_path)?;
    let options: ExportOptions = match options {
        Some(raw) => serde_json::from_str(raw).context("Failed to parse export options")?,
        None => ExportOptions::default(),
    };

    let file = export_dataset(&dataset, name, &options).context("Failed to serialize dataset")?;
    info!(name = %file.name, content_type = file.content_type, "export ready");

    match output {
        Some(path) => {
            let written = file
                .write_to(path)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            info!(path = %written.display(), "export written");
        }
        None => write_stdout(&file.bytes)?,
    }
    Ok(())
}

fn run_search(data_path: &Path, term: &str) -> Result<()> {
    let dataset = load_dataset(data_path)?;
    write_json(&dataset.search(term), None)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn load_chart(path: &Path) -> Result<Chart> {
    let text = read_input(path)?;
    chart_from_payload(&text).with_context(|| format!("Failed to load chart from {}", path.display()))
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let text = read_input(path)?;
    dataset_from_payload(&text).with_context(|| format!("Failed to load dataset from {}", path.display()))
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(value).context("Failed to encode JSON")?;
    json.push(b'\n');
    match output {
        Some(path) => fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display())),
        None => write_stdout(&json),
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(bytes).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
