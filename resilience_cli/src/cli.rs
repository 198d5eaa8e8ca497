use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use polars::prelude::*;
use resilience::{
    config::Config,
    formatters::{CsvFormatter, OutputFormatter, ParquetFormatter},
    quality,
    sources::{SourceOutcome, SourceRun},
    Pipeline,
};
use serde::{Deserialize, Serialize};
use spinners::{Spinner, Spinners};
use strum_macros::EnumString;

use crate::display::{
    display_coverage, display_resolutions, display_sources, display_summary, print_stdout,
};
use crate::error::ResilienceCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";

/// Defines the output formats the unified table can be written in.
#[derive(Clone, Debug, Deserialize, Serialize, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl From<&OutputFormat> for OutputFormatter {
    fn from(value: &OutputFormat) -> Self {
        match value {
            OutputFormat::Csv => CsvFormatter.into(),
            OutputFormat::Parquet => ParquetFormatter.into(),
        }
    }
}

fn start_spinner(quiet: bool, message: &str) -> Option<Spinner> {
    (!quiet).then(|| {
        Spinner::with_timer(
            DEFAULT_PROGRESS_SPINNER,
            message.to_string() + RUNNING_TAIL_STRING,
        )
    })
}

fn stop_spinner(spinner: Option<Spinner>) {
    if let Some(mut s) = spinner {
        s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
    }
}

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> ResilienceCliResult<()>;
}

/// The `build` command runs the whole pipeline and writes the three output files.
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[arg(long, help = "Directory holding the raw source files")]
    data_dir: Option<PathBuf>,
    #[arg(short = 'o', long, help = "Directory to place the outputs in")]
    output_dir: Option<PathBuf>,
    #[arg(
        short = 'f',
        long,
        value_name = "csv|parquet",
        default_value = "csv",
        help = "Output format for the unified table"
    )]
    format: OutputFormat,
    #[arg(from_global)]
    quiet: bool,
}

impl BuildCommand {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(data_dir) = &self.data_dir {
            config.data_dir.clone_from(data_dir);
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        config
    }
}

impl RunCommand for BuildCommand {
    fn run(&self, config: Config) -> ResilienceCliResult<()> {
        info!("Running `build` subcommand");
        let config = self.apply(config);
        let pipeline = Pipeline::new(config);

        let sp = start_spinner(self.quiet, "Building unified dataset");
        let mut output = pipeline.build()?;
        let formatter: OutputFormatter = (&self.format).into();
        let written = output.write(&pipeline.config, &formatter)?;
        stop_spinner(sp);

        display_summary(&output)?;
        for path in written {
            print_stdout(format!("Wrote {}", path.display()))?;
        }
        Ok(())
    }
}

/// The `sources` command runs every normalizer on its own and reports the outcome.
#[derive(Args, Debug)]
pub struct SourcesCommand {
    #[arg(long, help = "Print the outcomes as JSON")]
    json: bool,
    #[arg(from_global)]
    quiet: bool,
}

#[derive(Serialize)]
struct SourceStatus<'a> {
    source: &'a str,
    #[serde(flatten)]
    outcome: &'a SourceOutcome,
}

fn statuses_to_json(runs: &[SourceRun]) -> serde_json::Result<String> {
    let statuses: Vec<SourceStatus> = runs
        .iter()
        .map(|run| SourceStatus {
            source: run.name,
            outcome: &run.outcome,
        })
        .collect();
    serde_json::to_string_pretty(&statuses)
}

impl RunCommand for SourcesCommand {
    fn run(&self, config: Config) -> ResilienceCliResult<()> {
        info!("Running `sources` subcommand");
        let pipeline = Pipeline::new(config);
        let sp = start_spinner(self.quiet || self.json, "Reading sources");
        let runs = pipeline.normalize_all();
        stop_spinner(sp);
        if self.json {
            print_stdout(statuses_to_json(&runs)?)?;
        } else {
            display_sources(&runs)?;
        }
        Ok(())
    }
}

/// The `resolve` command shows how country identifiers map to ISO3 codes.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    #[arg(required = true, help = "Country names or codes to resolve")]
    names: Vec<String>,
}

impl RunCommand for ResolveCommand {
    fn run(&self, config: Config) -> ResilienceCliResult<()> {
        info!("Running `resolve` subcommand");
        let pipeline = Pipeline::new(config);
        let resolutions: Vec<_> = self
            .names
            .iter()
            .map(|name| (name.clone(), pipeline.resolver().resolve(name)))
            .collect();
        debug!("{resolutions:?}");
        display_resolutions(&resolutions)?;
        Ok(())
    }
}

/// The `coverage` command prints the coverage matrix of an existing unified table.
#[derive(Args, Debug)]
pub struct CoverageCommand {
    #[arg(help = "Unified table (CSV) to inspect")]
    file: PathBuf,
    #[arg(short = 'l', long, help = "Show only the first N variables")]
    limit: Option<usize>,
}

impl RunCommand for CoverageCommand {
    fn run(&self, _config: Config) -> ResilienceCliResult<()> {
        info!("Running `coverage` subcommand");
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(self.file.clone()))?
            .finish()?;
        let rows = quality::coverage_rows(&df)?;
        display_coverage(&rows, self.limit)?;
        Ok(())
    }
}

/// The `config` command prints the effective configuration.
#[derive(Args, Debug)]
pub struct ConfigCommand {}

impl RunCommand for ConfigCommand {
    fn run(&self, config: Config) -> ResilienceCliResult<()> {
        print_stdout(toml::to_string_pretty(&config)?)?;
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Build the unified country-year resilience dataset", long_about = None, name="resilience")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress spinners to stdout. Results and logs (when `RUST_LOG`\n\
            is set) will still be printed.",
        global = true
    )]
    quiet: bool,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command implements the RunCommand trait.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Run the pipeline and write the unified table, coverage matrix and validation report
    Build(BuildCommand),
    /// Run each source normalizer on its own and report what it produced
    Sources(SourcesCommand),
    /// Resolve country names or codes to ISO3
    Resolve(ResolveCommand),
    /// Print the coverage matrix of an existing unified table
    Coverage(CoverageCommand),
    /// Print the effective configuration as TOML
    Config(ConfigCommand),
}
