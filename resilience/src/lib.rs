use std::fs;
use std::path::PathBuf;

use log::{debug, info};
use polars::prelude::*;

use crate::config::Config;
use crate::country::CountryResolver;
use crate::error::Result;
use crate::formatters::{CsvFormatter, OutputFormatter, OutputGenerator};
use crate::merge::MergeSummary;
use crate::quality::{CoverageRow, ReportInputs};
use crate::sources::{Normalizer, Source, SourceContext, SourceRun};

// Re-exports
pub use column_names as COL;

// Modules
pub mod column_names;
pub mod config;
pub mod consolidate;
pub mod country;
pub mod enrich;
pub mod error;
pub mod formatters;
pub mod frame;
pub mod indices;
pub mod merge;
pub mod quality;
pub mod registry;
pub mod sources;

/// The integration pipeline: normalize every source, merge onto the spine, then derive.
pub struct Pipeline {
    pub config: Config,
    resolver: CountryResolver,
}

/// Everything one run produces.
pub struct PipelineOutput {
    pub table: DataFrame,
    pub coverage: Vec<CoverageRow>,
    pub report: String,
    pub runs: Vec<SourceRun>,
    pub merge: MergeSummary,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        debug!("config: {config:?}");
        let resolver = CountryResolver::new(&config);
        Self { config, resolver }
    }

    pub fn resolver(&self) -> &CountryResolver {
        &self.resolver
    }

    /// Run every normalizer in merge order. Failures are captured per source.
    pub fn normalize_all(&self) -> Vec<SourceRun> {
        let ctx = SourceContext::new(&self.config, &self.resolver);
        sources::run_all(&ctx)
    }

    pub fn build(&self) -> Result<PipelineOutput> {
        let runs = self.normalize_all();
        self.assemble(runs)
    }

    /// Merge, consolidate, derive, enrich and report over already-normalized sources.
    /// The first run is the spine.
    pub fn assemble(&self, runs: Vec<SourceRun>) -> Result<PipelineOutput> {
        let spine = match runs.first() {
            Some(run) => run.table.clone(),
            None => frame::empty_keyed(&[]),
        };
        let others: Vec<(&str, &DataFrame)> = runs
            .iter()
            .skip(1)
            .map(|run| (run.name, &run.table))
            .collect();

        let (table, merge) = merge::merge(&spine, &others, &self.config)?;
        let table = consolidate::consolidate(table)?;
        let table = indices::compute(table, &self.config)?;
        let table = enrich::enrich(table, &self.config)?;
        let table = order_columns(&table)?;

        let coverage = quality::coverage_rows(&table)?;
        let report = quality::validation_report(&ReportInputs {
            table: &table,
            coverage: &coverage,
            runs: &runs,
            merge: &merge,
            config: &self.config,
        })?;
        info!(
            "Unified table: {} rows x {} columns",
            table.height(),
            table.width()
        );
        Ok(PipelineOutput {
            table,
            coverage,
            report,
            runs,
            merge,
        })
    }
}

impl PipelineOutput {
    /// Write the unified table, the coverage matrix and the validation report. The coverage
    /// matrix is always CSV.
    pub fn write(&mut self, config: &Config, format: &OutputFormatter) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&config.output_dir)?;
        let unified = format.write_file(&config.unified_path(), &mut self.table)?;
        let mut coverage = quality::coverage_frame(&self.coverage)?;
        let coverage = CsvFormatter.write_file(&config.coverage_path(), &mut coverage)?;
        let report = config.validation_path();
        fs::write(&report, &self.report)?;
        info!("Wrote validation report to {}", report.display());
        Ok(vec![unified, coverage, report])
    }
}

/// Keys, indices, consolidated fields, intermediates, then each source's columns in merge
/// order, then anything left in table order.
pub fn column_order(df: &DataFrame) -> Vec<String> {
    let present = df.get_column_names();
    let mut preferred: Vec<&str> = Vec::with_capacity(present.len());
    preferred.extend(COL::KEY_COLUMNS);
    preferred.extend(COL::INDEX_COLUMNS);
    preferred.extend(COL::CONSOLIDATED_COLUMNS);
    preferred.extend(COL::INTERMEDIATE_COLUMNS);
    for source in Source::all() {
        preferred.extend(source.columns());
    }
    preferred.extend(present.iter().copied());

    let mut ordered: Vec<String> = Vec::with_capacity(present.len());
    for name in preferred {
        if present.contains(&name) && !ordered.iter().any(|seen| seen == name) {
            ordered.push(name.to_string());
        }
    }
    ordered
}

pub fn order_columns(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.select(column_order(df))?)
}
