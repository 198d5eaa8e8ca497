//! EM-DAT disaster event records, aggregated to country-year totals.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::sources::read::{find_column, list_files, read_excel, with_keys};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "emdat";
const NAME: &str = "EM-DAT";

#[derive(Debug, Clone, Copy)]
pub struct EmDat;

impl Normalizer for EmDat {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![
            COL::EMDAT_DEATHS,
            COL::EMDAT_AFFECTED,
            COL::EMDAT_DAMAGE_USD,
            COL::EMDAT_EVENT_COUNT,
        ]
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let path = export_file(&ctx.config.source_path(DIR))?;
        aggregate_events(read_events(&path, ctx)?)
    }
}

/// The single export to read. Exports overlap, so only the first one (by name) is used.
pub fn export_file(dir: &Path) -> Result<PathBuf> {
    let mut files = list_files(dir, &["xlsx", "xls"])?.into_iter();
    let first = files
        .next()
        .ok_or_else(|| ResilienceError::MissingFile(dir.join("*.xlsx")))?;
    let ignored: Vec<PathBuf> = files.collect();
    if !ignored.is_empty() {
        warn!(
            "{NAME}: reading {} and ignoring {} other export(s): {ignored:?}",
            first.display(),
            ignored.len()
        );
    }
    Ok(first)
}

fn read_events(path: &Path, ctx: &SourceContext) -> Result<LazyFrame> {
    debug!("Reading EM-DAT events from {}", path.display());
    events_from_frame(read_excel(path)?, ctx)
}

/// Select and type the event columns of one EM-DAT export.
pub fn events_from_frame(df: DataFrame, ctx: &SourceContext) -> Result<LazyFrame> {
    let code = find_column(&df, |name| name == "iso")
        .ok_or_else(|| ResilienceError::missing_column(NAME, "ISO"))?;
    let year = find_column(&df, |name| name.contains("start year"))
        .ok_or_else(|| ResilienceError::missing_column(NAME, "Start Year"))?;
    let deaths = find_column(&df, |name| name == "total deaths");
    let affected = find_column(&df, |name| name == "total affected");
    let damage = find_column(&df, |name| name.contains("total damage") && name.contains("adjusted"))
        .or_else(|| find_column(&df, |name| name.contains("total damage")));

    let df = with_keys(df, &code, &year, ctx)?;
    let numeric = |column: Option<String>, alias: &str| match column {
        Some(column) => col(&column).cast(DataType::Float64).alias(alias),
        None => lit(NULL).cast(DataType::Float64).alias(alias),
    };
    Ok(df.lazy().select([
        col(COL::ISO3),
        col(COL::YEAR),
        numeric(deaths, COL::EMDAT_DEATHS),
        numeric(affected, COL::EMDAT_AFFECTED),
        numeric(damage, COL::EMDAT_DAMAGE_USD),
    ]))
}

/// One row per (iso3, year): event count plus sums in which missing values count as zero.
pub fn aggregate_events(events: LazyFrame) -> Result<DataFrame> {
    let sum = |column: &str| col(column).fill_null(lit(0.0)).sum().alias(column);
    Ok(events
        .group_by([col(COL::ISO3), col(COL::YEAR)])
        .agg([
            sum(COL::EMDAT_DEATHS),
            sum(COL::EMDAT_AFFECTED),
            sum(COL::EMDAT_DAMAGE_USD),
            col(COL::YEAR)
                .count()
                .cast(DataType::Float64)
                .alias(COL::EMDAT_EVENT_COUNT),
        ])
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
        .collect()?)
}
