//! Barro-Lee educational attainment, sampled every five years and kept at native years.

use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::frame::has_column;
use crate::sources::read::{list_files, read_csv_text, require_column, with_keys};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "barrolee";
const NAME: &str = "Barro-Lee";
const CODE: &str = "WBcode";

pub const ATTAINMENT: [(&str, &str); 8] = [
    ("yr_sch", COL::YEARS_OF_SCHOOLING),
    ("yr_sch_pri", COL::YEARS_PRIMARY_SCHOOLING),
    ("yr_sch_sec", COL::YEARS_SECONDARY_SCHOOLING),
    ("yr_sch_ter", COL::YEARS_TERTIARY_SCHOOLING),
    ("lu", COL::NO_SCHOOLING_PCT),
    ("lp", COL::PRIMARY_COMPLETED_PCT),
    ("ls", COL::SECONDARY_COMPLETED_PCT),
    ("lh", COL::TERTIARY_COMPLETED_PCT),
];

#[derive(Debug, Clone, Copy)]
pub struct BarroLee;

impl Normalizer for BarroLee {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        ATTAINMENT.iter().map(|(_, column)| *column).collect()
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let dir = ctx.config.source_path(DIR);
        let path = list_files(&dir, &["csv"])?
            .into_iter()
            .next()
            .ok_or_else(|| ResilienceError::MissingFile(dir.join("*.csv")))?;
        from_frame(read_csv_text(&path, 0)?, ctx)
    }
}

pub fn from_frame(df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    require_column(&df, NAME, CODE)?;
    require_column(&df, NAME, COL::YEAR)?;
    let mut exprs = vec![col(COL::ISO3), col(COL::YEAR)];
    exprs.extend(
        ATTAINMENT
            .iter()
            .filter(|(raw, _)| has_column(&df, raw))
            .map(|(raw, column)| col(raw).cast(DataType::Float64).alias(column)),
    );
    let df = with_keys(df, CODE, COL::YEAR, ctx)?;
    let df = df
        .lazy()
        .select(exprs)
        .filter(col(COL::ISO3).is_not_null())
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}
