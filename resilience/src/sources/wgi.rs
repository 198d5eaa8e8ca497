//! Worldwide Governance Indicators: six dimension estimates and their row mean.

use polars::prelude::*;

use crate::error::Result;
use crate::frame::{float_values, set_float};
use crate::sources::read::{
    filter_allowed, pivot_indicators, read_excel, require_column, with_keys, INDICATOR, VALUE,
};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const FILE: &str = "WGI/wgidataset.xlsx";
const NAME: &str = "WGI";

pub const DIMENSIONS: [(&str, &str); 6] = [
    ("va", COL::WGI_VOICE_ACCOUNTABILITY),
    ("pv", COL::WGI_POLITICAL_STABILITY),
    ("ge", COL::WGI_GOV_EFFECTIVENESS),
    ("rq", COL::WGI_REGULATORY_QUALITY),
    ("rl", COL::WGI_RULE_OF_LAW),
    ("cc", COL::WGI_CONTROL_CORRUPTION),
];

#[derive(Debug, Clone, Copy)]
pub struct Wgi;

impl Normalizer for Wgi {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = DIMENSIONS.iter().map(|(_, column)| *column).collect();
        columns.push(COL::WGI_COMPOSITE);
        columns
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        from_frame(read_excel(&ctx.config.source_path(FILE))?, ctx)
    }
}

pub fn from_frame(df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    for column in ["code", "year", INDICATOR, "estimate"] {
        require_column(&df, NAME, column)?;
    }
    let df = with_keys(df, "code", COL::YEAR, ctx)?;
    let allowed: Vec<&str> = DIMENSIONS.iter().map(|(code, _)| *code).collect();
    let long = filter_allowed(
        df.lazy()
            .with_column(col(INDICATOR).str().to_lowercase())
            .select([
                col(COL::ISO3),
                col(COL::YEAR),
                col(INDICATOR),
                col("estimate").cast(DataType::Float64).alias(VALUE),
            ]),
        INDICATOR,
        &allowed,
    );
    let mut wide = pivot_indicators(long, &DIMENSIONS)?;
    let columns = DIMENSIONS
        .iter()
        .map(|(_, column)| float_values(&wide, column))
        .collect::<Result<Vec<_>>>()?;
    let composite = (0..wide.height())
        .map(|row| {
            let present: Vec<f64> = columns.iter().filter_map(|values| values[row]).collect();
            (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64)
        })
        .collect();
    set_float(&mut wide, COL::WGI_COMPOSITE, composite)?;
    Ok(wide)
}
