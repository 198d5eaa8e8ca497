//! UNDP Human Development Report composite indices, one `<metric>_<year>` column per year.

use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::sources::read::{
    melt, pivot_indicators, preferred_or_first, prefixed_year_columns, read_csv_text,
    require_column, stack, with_keys,
};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const FILE: &str = "HDR/HDR25_Composite_indices_complete_time_series.csv";
const NAME: &str = "HDR";
const CODE: &str = "iso3";

/// Base metric prefixes. Sex- and age-disaggregated variants such as `hdi_f_2010` do not
/// match `<prefix>_YYYY` and are ignored.
pub const METRICS: [(&str, &str); 5] = [
    ("hdi", COL::HDI),
    ("le", COL::LIFE_EXPECTANCY),
    ("eys", COL::EXPECTED_YEARS_SCHOOLING),
    ("mys", COL::MEAN_YEARS_SCHOOLING),
    ("gnipc", COL::GNI_PER_CAPITA),
];

#[derive(Debug, Clone, Copy)]
pub struct Hdr;

impl Normalizer for Hdr {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        METRICS.iter().map(|(_, column)| *column).collect()
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let path = preferred_or_first(&ctx.config.source_path(FILE))?;
        from_frame(read_csv_text(&path, 0)?, ctx)
    }
}

pub fn from_frame(df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    require_column(&df, NAME, CODE)?;
    let frames = METRICS
        .iter()
        .flat_map(|(prefix, _)| {
            melt(&df, &[CODE], &prefixed_year_columns(&df, prefix, ctx), Some(*prefix))
        })
        .collect::<Vec<_>>();
    let Some(long) = stack(frames)? else {
        return Err(ResilienceError::missing_column(NAME, "hdi_YYYY"));
    };
    let long = with_keys(long, CODE, COL::YEAR, ctx)?;
    pivot_indicators(long.lazy(), &METRICS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::float_values;

    #[test]
    fn only_base_metric_columns_are_used() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let raw = df!(
            "iso3" => &["NOR"],
            "country" => &["Norway"],
            "hdi_2010" => &["0.94"],
            "hdi_f_2010" => &["0.93"],
            "hdi_2011" => &["0.95"],
            "le_2010" => &["81.0"],
            "mys_1999" => &["12.0"],
        )?;
        let out = from_frame(raw, &ctx)?;
        assert_eq!(out.height(), 2);
        assert_eq!(float_values(&out, COL::HDI)?, vec![Some(0.94), Some(0.95)]);
        assert_eq!(float_values(&out, COL::LIFE_EXPECTANCY)?, vec![Some(81.0), None]);
        assert_eq!(float_values(&out, COL::MEAN_YEARS_SCHOOLING)?, vec![None, None]);
        Ok(())
    }
}
