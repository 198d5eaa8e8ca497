//! IMF World Economic Outlook series, keyed by `ISO.INDICATOR.FREQ` series codes.

use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::frame::{set_string, string_values};
use crate::sources::read::{
    filter_allowed, list_files, melt, pivot_indicators, read_csv_text, require_column, stack,
    with_keys, year_columns, INDICATOR,
};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "IMFWEO";
const NAME: &str = "IMF WEO";
const SERIES_CODE: &str = "SERIES_CODE";
const COUNTRY: &str = "country";

pub const INDICATORS: [(&str, &str); 7] = [
    ("NGDP_RPCH", COL::GDP_GROWTH_IMF),
    ("NGDPDPC", COL::GDP_PER_CAPITA_IMF),
    ("PCPIPCH", COL::INFLATION_RATE),
    ("LUR", COL::UNEMPLOYMENT_RATE),
    ("LP", COL::POPULATION_IMF),
    ("GGR_NGDP", COL::GOVT_REVENUE_PCT_GDP),
    ("GGXWDG_NGDP", COL::GOVT_DEBT_PCT_GDP),
];

#[derive(Debug, Clone, Copy)]
pub struct Weo;

impl Normalizer for Weo {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        INDICATORS.iter().map(|(_, column)| *column).collect()
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

pub fn from_frame(mut df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    require_column(&df, NAME, SERIES_CODE)?;
    let (countries, indicators): (Vec<Option<String>>, Vec<Option<String>>) =
        string_values(&df, SERIES_CODE)?
            .into_iter()
            .map(|code| {
                let mut parts = code.as_deref().unwrap_or_default().split('.');
                let country = parts.next().map(str::to_string);
                let indicator = parts.next().map(str::to_string);
                (country, indicator)
            })
            .unzip();
    set_string(&mut df, COUNTRY, countries)?;
    set_string(&mut df, INDICATOR, indicators)?;

    let allowed: Vec<&str> = INDICATORS.iter().map(|(code, _)| *code).collect();
    let df = filter_allowed(df.lazy(), INDICATOR, &allowed).collect()?;
    let Some(long) = stack(melt(&df, &[COUNTRY, INDICATOR], &year_columns(&df, ctx), None))? else {
        return Err(ResilienceError::missing_column(NAME, "year columns"));
    };
    let long = with_keys(long, COUNTRY, COL::YEAR, ctx)?;
    pivot_indicators(long.lazy(), &INDICATORS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::float_values;

    #[test]
    fn series_codes_are_split_and_pivoted() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let raw = df!(
            SERIES_CODE => &["KEN.NGDP_RPCH.A", "KEN.LUR.A", "KEN.BCA.A"],
            "2019" => &["5.1", "2.6", "-5.0"],
            "2020" => &["-0.3", "n/a", "-4.0"],
        )?;
        let out = from_frame(raw, &ctx)?;
        assert_eq!(out.height(), 2);
        assert_eq!(float_values(&out, COL::GDP_GROWTH_IMF)?, vec![Some(5.1), Some(-0.3)]);
        assert_eq!(float_values(&out, COL::UNEMPLOYMENT_RATE)?, vec![Some(2.6), None]);
        assert_eq!(float_values(&out, COL::INFLATION_RATE)?, vec![None, None]);
        Ok(())
    }
}
