//! INFORM risk index trend file: hazard, vulnerability and coping capacity scores.

use polars::prelude::*;

use crate::error::Result;
use crate::sources::read::{
    filter_allowed, pivot_indicators, preferred_or_first, read_excel, require_column, with_keys,
    INDICATOR, VALUE,
};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const FILE: &str = "IINFORMRisk/INFORM2024_TREND_2015_2024_v70_ALL.xlsx";
const NAME: &str = "INFORM";
const CODE: &str = "Iso3";
const YEAR: &str = "INFORMYear";
const INDICATOR_ID: &str = "IndicatorId";
const SCORE: &str = "IndicatorScore";

pub const INDICATORS: [(&str, &str); 10] = [
    ("INFORM", COL::INFORM_RISK),
    ("HA", COL::INFORM_HAZARD),
    ("VU", COL::INFORM_VULNERABILITY),
    ("CC", COL::INFORM_COPING_CAPACITY),
    ("HA.NAT", COL::INFORM_NATURAL_HAZARD),
    ("HA.HUM", COL::INFORM_HUMAN_HAZARD),
    ("VU.SEV", COL::INFORM_SOCIOECONOMIC_VULNERABILITY),
    ("VU.VGR", COL::INFORM_VULNERABLE_GROUPS),
    ("CC.INF", COL::INFORM_INSTITUTIONAL),
    ("CC.INS", COL::INFORM_INFRASTRUCTURE),
];

#[derive(Debug, Clone, Copy)]
pub struct Inform;

impl Normalizer for Inform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        INDICATORS.iter().map(|(_, column)| *column).collect()
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let path = preferred_or_first(&ctx.config.source_path(FILE))?;
        from_frame(read_excel(&path)?, ctx)
    }
}

pub fn from_frame(df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    for column in [CODE, YEAR, INDICATOR_ID, SCORE] {
        require_column(&df, NAME, column)?;
    }
    let allowed: Vec<&str> = INDICATORS.iter().map(|(code, _)| *code).collect();
    let df = filter_allowed(df.lazy(), INDICATOR_ID, &allowed).collect()?;
    let df = with_keys(df, CODE, YEAR, ctx)?;
    let long = df.lazy().select([
        col(COL::ISO3),
        col(COL::YEAR),
        col(INDICATOR_ID).alias(INDICATOR),
        col(SCORE).cast(DataType::Float64).alias(VALUE),
    ]);
    pivot_indicators(long, &INDICATORS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::float_values;

    #[test]
    fn indicator_rows_become_columns() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let raw = df!(
            "Iso3" => &["HTI", "HTI", "HTI", "HTI"],
            "INFORMYear" => &["2020", "2020", "2020", "2020"],
            "IndicatorId" => &["HA", "CC", "VU.SEV", "DRR"],
            "IndicatorScore" => &["6.1", "7.5", "8.0", "3.3"],
        )?;
        let out = from_frame(raw, &ctx)?;
        assert_eq!(out.height(), 1);
        assert_eq!(float_values(&out, COL::INFORM_HAZARD)?, vec![Some(6.1)]);
        assert_eq!(float_values(&out, COL::INFORM_COPING_CAPACITY)?, vec![Some(7.5)]);
        assert_eq!(float_values(&out, COL::INFORM_SOCIOECONOMIC_VULNERABILITY)?, vec![Some(8.0)]);
        assert_eq!(float_values(&out, COL::INFORM_RISK)?, vec![None]);
        Ok(())
    }
}
