//! World Bank World Development Indicators. The file is large, so it is scanned lazily in
//! bounded chunks and filtered to the indicator allow-list before anything is collected.

use std::path::Path;

use log::debug;
use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::sources::read::{
    ensure_exists, filter_allowed, melt, pivot_indicators, stack, with_keys, year_columns,
    INDICATOR,
};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const FILE: &str = "worldBankWDI/WDICSV.csv";
const NAME: &str = "World Bank WDI";
const COUNTRY_CODE: &str = "Country Code";
const INDICATOR_CODE: &str = "Indicator Code";

pub const INDICATORS: [(&str, &str); 20] = [
    ("NY.GDP.MKTP.KD.ZG", COL::GDP_GROWTH),
    ("NY.GDP.PCAP.KD", COL::GDP_PER_CAPITA),
    ("NY.GDP.PCAP.PP.KD", COL::GDP_PER_CAPITA_PPP),
    ("SI.POV.GINI", COL::GINI_INDEX),
    ("SI.POV.DDAY", COL::POVERTY_RATE),
    ("SH.MED.BEDS.ZS", COL::HOSPITAL_BEDS_PER_1K),
    ("SH.MED.PHYS.ZS", COL::PHYSICIANS_PER_1K),
    ("IT.NET.USER.ZS", COL::INTERNET_USERS_PCT),
    ("SE.ADT.LITR.ZS", COL::LITERACY_RATE),
    ("SE.SEC.ENRR", COL::SECONDARY_ENROLLMENT),
    ("SP.POP.TOTL", COL::POPULATION),
    ("SP.URB.TOTL.IN.ZS", COL::URBAN_POPULATION_PCT),
    ("SH.XPD.CHEX.GD.ZS", COL::HEALTH_EXPENDITURE_PCT_GDP),
    ("EG.ELC.ACCS.ZS", COL::ELECTRICITY_ACCESS_PCT),
    ("SH.STA.BASS.ZS", COL::SANITATION_ACCESS_PCT),
    ("SH.H2O.BASW.ZS", COL::WATER_ACCESS_PCT),
    ("AG.LND.FRST.ZS", COL::FOREST_AREA_PCT),
    ("EN.ATM.CO2E.PC", COL::CO2_EMISSIONS_PER_CAPITA),
    ("IC.BUS.EASE.XQ", COL::EASE_DOING_BUSINESS),
    ("FP.CPI.TOTL.ZG", COL::INFLATION_WDI),
];

#[derive(Debug, Clone, Copy)]
pub struct Wdi;

impl Normalizer for Wdi {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        INDICATORS.iter().map(|(_, column)| *column).collect()
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let path = ctx.config.source_path(FILE);
        let filtered = scan_filtered(&path, ctx.config.wdi_chunk_size)?;
        debug!("WDI rows after indicator filter: {}", filtered.height());
        from_frame(filtered, ctx)
    }
}

/// Scan the CSV with every column as text, keeping only allow-listed indicator rows.
fn scan_filtered(path: &Path, chunk_size: usize) -> Result<DataFrame> {
    ensure_exists(path)?;
    let allowed: Vec<&str> = INDICATORS.iter().map(|(code, _)| *code).collect();
    let scan = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_chunk_size(chunk_size)
        .with_encoding(CsvEncoding::LossyUtf8)
        .finish()?;
    Ok(filter_allowed(scan, INDICATOR_CODE, &allowed)
        .with_streaming(true)
        .collect()?)
}

pub fn from_frame(df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    let Some(long) = stack(melt(
        &df,
        &[COUNTRY_CODE, INDICATOR_CODE],
        &year_columns(&df, ctx),
        None,
    ))?
    else {
        return Err(ResilienceError::missing_column(NAME, "year columns"));
    };
    let long = with_keys(long, COUNTRY_CODE, COL::YEAR, ctx)?;
    let long = long
        .lazy()
        .rename([INDICATOR_CODE], [INDICATOR]);
    pivot_indicators(long, &INDICATORS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::{float_values, string_values};
    use std::fs;

    #[test]
    fn chunked_scan_keeps_allow_listed_indicators() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("worldBankWDI"))?;
        fs::write(
            dir.path().join(FILE),
            "Country Name,Country Code,Indicator Name,Indicator Code,1999,2000,2001\n\
             Kenya,KEN,Population,SP.POP.TOTL,1,50000000,51000000\n\
             Kenya,KEN,Something else,XX.YY,1,2,3\n\
             World,WLD,Population,SP.POP.TOTL,1,6000000000,6100000000\n\
             Kenya,KEN,GDP growth,NY.GDP.MKTP.KD.ZG,1,,4.5\n",
        )?;
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            wdi_chunk_size: 2,
            ..Config::default()
        };
        let resolver = CountryResolver::new(&config);
        let out = Wdi.load(&SourceContext::new(&config, &resolver))?;
        let keyed = out
            .lazy()
            .filter(col(COL::ISO3).is_not_null())
            .collect()?;
        assert_eq!(keyed.height(), 2);
        assert_eq!(
            string_values(&keyed, COL::ISO3)?,
            vec![Some("KEN".to_string()), Some("KEN".to_string())]
        );
        assert_eq!(
            float_values(&keyed, COL::POPULATION)?,
            vec![Some(50_000_000.0), Some(51_000_000.0)]
        );
        assert_eq!(float_values(&keyed, COL::GDP_GROWTH)?, vec![None, Some(4.5)]);
        Ok(())
    }
}
