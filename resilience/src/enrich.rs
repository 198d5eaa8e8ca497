//! Region and income classification.

use log::info;
use polars::prelude::*;
use strum_macros::{Display, EnumString};

use crate::config::{Config, IncomeThresholds};
use crate::error::Result;
use crate::frame::{float_values, set_string, string_values};
use crate::COL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum IncomeGroup {
    Low,
    #[strum(serialize = "Lower-Middle")]
    LowerMiddle,
    #[strum(serialize = "Upper-Middle")]
    UpperMiddle,
    High,
}

impl IncomeGroup {
    /// Bracket for a GDP per capita value. Non-positive or missing values have no bracket.
    pub fn classify(gdp_per_capita: Option<f64>, thresholds: &IncomeThresholds) -> Option<Self> {
        let gdp = gdp_per_capita.filter(|gdp| gdp.is_finite() && *gdp > 0.0)?;
        Some(if gdp <= thresholds.low {
            IncomeGroup::Low
        } else if gdp <= thresholds.lower_middle {
            IncomeGroup::LowerMiddle
        } else if gdp <= thresholds.upper_middle {
            IncomeGroup::UpperMiddle
        } else {
            IncomeGroup::High
        })
    }
}

/// Attach `region` and `income_group`, row by row.
pub fn enrich(mut df: DataFrame, config: &Config) -> Result<DataFrame> {
    let regions: Vec<Option<String>> = string_values(&df, COL::ISO3)?
        .into_iter()
        .map(|code| code.and_then(|code| config.region_lookup.get(&code).cloned()))
        .collect();
    let incomes: Vec<Option<String>> = float_values(&df, COL::GDP_PER_CAPITA_BEST)?
        .into_iter()
        .map(|gdp| IncomeGroup::classify(gdp, &config.income_thresholds).map(|g| g.to_string()))
        .collect();
    let unmapped = regions.iter().filter(|region| region.is_none()).count();
    set_string(&mut df, COL::REGION, regions)?;
    set_string(&mut df, COL::INCOME_GROUP, incomes)?;
    info!("Enriched {} rows ({unmapped} without a region)", df.height());
    Ok(df)
}

pub const DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("AFG", "Asia"), ("ALB", "Europe"), ("DZA", "Africa"), ("AND", "Europe"), ("AGO", "Africa"),
    ("ARG", "Americas"), ("ARM", "Asia"), ("AUS", "Oceania"), ("AUT", "Europe"), ("AZE", "Asia"),
    ("BHS", "Americas"), ("BHR", "Asia"), ("BGD", "Asia"), ("BRB", "Americas"), ("BLR", "Europe"),
    ("BEL", "Europe"), ("BLZ", "Americas"), ("BEN", "Africa"), ("BTN", "Asia"), ("BOL", "Americas"),
    ("BIH", "Europe"), ("BWA", "Africa"), ("BRA", "Americas"), ("BRN", "Asia"), ("BGR", "Europe"),
    ("BFA", "Africa"), ("BDI", "Africa"), ("KHM", "Asia"), ("CMR", "Africa"), ("CAN", "Americas"),
    ("CPV", "Africa"), ("CAF", "Africa"), ("TCD", "Africa"), ("CHL", "Americas"), ("CHN", "Asia"),
    ("COL", "Americas"), ("COM", "Africa"), ("COG", "Africa"), ("COD", "Africa"), ("CRI", "Americas"),
    ("CIV", "Africa"), ("HRV", "Europe"), ("CUB", "Americas"), ("CYP", "Europe"), ("CZE", "Europe"),
    ("DNK", "Europe"), ("DJI", "Africa"), ("DMA", "Americas"), ("DOM", "Americas"), ("ECU", "Americas"),
    ("EGY", "Africa"), ("SLV", "Americas"), ("GNQ", "Africa"), ("ERI", "Africa"), ("EST", "Europe"),
    ("ETH", "Africa"), ("FJI", "Oceania"), ("FIN", "Europe"), ("FRA", "Europe"), ("GAB", "Africa"),
    ("GMB", "Africa"), ("GEO", "Asia"), ("DEU", "Europe"), ("GHA", "Africa"), ("GRC", "Europe"),
    ("GRD", "Americas"), ("GTM", "Americas"), ("GIN", "Africa"), ("GNB", "Africa"), ("GUY", "Americas"),
    ("HTI", "Americas"), ("HND", "Americas"), ("HUN", "Europe"), ("ISL", "Europe"), ("IND", "Asia"),
    ("IDN", "Asia"), ("IRN", "Asia"), ("IRQ", "Asia"), ("IRL", "Europe"), ("ISR", "Asia"),
    ("ITA", "Europe"), ("JAM", "Americas"), ("JPN", "Asia"), ("JOR", "Asia"), ("KAZ", "Asia"),
    ("KEN", "Africa"), ("KIR", "Oceania"), ("PRK", "Asia"), ("KOR", "Asia"), ("KWT", "Asia"),
    ("KGZ", "Asia"), ("LAO", "Asia"), ("LVA", "Europe"), ("LBN", "Asia"), ("LSO", "Africa"),
    ("LBR", "Africa"), ("LBY", "Africa"), ("LIE", "Europe"), ("LTU", "Europe"), ("LUX", "Europe"),
    ("MDG", "Africa"), ("MWI", "Africa"), ("MYS", "Asia"), ("MDV", "Asia"), ("MLI", "Africa"),
    ("MLT", "Europe"), ("MHL", "Oceania"), ("MRT", "Africa"), ("MUS", "Africa"), ("MEX", "Americas"),
    ("FSM", "Oceania"), ("MDA", "Europe"), ("MCO", "Europe"), ("MNG", "Asia"), ("MNE", "Europe"),
    ("MAR", "Africa"), ("MOZ", "Africa"), ("MMR", "Asia"), ("NAM", "Africa"), ("NRU", "Oceania"),
    ("NPL", "Asia"), ("NLD", "Europe"), ("NZL", "Oceania"), ("NIC", "Americas"), ("NER", "Africa"),
    ("NGA", "Africa"), ("NOR", "Europe"), ("OMN", "Asia"), ("PAK", "Asia"), ("PLW", "Oceania"),
    ("PSE", "Asia"), ("PAN", "Americas"), ("PNG", "Oceania"), ("PRY", "Americas"), ("PER", "Americas"),
    ("PHL", "Asia"), ("POL", "Europe"), ("PRT", "Europe"), ("QAT", "Asia"), ("ROU", "Europe"),
    ("RUS", "Europe"), ("RWA", "Africa"), ("KNA", "Americas"), ("LCA", "Americas"), ("VCT", "Americas"),
    ("WSM", "Oceania"), ("SMR", "Europe"), ("STP", "Africa"), ("SAU", "Asia"), ("SEN", "Africa"),
    ("SRB", "Europe"), ("SYC", "Africa"), ("SLE", "Africa"), ("SGP", "Asia"), ("SVK", "Europe"),
    ("SVN", "Europe"), ("SLB", "Oceania"), ("SOM", "Africa"), ("ZAF", "Africa"), ("SSD", "Africa"),
    ("ESP", "Europe"), ("LKA", "Asia"), ("SDN", "Africa"), ("SUR", "Americas"), ("SWZ", "Africa"),
    ("SWE", "Europe"), ("CHE", "Europe"), ("SYR", "Asia"), ("TWN", "Asia"), ("TJK", "Asia"),
    ("TZA", "Africa"), ("THA", "Asia"), ("TLS", "Asia"), ("TGO", "Africa"), ("TON", "Oceania"),
    ("TTO", "Americas"), ("TUN", "Africa"), ("TUR", "Asia"), ("TKM", "Asia"), ("TUV", "Oceania"),
    ("UGA", "Africa"), ("UKR", "Europe"), ("ARE", "Asia"), ("GBR", "Europe"), ("USA", "Americas"),
    ("URY", "Americas"), ("UZB", "Asia"), ("VUT", "Oceania"), ("VEN", "Americas"), ("VNM", "Asia"),
    ("YEM", "Asia"), ("ZMB", "Africa"), ("ZWE", "Africa"), ("HKG", "Asia"), ("MAC", "Asia"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_brackets_follow_thresholds() {
        let thresholds = IncomeThresholds::default();
        let classify = |gdp| IncomeGroup::classify(gdp, &thresholds);
        assert_eq!(classify(Some(500.0)), Some(IncomeGroup::Low));
        assert_eq!(classify(Some(1085.0)), Some(IncomeGroup::Low));
        assert_eq!(classify(Some(1085.5)), Some(IncomeGroup::LowerMiddle));
        assert_eq!(classify(Some(13205.0)), Some(IncomeGroup::UpperMiddle));
        assert_eq!(classify(Some(50000.0)), Some(IncomeGroup::High));
        assert_eq!(classify(Some(0.0)), None);
        assert_eq!(classify(None), None);
        assert_eq!(IncomeGroup::LowerMiddle.to_string(), "Lower-Middle");
    }

    #[test]
    fn enrich_maps_regions_and_income_per_row() -> anyhow::Result<()> {
        let df = df!(
            COL::ISO3 => &["USA", "USA", "ZZZ"],
            COL::YEAR => &[2010, 2011, 2010],
            COL::GDP_PER_CAPITA_BEST => &[Some(900.0), Some(20000.0), None],
        )?;
        let out = enrich(df, &Config::default())?;
        assert_eq!(
            string_values(&out, COL::REGION)?,
            vec![Some("Americas".to_string()), Some("Americas".to_string()), None]
        );
        assert_eq!(
            string_values(&out, COL::INCOME_GROUP)?,
            vec![Some("Low".to_string()), Some("High".to_string()), None]
        );
        Ok(())
    }
}
