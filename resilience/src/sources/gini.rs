//! Gini coefficient from the World Inequality Database extract.

use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::sources::read::{find_column, read_csv_text, require_column, with_keys};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const FILE: &str = "WDIworld/economic-inequality-gini-index.csv";
const NAME: &str = "Gini (WID)";

#[derive(Debug, Clone, Copy)]
pub struct Gini;

impl Normalizer for Gini {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![COL::GINI_WID]
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        from_frame(read_csv_text(&ctx.config.source_path(FILE), 0)?, ctx)
    }
}

pub fn from_frame(df: DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    require_column(&df, NAME, "Code")?;
    require_column(&df, NAME, "Year")?;
    let gini = find_column(&df, |name| name.contains("gini"))
        .ok_or_else(|| ResilienceError::missing_column(NAME, "gini"))?;
    let df = with_keys(df, "Code", "Year", ctx)?;
    Ok(df
        .lazy()
        .select([
            col(COL::ISO3),
            col(COL::YEAR),
            col(&gini).cast(DataType::Float64).alias(COL::GINI_WID),
        ])
        .filter(col(COL::ISO3).is_not_null().and(col(COL::GINI_WID).is_not_null()))
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::float_values;

    #[test]
    fn first_gini_column_is_used() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let raw = df!(
            "Entity" => &["Brazil", "Brazil", "World"],
            "Code" => &["BRA", "BRA", "OWID_WRL"],
            "Year" => &["2010", "2011", "2010"],
            "Gini coefficient (before tax)" => &["0.59", "", "0.67"],
        )?;
        let out = from_frame(raw, &ctx)?;
        assert_eq!(out.height(), 1);
        assert_eq!(float_values(&out, COL::GINI_WID)?, vec![Some(0.59)]);
        Ok(())
    }
}
