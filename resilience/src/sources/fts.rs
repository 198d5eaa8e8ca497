//! OCHA Financial Tracking Service flows. Amounts naming several recipient countries are
//! split equally between the ones that resolve.

use log::warn;
use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::frame::{float_values, string_values};
use crate::sources::read::{list_files, parse_year, read_csv_text, require_column};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "FTS";
const NAME: &str = "FTS";
const DESTINATIONS: &str = "destLocations";
const BUDGET_YEAR: &str = "budgetYear";
const AMOUNT: &str = "amountUSD";

#[derive(Debug, Clone, Copy)]
pub struct Fts;

impl Normalizer for Fts {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![COL::HUMANITARIAN_FUNDING_USD]
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let dir = ctx.config.source_path(DIR);
        let files = list_files(&dir, &["csv"])?;
        let mut flows = Vec::new();
        let mut last_error = None;
        for path in &files {
            // The row below the header holds HXL tags.
            match read_csv_text(path, 1).and_then(|df| split_flows(&df, ctx)) {
                Ok(df) => flows.push(df.lazy()),
                Err(err) => {
                    warn!("FTS: skipping {} ({err})", path.display());
                    last_error = Some(err);
                }
            }
        }
        if flows.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| ResilienceError::MissingFile(dir.join("*.csv"))));
        }
        Ok(concat(flows, UnionArgs::default())?
            .group_by([col(COL::ISO3), col(COL::YEAR)])
            .agg([col(COL::HUMANITARIAN_FUNDING_USD).sum()])
            .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
            .collect()?)
    }
}

/// Explode each flow into one row per resolved recipient with an equal share of the amount.
pub fn split_flows(df: &DataFrame, ctx: &SourceContext) -> Result<DataFrame> {
    for column in [DESTINATIONS, BUDGET_YEAR, AMOUNT] {
        require_column(df, NAME, column)?;
    }
    let destinations = string_values(df, DESTINATIONS)?;
    let years = string_values(df, BUDGET_YEAR)?;
    let amounts = float_values(df, AMOUNT)?;

    let mut codes: Vec<Option<String>> = Vec::new();
    let mut flow_years: Vec<i32> = Vec::new();
    let mut shares: Vec<f64> = Vec::new();
    for ((destination, year), amount) in destinations.iter().zip(&years).zip(&amounts) {
        let (Some(destination), Some(amount)) = (destination, amount) else {
            continue;
        };
        let Some(year) = year.as_deref().and_then(parse_year) else {
            continue;
        };
        if !ctx.config.in_range(year) {
            continue;
        }
        let tokens: Vec<&str> = destination
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        let recipients: Vec<String> = tokens
            .iter()
            .filter_map(|token| ctx.resolver.code(token))
            .collect();
        if recipients.len() < tokens.len() {
            ctx.note_unresolved(tokens.len() - recipients.len());
        }
        if recipients.is_empty() {
            continue;
        }
        // Split among resolved recipients only, so the flow total is kept.
        let share = amount / recipients.len() as f64;
        for recipient in recipients {
            codes.push(Some(recipient));
            flow_years.push(year);
            shares.push(share);
        }
    }
    Ok(DataFrame::new(vec![
        Series::new(COL::ISO3, codes),
        Series::new(COL::YEAR, flow_years),
        Series::new(COL::HUMANITARIAN_FUNDING_USD, shares),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use std::fs;

    #[test]
    fn multi_country_flows_are_split_equally() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join(DIR))?;
        fs::write(
            dir.path().join(DIR).join("fts_incoming.csv"),
            "id,amountUSD,budgetYear,destLocations\n\
             #x,#value,#date,#country\n\
             1,300,2019,\"KEN, SOM, ETH\"\n\
             2,100,2019,KEN\n\
             3,50,1990,KEN\n\
             4,,2019,KEN\n",
        )?;
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let resolver = CountryResolver::new(&config);
        let out = Fts.load(&SourceContext::new(&config, &resolver))?;
        assert_eq!(
            string_values(&out, COL::ISO3)?,
            vec![Some("ETH".to_string()), Some("KEN".to_string()), Some("SOM".to_string())]
        );
        assert_eq!(
            float_values(&out, COL::HUMANITARIAN_FUNDING_USD)?,
            vec![Some(100.0), Some(200.0), Some(100.0)]
        );
        Ok(())
    }

    #[test]
    fn unresolved_recipients_do_not_take_a_share() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join(DIR))?;
        fs::write(
            dir.path().join(DIR).join("fts_incoming.csv"),
            "id,amountUSD,budgetYear,destLocations\n\
             #x,#value,#date,#country\n\
             1,300,2019,\"KEN, Atlantis, SOM\"\n\
             2,80,2019,Atlantis\n",
        )?;
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let out = Fts.load(&ctx)?;
        assert_eq!(
            float_values(&out, COL::HUMANITARIAN_FUNDING_USD)?,
            vec![Some(150.0), Some(150.0)]
        );
        assert_eq!(ctx.take_unresolved(), 2);
        Ok(())
    }
}
