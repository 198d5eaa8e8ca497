//! ND-GAIN climate adaptation index, the spine of the unified table.

use polars::prelude::*;

use crate::error::Result;
use crate::frame::empty_keyed;
use crate::sources::read::{
    melt, pivot_indicators, read_csv_text, require_column, stack, with_keys, year_columns,
    INDICATOR, VALUE,
};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "NDGain";
const CODE: &str = "ISO3";

const COMPONENTS: [(&str, &str); 3] = [
    ("gain", COL::NDGAIN_SCORE),
    ("readiness", COL::NDGAIN_READINESS),
    ("vulnerability", COL::NDGAIN_VULNERABILITY),
];

const SUB_INDICATORS: [(&str, &str); 4] = [
    ("food", COL::NDGAIN_FOOD),
    ("water", COL::NDGAIN_WATER),
    ("health", COL::NDGAIN_HEALTH),
    ("infrastructure", COL::NDGAIN_INFRASTRUCTURE),
];

#[derive(Debug, Clone, Copy)]
pub struct NdGain;

impl Normalizer for NdGain {
    fn name(&self) -> &'static str {
        "ND-GAIN"
    }

    fn columns(&self) -> Vec<&'static str> {
        COMPONENTS
            .iter()
            .chain(SUB_INDICATORS.iter())
            .map(|(_, column)| *column)
            .collect()
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let dir = ctx.config.source_path(DIR);
        let components = COMPONENTS
            .iter()
            .map(|(file, column)| {
                let df = read_csv_text(&dir.join(file).join(format!("{file}.csv")), 0)?;
                Ok((df, *column))
            })
            .collect::<Result<Vec<_>>>()?;
        let spine = wide_tables(components, ctx)?;

        let indicators_dir = dir.join("indicators");
        let sub_indicators = SUB_INDICATORS
            .iter()
            .filter_map(|(file, column)| {
                let path = indicators_dir.join(format!("{file}.csv"));
                path.exists()
                    .then(|| read_csv_text(&path, 0).map(|df| (df, *column)))
            })
            .collect::<Result<Vec<_>>>()?;
        if sub_indicators.is_empty() {
            return Ok(spine);
        }
        let extra = wide_tables(sub_indicators, ctx)?;
        Ok(spine.join(
            &extra,
            [COL::ISO3, COL::YEAR],
            [COL::ISO3, COL::YEAR],
            JoinArgs::new(JoinType::Left),
        )?)
    }
}

/// Melt several wide-by-year tables sharing the ISO3 id column into one table with a
/// column per input.
pub fn wide_tables(tables: Vec<(DataFrame, &'static str)>, ctx: &SourceContext) -> Result<DataFrame> {
    let columns: Vec<&'static str> = tables.iter().map(|(_, column)| *column).collect();
    let mut frames = Vec::new();
    for (df, column) in &tables {
        require_column(df, "ND-GAIN", CODE)?;
        frames.extend(melt(df, &[CODE], &year_columns(df, ctx), Some(*column)));
    }
    let Some(long) = stack(frames)? else {
        return Ok(empty_keyed(&columns));
    };
    let long = with_keys(long, CODE, COL::YEAR, ctx)?;
    let mapping: Vec<(&str, &str)> = columns.iter().map(|column| (*column, *column)).collect();
    pivot_indicators(
        long.lazy().select([col(COL::ISO3), col(COL::YEAR), col(INDICATOR), col(VALUE)]),
        &mapping,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::float_values;

    #[test]
    fn components_are_combined_per_country_year() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let gain = df!(
            "ISO3" => &["AFG", "ALB"],
            "Name" => &["Afghanistan", "Albania"],
            "2010" => &["30.1", "50.2"],
            "2011" => &["31.0", "51.0"],
        )?;
        let readiness = df!(
            "ISO3" => &["AFG"],
            "2010" => &["0.2"],
        )?;
        let out = wide_tables(
            vec![(gain, COL::NDGAIN_SCORE), (readiness, COL::NDGAIN_READINESS)],
            &ctx,
        )?;
        assert_eq!(out.height(), 4);
        assert_eq!(
            float_values(&out, COL::NDGAIN_READINESS)?,
            vec![Some(0.2), None, None, None]
        );
        assert_eq!(
            float_values(&out, COL::NDGAIN_SCORE)?,
            vec![Some(30.1), Some(31.0), Some(50.2), Some(51.0)]
        );
        Ok(())
    }
}
