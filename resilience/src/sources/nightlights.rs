//! Harmonized nighttime lights: annual DMSP before the methodology cutover, monthly VIIRS
//! averaged to annual from the cutover onwards.

use std::path::{Path, PathBuf};

use log::debug;
use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::frame::{float_values, set_float, string_values};
use crate::sources::read::{list_files, read_csv_text, require_column, with_keys};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "HarmonizedNTL";
const CODE: &str = "iso";
const RADIANCE: &str = "nlsum";

#[derive(Debug, Clone, Copy)]
pub struct NightLights;

impl Normalizer for NightLights {
    fn name(&self) -> &'static str {
        "Nighttime lights"
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![COL::NTL_RADIANCE, COL::NTL_GROWTH]
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let dir = ctx.config.source_path(DIR);
        let files = list_files(&dir, &["csv"])?;
        let dmsp = find_series(&files, "DMSP");
        let viirs = find_series(&files, "VIIRS");
        if dmsp.is_none() && viirs.is_none() {
            return Err(ResilienceError::MissingFile(dir.join("DMSP-*.csv")));
        }
        let cutover = ctx.config.ntl_cutover_year;
        let mut frames = Vec::new();
        if let Some(path) = dmsp {
            frames.push(annual(read_series(&path, ctx)?.filter(col(COL::YEAR).lt(lit(cutover)))));
        }
        if let Some(path) = viirs {
            frames.push(annual(read_series(&path, ctx)?.filter(col(COL::YEAR).gt_eq(lit(cutover)))));
        }
        let combined = concat(frames, UnionArgs::default())?
            .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
            .collect()?;
        with_growth(combined)
    }
}

fn find_series(files: &[PathBuf], prefix: &str) -> Option<PathBuf> {
    files
        .iter()
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.to_uppercase().starts_with(prefix))
                .unwrap_or(false)
        })
        .cloned()
}

fn read_series(path: &Path, ctx: &SourceContext) -> Result<LazyFrame> {
    debug!("Reading nighttime lights from {}", path.display());
    let df = read_csv_text(path, 0)?;
    require_column(&df, "Nighttime lights", RADIANCE)?;
    let df = with_keys(df, CODE, COL::YEAR, ctx)?;
    Ok(df.lazy().select([
        col(COL::ISO3),
        col(COL::YEAR),
        col(RADIANCE).cast(DataType::Float64).alias(COL::NTL_RADIANCE),
    ]))
}

/// Average sub-annual observations to one value per country-year.
fn annual(df: LazyFrame) -> LazyFrame {
    df.group_by([col(COL::ISO3), col(COL::YEAR)])
        .agg([col(COL::NTL_RADIANCE).mean()])
}

/// Year-over-year percentage change of radiance within each country. Expects rows sorted by
/// (iso3, year).
pub fn with_growth(mut df: DataFrame) -> Result<DataFrame> {
    let codes = string_values(&df, COL::ISO3)?;
    let radiance = float_values(&df, COL::NTL_RADIANCE)?;
    let growth = (0..df.height())
        .map(|idx| {
            if idx == 0 || codes[idx].is_none() || codes[idx] != codes[idx - 1] {
                return None;
            }
            match (radiance[idx - 1], radiance[idx]) {
                (Some(previous), Some(current)) if previous != 0.0 => {
                    Some((current - previous) / previous * 100.0)
                }
                _ => None,
            }
        })
        .collect();
    set_float(&mut df, COL::NTL_GROWTH, growth)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use std::fs;

    #[test]
    fn growth_is_computed_within_country() -> anyhow::Result<()> {
        let df = df!(
            COL::ISO3 => &["AAA", "AAA", "BBB"],
            COL::YEAR => &[2010, 2011, 2011],
            COL::NTL_RADIANCE => &[100.0, 110.0, 50.0],
        )?;
        let out = with_growth(df)?;
        let growth = float_values(&out, COL::NTL_GROWTH)?;
        assert_eq!(growth[0], None);
        assert!((growth[1].unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(growth[2], None);
        Ok(())
    }

    #[test]
    fn methodologies_are_concatenated_at_the_cutover() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let ntl = dir.path().join(DIR);
        fs::create_dir_all(&ntl)?;
        fs::write(
            ntl.join("DMSP-OLS-nighttime-lights-1992to2013-level0.csv"),
            "iso,year,nlsum\nUSA,2012,100\nUSA,2013,999\n",
        )?;
        fs::write(
            ntl.join("VIIRS-nighttime-lights-2013m1to2024m5-level0.csv"),
            "iso,year,month,nlsum\nUSA,2013,1,10\nUSA,2013,2,30\n",
        )?;
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let resolver = CountryResolver::new(&config);
        let out = NightLights.load(&SourceContext::new(&config, &resolver))?;
        assert_eq!(out.height(), 2);
        assert_eq!(
            float_values(&out, COL::NTL_RADIANCE)?,
            vec![Some(100.0), Some(20.0)]
        );
        assert_eq!(float_values(&out, COL::NTL_GROWTH)?[1], Some(-80.0));
        Ok(())
    }
}
