//! Left-join every normalized source onto the spine and enforce the key invariants.

use std::collections::BTreeMap;

use log::{debug, error, info};
use polars::prelude::*;

use crate::config::Config;
use crate::error::Result;
use crate::frame::{data_columns, int_values, string_values};
use crate::COL;

/// What happened during the merge, for the validation report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeSummary {
    pub spine_rows: usize,
    /// (source, number of columns added)
    pub merged: Vec<(String, usize)>,
    /// (source, reason)
    pub skipped: Vec<(String, String)>,
    pub dropped_null_code: usize,
    pub dropped_out_of_range: usize,
    /// (iso3, year, occurrences) for every key seen more than once.
    pub duplicate_keys: Vec<(String, i32, usize)>,
}

fn with_typed_keys(df: &DataFrame) -> Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .with_columns([
            col(COL::ISO3).cast(DataType::String),
            col(COL::YEAR).cast(DataType::Int32),
        ])
        .collect()?)
}

/// Join `sources` in order onto `spine`, then drop rows with a null code or a year outside
/// the configured range and sort by key. Duplicate keys are reported, never removed.
pub fn merge(
    spine: &DataFrame,
    sources: &[(&str, &DataFrame)],
    config: &Config,
) -> Result<(DataFrame, MergeSummary)> {
    let mut summary = MergeSummary {
        spine_rows: spine.height(),
        ..MergeSummary::default()
    };
    let mut merged = with_typed_keys(spine)?;
    info!("Spine: {} rows", merged.height());

    for (name, table) in sources {
        let columns = data_columns(table);
        if columns.is_empty() {
            info!("Skipped {name}: no data columns");
            summary.skipped.push((name.to_string(), "no data columns".into()));
            continue;
        }
        if table.height() == 0 {
            info!("Skipped {name}: no rows");
            summary.skipped.push((name.to_string(), "no rows".into()));
            continue;
        }
        let right = with_typed_keys(table)?;
        merged = merged.join(
            &right,
            [COL::ISO3, COL::YEAR],
            [COL::ISO3, COL::YEAR],
            JoinArgs::new(JoinType::Left),
        )?;
        debug!("Merged {name}: +{} columns ({} total)", columns.len(), merged.width());
        summary.merged.push((name.to_string(), columns.len()));
    }

    let codes = string_values(&merged, COL::ISO3)?;
    let years = int_values(&merged, COL::YEAR)?;
    let mut keep = Vec::with_capacity(merged.height());
    for (code, year) in codes.iter().zip(&years) {
        let in_range = year.map_or(false, |year| config.in_range(year));
        if code.is_none() {
            summary.dropped_null_code += 1;
        } else if !in_range {
            summary.dropped_out_of_range += 1;
        }
        keep.push(code.is_some() && in_range);
    }
    let merged = merged
        .filter(&BooleanChunked::from_slice("keep", &keep))?
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())?;
    info!(
        "Merged table: {} rows, {} columns ({} dropped for null code, {} out of range)",
        merged.height(),
        merged.width(),
        summary.dropped_null_code,
        summary.dropped_out_of_range
    );

    summary.duplicate_keys = duplicate_keys(&merged)?;
    if !summary.duplicate_keys.is_empty() {
        error!(
            "{} duplicate (iso3, year) keys after merge",
            summary.duplicate_keys.len()
        );
    }
    Ok((merged, summary))
}

pub fn duplicate_keys(df: &DataFrame) -> Result<Vec<(String, i32, usize)>> {
    let mut counts: BTreeMap<(String, i32), usize> = BTreeMap::new();
    let codes = string_values(df, COL::ISO3)?;
    let years = int_values(df, COL::YEAR)?;
    for (code, year) in codes.into_iter().zip(years) {
        if let (Some(code), Some(year)) = (code, year) {
            *counts.entry((code, year)).or_default() += 1;
        }
    }
    Ok(counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((code, year), count)| (code, year, count))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{empty_keyed, float_values};

    #[test]
    fn left_join_keeps_every_spine_row() -> anyhow::Result<()> {
        let spine = df!(
            COL::ISO3 => &["AAA", "BBB"],
            COL::YEAR => &[2010, 2010],
        )?;
        let source = df!(
            COL::ISO3 => &["AAA"],
            COL::YEAR => &[2010],
            "value" => &[100.0],
        )?;
        let (merged, summary) = merge(&spine, &[("test", &source)], &Config::default())?;
        assert_eq!(merged.height(), 2);
        assert_eq!(float_values(&merged, "value")?, vec![Some(100.0), None]);
        assert_eq!(summary.merged, vec![("test".to_string(), 1)]);
        Ok(())
    }

    #[test]
    fn empty_and_columnless_sources_are_skipped() -> anyhow::Result<()> {
        let spine = df!(COL::ISO3 => &["AAA"], COL::YEAR => &[2010])?;
        let keys_only = df!(COL::ISO3 => &["AAA"], COL::YEAR => &[2010])?;
        let empty = empty_keyed(&["x"]);
        let (merged, summary) = merge(
            &spine,
            &[("keys", &keys_only), ("empty", &empty)],
            &Config::default(),
        )?;
        assert_eq!(merged.width(), 2);
        assert_eq!(summary.skipped.len(), 2);
        Ok(())
    }

    #[test]
    fn invalid_rows_are_dropped_and_counted() -> anyhow::Result<()> {
        let spine = df!(
            COL::ISO3 => &[Some("ZZZ"), None, Some("AAA"), Some("AAA")],
            COL::YEAR => &[2010, 2010, 1999, 2001],
        )?;
        let (merged, summary) = merge(&spine, &[], &Config::default())?;
        assert_eq!(merged.height(), 2);
        assert_eq!(
            string_values(&merged, COL::ISO3)?,
            vec![Some("AAA".to_string()), Some("ZZZ".to_string())]
        );
        assert_eq!(summary.dropped_null_code, 1);
        assert_eq!(summary.dropped_out_of_range, 1);
        Ok(())
    }

    #[test]
    fn duplicate_keys_are_flagged_not_removed() -> anyhow::Result<()> {
        let spine = df!(COL::ISO3 => &["AAA"], COL::YEAR => &[2010])?;
        let source = df!(
            COL::ISO3 => &["AAA", "AAA"],
            COL::YEAR => &[2010, 2010],
            "value" => &[1.0, 2.0],
        )?;
        let (merged, summary) = merge(&spine, &[("dup", &source)], &Config::default())?;
        assert_eq!(merged.height(), 2);
        assert_eq!(summary.duplicate_keys, vec![("AAA".to_string(), 2010, 2)]);
        Ok(())
    }
}
