//! Small helpers for moving columns between polars and plain vectors.

use polars::prelude::*;

use crate::error::Result;
use crate::COL;

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|column| *column == name)
}

/// Column as `f64`, with nulls for unparseable cells. A missing column reads as all null.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let series = df.column(name)?.cast(&DataType::Int32)?;
    Ok(series.i32()?.into_iter().collect())
}

pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let series = df.column(name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Add or replace a float column.
pub fn set_float(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name, values))?;
    Ok(())
}

pub fn set_string(df: &mut DataFrame, name: &str, values: Vec<Option<String>>) -> Result<()> {
    df.with_column(Series::new(name, values))?;
    Ok(())
}

/// An empty table with the key columns and the given float columns.
pub fn empty_keyed(columns: &[&str]) -> DataFrame {
    let mut series = vec![
        Series::new_empty(COL::ISO3, &DataType::String),
        Series::new_empty(COL::YEAR, &DataType::Int32),
    ];
    series.extend(
        columns
            .iter()
            .map(|name| Series::new_empty(name, &DataType::Float64)),
    );
    DataFrame::new(series).unwrap_or_default()
}

/// Columns of `df` other than the (iso3, year) key.
pub fn data_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| *name != COL::ISO3 && *name != COL::YEAR)
        .map(str::to_string)
        .collect()
}

/// Distinct non-null values of a string column.
pub fn distinct_count(values: &[Option<String>]) -> usize {
    values
        .iter()
        .flatten()
        .collect::<std::collections::HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_values_nulls_placeholders() -> anyhow::Result<()> {
        let df = df!("x" => &["1.5", "..", ""])?;
        assert_eq!(float_values(&df, "x")?, vec![Some(1.5), None, None]);
        assert_eq!(float_values(&df, "missing")?, vec![None, None, None]);
        Ok(())
    }

    #[test]
    fn empty_keyed_has_typed_keys() {
        let df = empty_keyed(&["a"]);
        assert_eq!(df.height(), 0);
        assert_eq!(data_columns(&df), vec!["a".to_string()]);
        assert_eq!(df.column(COL::YEAR).unwrap().dtype(), &DataType::Int32);
    }
}
