//! Shared readers and reshaping helpers used by the normalizers.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;
use polars::prelude::*;
use regex::Regex;

use crate::error::{ResilienceError, Result};
use crate::frame::{set_string, string_values};
use crate::sources::SourceContext;
use crate::COL;

pub const INDICATOR: &str = "indicator";
pub const VALUE: &str = "value";

pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ResilienceError::MissingFile(path.to_path_buf()))
    }
}

/// Files directly inside `dir` with one of `extensions`, sorted by name.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    ensure_exists(dir)?;
    let mut files = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted)))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// `path` if it exists, otherwise the first file in its directory with the same extension.
pub fn preferred_or_first(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("csv");
    let dir = path.parent().unwrap_or(Path::new("."));
    list_files(dir, &[extension])
        .ok()
        .and_then(|files| files.into_iter().next())
        .ok_or_else(|| ResilienceError::MissingFile(path.to_path_buf()))
}

fn trim_headers(mut df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_string())
        .collect();
    df.set_column_names(&names)?;
    Ok(df)
}

/// Read a delimited file with every column as text.
///
/// `skip_rows_after_header` drops tag rows that some publishers place below the header.
pub fn read_csv_text(path: &Path, skip_rows_after_header: usize) -> Result<DataFrame> {
    ensure_exists(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_skip_rows_after_header(skip_rows_after_header)
        .map_parse_options(|options| options.with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!("Read {} ({} x {})", path.display(), df.height(), df.width());
    trim_headers(df)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.trim().is_empty() => None,
        other => Some(other.to_string().trim().to_string()),
    }
}

/// Read the first worksheet of a spreadsheet with the first row as header and every
/// column as text. Duplicate headers keep their first occurrence.
pub fn read_excel(path: &Path) -> Result<DataFrame> {
    ensure_exists(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ResilienceError::EmptyWorkbook(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&sheet)?;
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::default());
    };

    let mut seen = HashSet::new();
    let kept: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell_text(cell).unwrap_or_else(|| format!("column_{idx}"));
            (idx, name)
        })
        .filter(|(_, name)| seen.insert(name.clone()))
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); kept.len()];
    for row in rows {
        for (values, (idx, _)) in columns.iter_mut().zip(&kept) {
            values.push(row.get(*idx).and_then(cell_text));
        }
    }
    let series = kept
        .iter()
        .zip(columns)
        .map(|((_, name), values)| Series::new(name, values))
        .collect::<Vec<_>>();
    let df = DataFrame::new(series)?;
    debug!("Read {} sheet {sheet} ({} x {})", path.display(), df.height(), df.width());
    Ok(df)
}

/// Find a column by a case-insensitive predicate on its trimmed name.
pub fn find_column(df: &DataFrame, predicate: impl Fn(&str) -> bool) -> Option<String> {
    df.get_column_names()
        .into_iter()
        .find(|name| predicate(&name.trim().to_lowercase()))
        .map(str::to_string)
}

pub fn require_column(df: &DataFrame, source: &str, column: &str) -> Result<()> {
    if df.get_column_names().iter().any(|name| *name == column) {
        Ok(())
    } else {
        Err(ResilienceError::missing_column(source, column))
    }
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(1[89]\d{2}|20\d{2})").expect("valid year pattern"))
}

/// Parse a year from an integer, a float such as `2015.0` or a date-like string.
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = raw.parse::<f64>() {
        return (value.is_finite() && value.fract() == 0.0).then_some(value as i32);
    }
    year_pattern()
        .find(raw)
        .and_then(|found| found.as_str().parse().ok())
}

/// Headers that are a bare 4-digit year inside the configured range.
pub fn year_columns(df: &DataFrame, ctx: &SourceContext) -> Vec<(String, i32)> {
    df.get_column_names()
        .into_iter()
        .filter_map(|name| {
            let trimmed = name.trim();
            if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let year: i32 = trimmed.parse().ok()?;
            ctx.config.in_range(year).then(|| (name.to_string(), year))
        })
        .collect()
}

/// Headers of the form `<prefix>_YYYY` with the year inside the configured range.
pub fn prefixed_year_columns(df: &DataFrame, prefix: &str, ctx: &SourceContext) -> Vec<(String, i32)> {
    let Ok(pattern) = Regex::new(&format!(r"^{}_(\d{{4}})$", regex::escape(prefix))) else {
        return vec![];
    };
    df.get_column_names()
        .into_iter()
        .filter_map(|name| {
            let year: i32 = pattern.captures(name)?.get(1)?.as_str().parse().ok()?;
            ctx.config.in_range(year).then(|| (name.to_string(), year))
        })
        .collect()
}

/// Reshape year columns into long rows of (ids.., year, value), tagging each row with
/// `indicator` when given.
pub fn melt(
    df: &DataFrame,
    id_columns: &[&str],
    year_columns: &[(String, i32)],
    indicator: Option<&str>,
) -> Vec<LazyFrame> {
    year_columns
        .iter()
        .map(|(header, year)| {
            let mut exprs: Vec<Expr> = id_columns.iter().map(|id| col(id)).collect();
            exprs.push(lit(*year).alias(COL::YEAR));
            exprs.push(col(header).cast(DataType::Float64).alias(VALUE));
            if let Some(indicator) = indicator {
                exprs.push(lit(indicator).alias(INDICATOR));
            }
            df.clone().lazy().select(exprs)
        })
        .collect()
}

/// Concatenate long frames, or `None` when there is nothing to concatenate.
pub fn stack(frames: Vec<LazyFrame>) -> Result<Option<DataFrame>> {
    if frames.is_empty() {
        return Ok(None);
    }
    Ok(Some(concat(frames, UnionArgs::default())?.collect()?))
}

/// Replace raw country and year columns by resolved `iso3` and integer `year` keys.
///
/// Rows whose year is missing or outside the configured range are dropped. Unresolvable
/// countries stay in the table with a null code and are counted on the context; the merge
/// drops them.
pub fn with_keys(
    df: DataFrame,
    code_column: &str,
    year_column: &str,
    ctx: &SourceContext,
) -> Result<DataFrame> {
    let mut cache: HashMap<String, Option<String>> = HashMap::new();
    let codes: Vec<Option<String>> = string_values(&df, code_column)?
        .into_iter()
        .map(|raw| {
            let raw = raw?;
            cache
                .entry(raw.clone())
                .or_insert_with(|| ctx.resolver.code(&raw))
                .clone()
        })
        .collect();
    let years: Vec<Option<i32>> = string_values(&df, year_column)?
        .into_iter()
        .map(|raw| raw.as_deref().and_then(parse_year))
        .collect();
    let mask: Vec<bool> = years
        .iter()
        .map(|year| year.map_or(false, |year| ctx.config.in_range(year)))
        .collect();
    let unresolved = codes
        .iter()
        .zip(&mask)
        .filter(|(code, keep)| **keep && code.is_none())
        .count();
    if unresolved > 0 {
        let names: Vec<&String> = cache
            .iter()
            .filter(|(_, code)| code.is_none())
            .map(|(raw, _)| raw)
            .collect();
        debug!("{unresolved} rows without a country code; unresolved names: {names:?}");
        ctx.note_unresolved(unresolved);
    }

    let mut df = df;
    for raw in [code_column, year_column] {
        if raw != COL::ISO3 && raw != COL::YEAR && df.get_column_names().contains(&raw) {
            df = df.drop(raw)?;
        }
    }
    set_string(&mut df, COL::ISO3, codes)?;
    df.with_column(Series::new(COL::YEAR, years))?;
    let df = df.filter(&BooleanChunked::from_slice("in_range", &mask))?;
    keys_first(df)
}

/// Move the (iso3, year) key to the front.
pub fn keys_first(df: DataFrame) -> Result<DataFrame> {
    let mut order = vec![COL::ISO3.to_string(), COL::YEAR.to_string()];
    order.extend(crate::frame::data_columns(&df));
    Ok(df.select(order)?)
}

/// Pivot a long (iso3, year, indicator, value) table so that each allow-listed indicator
/// becomes a column named by `mapping`. Duplicate observations are averaged.
pub fn pivot_indicators(long: LazyFrame, mapping: &[(&str, &str)]) -> Result<DataFrame> {
    let aggregations: Vec<Expr> = mapping
        .iter()
        .map(|(code, name)| {
            col(VALUE)
                .filter(col(INDICATOR).eq(lit(*code)))
                .mean()
                .alias(name)
        })
        .collect();
    Ok(long
        .group_by([col(COL::ISO3), col(COL::YEAR)])
        .agg(aggregations)
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
        .collect()?)
}

/// Keep only rows whose `column` is in `allowed`.
pub fn filter_allowed(df: LazyFrame, column: &str, allowed: &[&str]) -> LazyFrame {
    let allowed = Series::new("allowed", allowed);
    df.filter(col(column).is_in(lit(allowed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::country::CountryResolver;
    use crate::frame::{float_values, int_values};

    #[test]
    fn parses_years_from_mixed_text() {
        assert_eq!(parse_year("2015"), Some(2015));
        assert_eq!(parse_year("2015.0"), Some(2015));
        assert_eq!(parse_year("2015-03-01 00:00:00"), Some(2015));
        assert_eq!(parse_year("03/01/2016"), Some(2016));
        assert_eq!(parse_year("2015.5"), None);
        assert_eq!(parse_year("unknown"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn wide_to_long_reshape() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let df = df!(
            "ISO3" => &["AFG", "ALB", "DZA"],
            "Name" => &["Afghanistan", "Albania", "Algeria"],
            "2010" => &["1.0", "2.0", ".."],
            "2011" => &["4.0", "5.0", "6.0"],
            "1995" => &["0.0", "0.0", "0.0"],
        )?;
        let years = year_columns(&df, &ctx);
        assert_eq!(years.len(), 2);
        let long = stack(melt(&df, &["ISO3"], &years, None))?.unwrap();
        assert_eq!(long.height(), 6);
        assert_eq!(long.column(COL::YEAR)?.dtype(), &DataType::Int32);
        let mut years = int_values(&long, COL::YEAR)?;
        years.sort();
        assert_eq!(
            years,
            vec![Some(2010), Some(2010), Some(2010), Some(2011), Some(2011), Some(2011)]
        );
        assert_eq!(float_values(&long, VALUE)?.iter().filter(|v| v.is_none()).count(), 1);
        Ok(())
    }

    #[test]
    fn with_keys_resolves_and_filters_years() -> anyhow::Result<()> {
        let config = Config::default();
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let df = df!(
            "Country" => &["United States", "N/A", "Brazil", "Brazil", "Atlantis", "Atlantis"],
            "Year" => &["2010", "2011", "1990", "2030", "2012", "1980"],
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )?;
        let keyed = with_keys(df, "Country", "Year", &ctx)?;
        assert_eq!(keyed.get_column_names(), vec![COL::ISO3, COL::YEAR, "x"]);
        assert_eq!(keyed.height(), 3);
        assert_eq!(
            string_values(&keyed, COL::ISO3)?,
            vec![Some("USA".to_string()), None, None]
        );
        // Out-of-range rows are not counted as unresolved.
        assert_eq!(ctx.take_unresolved(), 2);
        Ok(())
    }

    #[test]
    fn pivot_keeps_allow_listed_indicators() -> anyhow::Result<()> {
        let long = df!(
            COL::ISO3 => &["AAA", "AAA", "AAA", "BBB"],
            COL::YEAR => &[2010, 2010, 2010, 2010],
            INDICATOR => &["a", "b", "zzz", "a"],
            VALUE => &[1.0, 2.0, 3.0, 4.0],
        )?;
        let wide = pivot_indicators(long.lazy(), &[("a", "alpha"), ("b", "beta")])?;
        assert_eq!(wide.get_column_names(), vec![COL::ISO3, COL::YEAR, "alpha", "beta"]);
        assert_eq!(float_values(&wide, "alpha")?, vec![Some(1.0), Some(4.0)]);
        assert_eq!(float_values(&wide, "beta")?, vec![Some(2.0), None]);
        Ok(())
    }

    #[test]
    fn excel_reader_reports_missing_file() -> anyhow::Result<()> {
        let err = read_excel(Path::new("/definitely/missing.xlsx")).unwrap_err();
        assert!(matches!(err, ResilienceError::MissingFile(_)));
        Ok(())
    }
}
