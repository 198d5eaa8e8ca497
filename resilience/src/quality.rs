//! Coverage statistics and the human-readable validation report.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use chrono::Local;
use itertools::Itertools;
use polars::prelude::*;

use crate::config::Config;
use crate::error::Result;
use crate::frame::{data_columns, distinct_count, float_values, int_values, string_values};
use crate::merge::MergeSummary;
use crate::registry::is_known_code;
use crate::sources::{SourceOutcome, SourceRun};
use crate::COL;

/// Columns whose per-year coverage is reported individually.
pub const CRITICAL_COLUMNS: [&str; 7] = [
    COL::POPULATION,
    COL::GDP_PER_CAPITA_BEST,
    COL::HDI,
    COL::NDGAIN_SCORE,
    COL::DII,
    COL::RRS,
    COL::CRI,
];

/// How many examples to list for each flag.
const EXAMPLES: usize = 10;
const RULE: &str =
    "================================================================================";

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRow {
    pub variable: String,
    pub total_obs: usize,
    pub non_null_obs: usize,
    pub coverage_pct: f64,
    pub countries_covered: usize,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// One row per column other than the key, sorted by coverage (highest first).
pub fn coverage_rows(df: &DataFrame) -> Result<Vec<CoverageRow>> {
    let codes = string_values(df, COL::ISO3)?;
    let years = int_values(df, COL::YEAR)?;
    let total = df.height();
    let mut rows = Vec::new();
    for name in data_columns(df) {
        let mask = df.column(&name)?.is_not_null();
        let mut covered = BTreeSet::new();
        let mut covered_years = Vec::new();
        for (row, present) in mask.into_iter().enumerate() {
            if present != Some(true) {
                continue;
            }
            if let Some(code) = &codes[row] {
                covered.insert(code.as_str());
            }
            covered_years.extend(years[row]);
        }
        let non_null = present_count(df, &name)?;
        rows.push(CoverageRow {
            variable: name,
            total_obs: total,
            non_null_obs: non_null,
            coverage_pct: round2(percent(non_null, total)),
            countries_covered: covered.len(),
            year_min: covered_years.iter().min().copied(),
            year_max: covered_years.iter().max().copied(),
        });
    }
    // Stable, so ties keep table order.
    rows.sort_by(|a, b| b.coverage_pct.total_cmp(&a.coverage_pct));
    Ok(rows)
}

fn present_count(df: &DataFrame, name: &str) -> Result<usize> {
    let column = df.column(name)?;
    Ok(column.len() - column.null_count())
}

pub fn coverage_frame(rows: &[CoverageRow]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Series::new(
            COL::COVERAGE_VARIABLE,
            rows.iter().map(|row| row.variable.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::COVERAGE_TOTAL_OBS,
            rows.iter().map(|row| row.total_obs as u64).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::COVERAGE_NON_NULL_OBS,
            rows.iter().map(|row| row.non_null_obs as u64).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::COVERAGE_PCT,
            rows.iter().map(|row| row.coverage_pct).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::COVERAGE_COUNTRIES,
            rows.iter()
                .map(|row| row.countries_covered as u64)
                .collect::<Vec<_>>(),
        ),
        Series::new(
            COL::COVERAGE_YEAR_MIN,
            rows.iter().map(|row| row.year_min).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::COVERAGE_YEAR_MAX,
            rows.iter().map(|row| row.year_max).collect::<Vec<_>>(),
        ),
    ])?)
}

/// The coverage matrix of a finished table.
pub fn coverage(df: &DataFrame) -> Result<DataFrame> {
    coverage_frame(&coverage_rows(df)?)
}

/// Everything the validation report draws on.
pub struct ReportInputs<'a> {
    pub table: &'a DataFrame,
    pub coverage: &'a [CoverageRow],
    pub runs: &'a [SourceRun],
    pub merge: &'a MergeSummary,
    pub config: &'a Config,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flags {
    pub duplicate_keys: Vec<(String, i32, usize)>,
    pub non_standard_codes: Vec<String>,
    pub missing_years: Vec<i32>,
    /// (iso3, years absent between the country's first and last year)
    pub country_gaps: Vec<(String, Vec<i32>)>,
}

/// A code is standard when it is three upper-case letters in the registry.
pub fn is_standard_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) && is_known_code(code)
}

pub fn flags(df: &DataFrame, merge: &MergeSummary, config: &Config) -> Result<Flags> {
    let codes = string_values(df, COL::ISO3)?;
    let years = int_values(df, COL::YEAR)?;

    let non_standard_codes = codes
        .iter()
        .flatten()
        .filter(|code| !is_standard_code(code))
        .unique()
        .cloned()
        .sorted()
        .collect();

    let present: BTreeSet<i32> = years.iter().flatten().copied().collect();
    let missing_years = config
        .years()
        .filter(|year| !present.contains(year))
        .collect();

    let mut by_country: BTreeMap<&str, BTreeSet<i32>> = BTreeMap::new();
    for (code, year) in codes.iter().zip(&years) {
        if let (Some(code), Some(year)) = (code, year) {
            by_country.entry(code.as_str()).or_default().insert(*year);
        }
    }
    let country_gaps = by_country
        .into_iter()
        .filter_map(|(code, years)| {
            let (first, last) = (*years.first()?, *years.last()?);
            let gaps: Vec<i32> = (first..=last).filter(|y| !years.contains(y)).collect();
            (!gaps.is_empty()).then(|| (code.to_string(), gaps))
        })
        .collect();

    Ok(Flags {
        duplicate_keys: merge.duplicate_keys.clone(),
        non_standard_codes,
        missing_years,
        country_gaps,
    })
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |value| format!("{value:.4}"))
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn write_sources(out: &mut String, runs: &[SourceRun]) -> std::fmt::Result {
    section(out, "SOURCE STATUS")?;
    for run in runs {
        let status = match &run.outcome {
            SourceOutcome::Loaded {
                rows,
                countries,
                unresolved,
            } => format!(
                "loaded  {rows} rows, {countries} countries, {unresolved} unresolved rows dropped"
            ),
            SourceOutcome::Empty { reason } => format!("empty   {reason}"),
            SourceOutcome::Failed { error } => format!("FAILED  {error}"),
        };
        writeln!(out, "  {:<16} {status}", run.name)?;
    }
    Ok(())
}

fn write_merge(out: &mut String, merge: &MergeSummary) -> std::fmt::Result {
    section(out, "MERGE SUMMARY")?;
    writeln!(out, "  Spine rows: {}", merge.spine_rows)?;
    for (name, columns) in &merge.merged {
        writeln!(out, "  merged  {name:<16} +{columns} columns")?;
    }
    for (name, reason) in &merge.skipped {
        writeln!(out, "  skipped {name:<16} {reason}")?;
    }
    writeln!(out, "  Rows dropped (null country code): {}", merge.dropped_null_code)?;
    writeln!(
        out,
        "  Rows dropped (year out of range): {}",
        merge.dropped_out_of_range
    )
}

fn write_indices(out: &mut String, df: &DataFrame) -> crate::error::Result<()> {
    section(out, "DERIVED INDICES")?;
    for name in COL::INDEX_COLUMNS {
        let values: Vec<f64> = float_values(df, name)?.into_iter().flatten().collect();
        let min = values.iter().copied().reduce(f64::min);
        let max = values.iter().copied().reduce(f64::max);
        let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
        writeln!(
            out,
            "  {name:<16} coverage {:>6.2}%  range [{}, {}]  mean {}",
            percent(values.len(), df.height()),
            fmt_stat(min),
            fmt_stat(max),
            fmt_stat(mean)
        )?;
    }
    Ok(())
}

fn write_tiers(out: &mut String, coverage: &[CoverageRow]) -> std::fmt::Result {
    section(out, "COVERAGE TIERS")?;
    let tiers: [(&str, fn(f64) -> bool); 3] = [
        (">= 80%", |pct| pct >= 80.0),
        ("40-80%", |pct| (40.0..80.0).contains(&pct)),
        ("< 40%", |pct| pct < 40.0),
    ];
    for (label, in_tier) in tiers {
        let names = coverage
            .iter()
            .filter(|row| in_tier(row.coverage_pct))
            .map(|row| row.variable.as_str())
            .collect::<Vec<_>>();
        writeln!(out, "  {label:<7} {} variables", names.len())?;
        if !names.is_empty() {
            writeln!(out, "          {}", names.join(", "))?;
        }
    }
    Ok(())
}

fn write_families(out: &mut String, df: &DataFrame, runs: &[SourceRun]) -> Result<()> {
    section(out, "SOURCE COVERAGE AFTER MERGE")?;
    let codes = string_values(df, COL::ISO3)?;
    for run in runs {
        let columns: Vec<String> = data_columns(&run.table)
            .into_iter()
            .filter(|name| crate::frame::has_column(df, name))
            .collect();
        let mut has_data = vec![false; df.height()];
        for name in &columns {
            for (row, present) in df.column(name)?.is_not_null().into_iter().enumerate() {
                has_data[row] |= present == Some(true);
            }
        }
        let rows = has_data.iter().filter(|present| **present).count();
        let countries = distinct_count(
            &codes
                .iter()
                .zip(&has_data)
                .filter(|(_, present)| **present)
                .map(|(code, _)| code.clone())
                .collect::<Vec<_>>(),
        );
        writeln!(
            out,
            "  {:<16} {rows:>6} rows  {countries:>4} countries",
            run.name
        )?;
    }
    Ok(())
}

/// Years in which a critical column is non-null in less than half the rows.
pub fn sparse_years(df: &DataFrame) -> Result<Vec<(&'static str, Vec<i32>)>> {
    let years = int_values(df, COL::YEAR)?;
    let mut sparse = Vec::new();
    for name in CRITICAL_COLUMNS {
        if !crate::frame::has_column(df, name) {
            continue;
        }
        let values = float_values(df, name)?;
        let mut per_year: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
        for (year, value) in years.iter().zip(&values) {
            if let Some(year) = year {
                let entry = per_year.entry(*year).or_default();
                entry.0 += usize::from(value.is_some());
                entry.1 += 1;
            }
        }
        let below: Vec<i32> = per_year
            .into_iter()
            .filter(|(_, (present, total))| percent(*present, *total) < 50.0)
            .map(|(year, _)| year)
            .collect();
        sparse.push((name, below));
    }
    Ok(sparse)
}

fn write_regions(out: &mut String, df: &DataFrame) -> Result<()> {
    section(out, "REGIONAL DISTRIBUTION")?;
    let codes = string_values(df, COL::ISO3)?;
    let regions = string_values(df, COL::REGION)?;
    let mut by_region: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for (code, region) in codes.iter().zip(&regions) {
        if let Some(code) = code {
            let region = region.clone().unwrap_or_else(|| "(unmapped)".to_string());
            by_region.entry(region).or_default().insert(code.as_str());
        }
    }
    for (region, countries) in by_region {
        writeln!(out, "  {region:<12} {:>4} countries", countries.len())?;
    }
    Ok(())
}

fn examples<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().take(EXAMPLES).map(|item| item.to_string()).join(", ")
}

fn write_flags(out: &mut String, flags: &Flags) -> std::fmt::Result {
    section(out, "DATA QUALITY FLAGS")?;
    if flags.duplicate_keys.is_empty() {
        writeln!(out, "  Duplicate (iso3, year) keys: none")?;
    } else {
        writeln!(
            out,
            "  !! Duplicate (iso3, year) keys: {} (e.g. {})",
            flags.duplicate_keys.len(),
            examples(
                flags
                    .duplicate_keys
                    .iter()
                    .map(|(code, year, count)| format!("{code}/{year} x{count}"))
            )
        )?;
    }
    if flags.non_standard_codes.is_empty() {
        writeln!(out, "  Non-standard country codes: none")?;
    } else {
        writeln!(
            out,
            "  Non-standard country codes: {} ({})",
            flags.non_standard_codes.len(),
            examples(&flags.non_standard_codes)
        )?;
    }
    if flags.missing_years.is_empty() {
        writeln!(out, "  Missing years: none")?;
    } else {
        writeln!(out, "  Missing years: {}", examples(&flags.missing_years))?;
    }
    if flags.country_gaps.is_empty() {
        writeln!(out, "  Countries with year gaps: none")?;
    } else {
        writeln!(
            out,
            "  Countries with year gaps: {} (e.g. {})",
            flags.country_gaps.len(),
            examples(flags.country_gaps.iter().map(|(code, gaps)| {
                format!("{code}: {}", gaps.iter().join("/"))
            }))
        )?;
    }
    Ok(())
}

fn write_formulas(out: &mut String, config: &Config) -> std::fmt::Result {
    section(out, "FORMULA REFERENCE")?;
    let w = config.dii_affected_weight;
    writeln!(
        out,
        "  DII = ((fatalities_per_million + {w} * affected_pct) / gdp_per_capita_best) * severity"
    )?;
    writeln!(
        out,
        "        severity = mean GDACS alert weight (default 1); null without population or GDP"
    )?;
    writeln!(
        out,
        "  RRS = (norm(gdp_growth_change) + norm(hdi) + norm(governance)) / (1 + ln(1 + events) / 3)"
    )?;
    writeln!(
        out,
        "        missing normalized terms = 0.5; governance = wgi_composite, else wgi_gov_effectiveness"
    )?;
    writeln!(
        out,
        "  CRI = adaptive_capacity / (exposure / 10 + vulnerability + 0.001)"
    )?;
    writeln!(
        out,
        "        adaptive = ndgain_readiness, else (10 - inform_coping_capacity) / 10"
    )?;
    writeln!(
        out,
        "        exposure = inform_hazard, else norm(total_disaster_events) * 10"
    )?;
    writeln!(
        out,
        "        vulnerability = ndgain_vulnerability, else inform_vulnerability / 10"
    )?;
    writeln!(
        out,
        "  *_normalized = min-max(x) * 100 (DII clipped at 0, RRS and CRI to [0, 5]); flat = 50"
    )
}

/// Render the validation report.
pub fn validation_report(inputs: &ReportInputs) -> Result<String> {
    let df = inputs.table;
    let codes = string_values(df, COL::ISO3)?;
    let years: Vec<i32> = int_values(df, COL::YEAR)?.into_iter().flatten().collect();
    let mut out = String::new();

    writeln!(out, "{RULE}")?;
    writeln!(out, "UNIFIED RESILIENCE DATASET: VALIDATION REPORT")?;
    writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{RULE}")?;

    section(&mut out, "DATASET OVERVIEW")?;
    writeln!(out, "  Rows: {}", df.height())?;
    writeln!(out, "  Columns: {}", df.width())?;
    writeln!(out, "  Countries: {}", distinct_count(&codes))?;
    match (years.iter().min(), years.iter().max()) {
        (Some(first), Some(last)) => writeln!(out, "  Years: {first}-{last}")?,
        _ => writeln!(out, "  Years: none")?,
    }
    writeln!(
        out,
        "  Configured range: {}-{}",
        inputs.config.year_start, inputs.config.year_end
    )?;

    write_sources(&mut out, inputs.runs)?;
    write_merge(&mut out, inputs.merge)?;
    write_indices(&mut out, df)?;
    write_tiers(&mut out, inputs.coverage)?;
    write_families(&mut out, df, inputs.runs)?;

    section(&mut out, "YEARS BELOW 50% COVERAGE")?;
    for (name, below) in sparse_years(df)? {
        if below.is_empty() {
            writeln!(out, "  {name:<22} none")?;
        } else {
            writeln!(out, "  {name:<22} {}", below.iter().join(", "))?;
        }
    }

    write_regions(&mut out, df)?;
    write_flags(&mut out, &flags(df, inputs.merge, inputs.config)?)?;
    write_formulas(&mut out, inputs.config)?;
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> anyhow::Result<DataFrame> {
        Ok(df!(
            COL::ISO3 => &["AAA", "AAA", "BBB", "BBB"],
            COL::YEAR => &[2000, 2003, 2000, 2001],
            COL::REGION => &[Some("Africa"), Some("Africa"), None, None],
            "full" => &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            "half" => &[None, Some(2.0), None, Some(4.0)],
            "tie" => &[Some(1.0), None, None, Some(1.0)],
            COL::HDI => &[Some(0.5), None, None, Some(0.7)],
        )?)
    }

    #[test]
    fn coverage_counts_rows_countries_and_years() -> anyhow::Result<()> {
        let rows = coverage_rows(&table()?)?;
        let names: Vec<&str> = rows.iter().map(|row| row.variable.as_str()).collect();
        assert_eq!(names, vec!["full", COL::REGION, "half", "tie", COL::HDI]);

        let half = &rows[2];
        assert_eq!(half.total_obs, 4);
        assert_eq!(half.non_null_obs, 2);
        assert_eq!(half.coverage_pct, 50.0);
        assert_eq!(half.countries_covered, 2);
        assert_eq!((half.year_min, half.year_max), (Some(2001), Some(2003)));

        let frame = coverage_frame(&rows)?;
        assert_eq!(frame.height(), 5);
        assert_eq!(frame.get_column_names()[0], COL::COVERAGE_VARIABLE);
        Ok(())
    }

    #[test]
    fn coverage_rounds_to_two_decimals() -> anyhow::Result<()> {
        let df = df!(
            COL::ISO3 => &["AAA", "AAA", "AAA"],
            COL::YEAR => &[2000, 2001, 2002],
            "x" => &[Some(1.0), None, None],
        )?;
        assert_eq!(coverage_rows(&df)?[0].coverage_pct, 33.33);
        Ok(())
    }

    #[test]
    fn flags_report_codes_years_and_gaps() -> anyhow::Result<()> {
        let df = df!(
            COL::ISO3 => &["AAA", "AAA", "USA", "XKX"],
            COL::YEAR => &[2000, 2003, 2001, 2001],
        )?;
        let config = Config {
            year_start: 2000,
            year_end: 2004,
            ..Config::default()
        };
        let merge = MergeSummary {
            duplicate_keys: vec![("USA".into(), 2001, 2)],
            ..MergeSummary::default()
        };
        let flags = flags(&df, &merge, &config)?;
        assert_eq!(flags.non_standard_codes, vec!["AAA".to_string()]);
        assert_eq!(flags.missing_years, vec![2002, 2004]);
        assert_eq!(flags.country_gaps, vec![("AAA".to_string(), vec![2001, 2002])]);
        assert_eq!(flags.duplicate_keys.len(), 1);
        Ok(())
    }

    #[test]
    fn sparse_years_lists_years_under_half_coverage() -> anyhow::Result<()> {
        let sparse = sparse_years(&table()?)?;
        assert_eq!(sparse, vec![(COL::HDI, vec![2003])]);
        Ok(())
    }

    #[test]
    fn report_contains_every_section() -> anyhow::Result<()> {
        let df = table()?;
        let coverage = coverage_rows(&df)?;
        let config = Config::default();
        let merge = MergeSummary {
            spine_rows: 4,
            skipped: vec![("FTS".into(), "no rows".into())],
            ..MergeSummary::default()
        };
        let runs = [SourceRun {
            name: "Gini (WID)",
            outcome: SourceOutcome::Loaded {
                rows: 4,
                countries: 2,
                unresolved: 3,
            },
            table: DataFrame::empty(),
        }];
        let report = validation_report(&ReportInputs {
            table: &df,
            coverage: &coverage,
            runs: &runs,
            merge: &merge,
            config: &config,
        })?;
        for heading in [
            "DATASET OVERVIEW",
            "SOURCE STATUS",
            "MERGE SUMMARY",
            "DERIVED INDICES",
            "COVERAGE TIERS",
            "YEARS BELOW 50% COVERAGE",
            "REGIONAL DISTRIBUTION",
            "DATA QUALITY FLAGS",
            "FORMULA REFERENCE",
        ] {
            assert!(report.contains(heading), "{heading}");
        }
        assert!(report.contains("skipped FTS"));
        assert!(report.contains("3 unresolved rows dropped"));
        assert!(report.contains("(unmapped)"));
        Ok(())
    }
}
