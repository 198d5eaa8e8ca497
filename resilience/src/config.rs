use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::country::DEFAULT_ALIASES;
use crate::enrich::DEFAULT_REGIONS;

/// Income bracket upper bounds (GDP per capita, USD).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IncomeThresholds {
    pub low: f64,
    pub lower_middle: f64,
    pub upper_middle: f64,
}

impl Default for IncomeThresholds {
    fn default() -> Self {
        IncomeThresholds {
            low: 1085.0,
            lower_middle: 4255.0,
            upper_middle: 13205.0,
        }
    }
}

/// Ordinal weight per alert level. Unknown or missing levels use `green`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SeverityWeights {
    pub green: f64,
    pub orange: f64,
    pub red: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        SeverityWeights {
            green: 1.0,
            orange: 2.0,
            red: 3.0,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, alert_level: Option<&str>) -> f64 {
        match alert_level.map(|level| level.trim().to_uppercase()).as_deref() {
            Some("RED") => self.red,
            Some("ORANGE") => self.orange,
            _ => self.green,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub unified_file: String,
    pub coverage_file: String,
    pub validation_file: String,
    pub year_start: i32,
    pub year_end: i32,
    pub dii_affected_weight: f64,
    pub recovery_window: usize,
    pub fuzzy_threshold: f64,
    pub wdi_chunk_size: usize,
    pub ntl_cutover_year: i32,
    pub income_thresholds: IncomeThresholds,
    pub severity_weights: SeverityWeights,
    pub region_lookup: BTreeMap<String, String>,
    pub alias_table: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            unified_file: "unified_resilience_dataset.csv".into(),
            coverage_file: "coverage_matrix.csv".into(),
            validation_file: "validation_report.txt".into(),
            year_start: 2000,
            year_end: 2024,
            dii_affected_weight: 4.0,
            recovery_window: 3,
            fuzzy_threshold: 0.88,
            wdi_chunk_size: 50_000,
            ntl_cutover_year: 2013,
            income_thresholds: IncomeThresholds::default(),
            severity_weights: SeverityWeights::default(),
            region_lookup: DEFAULT_REGIONS
                .iter()
                .map(|(code, region)| (code.to_string(), region.to_string()))
                .collect(),
            alias_table: DEFAULT_ALIASES
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        }
    }
}

impl Config {
    pub fn in_range(&self, year: i32) -> bool {
        (self.year_start..=self.year_end).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.year_start..=self.year_end
    }

    pub fn source_path<P: AsRef<Path>>(&self, sub_path: P) -> PathBuf {
        self.data_dir.join(sub_path)
    }

    pub fn unified_path(&self) -> PathBuf {
        self.output_dir.join(&self.unified_file)
    }

    pub fn coverage_path(&self) -> PathBuf {
        self.output_dir.join(&self.coverage_file)
    }

    pub fn validation_path(&self) -> PathBuf {
        self.output_dir.join(&self.validation_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_every_constant() {
        let config = Config::default();
        assert_eq!(config.year_start, 2000);
        assert_eq!(config.year_end, 2024);
        assert_eq!(config.dii_affected_weight, 4.0);
        assert_eq!(config.income_thresholds.upper_middle, 13205.0);
        assert_eq!(config.region_lookup.get("HKG").map(String::as_str), Some("Asia"));
        assert_eq!(
            config.alias_table.get("UNITED STATES").map(String::as_str),
            Some("USA")
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() -> anyhow::Result<()> {
        let config: Config = toml::from_str("year_start = 2005\n[severity_weights]\nred = 5.0\n")?;
        assert_eq!(config.year_start, 2005);
        assert_eq!(config.year_end, 2024);
        assert_eq!(config.severity_weights.red, 5.0);
        assert_eq!(config.severity_weights.orange, 2.0);
        Ok(())
    }

    #[test]
    fn unknown_alert_levels_use_lowest_weight() {
        let weights = SeverityWeights::default();
        assert_eq!(weights.weight(Some("red")), 3.0);
        assert_eq!(weights.weight(Some(" Orange ")), 2.0);
        assert_eq!(weights.weight(Some("purple")), 1.0);
        assert_eq!(weights.weight(None), 1.0);
    }
}
