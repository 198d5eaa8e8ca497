//! Derived composite indices: Disaster Impact (DII), Resilience Recovery (RRS) and
//! Composite Resilience (CRI), each raw and rescaled to [0, 100].
//!
//! Rows are expected sorted by (iso3, year) so that within-country differences and
//! trailing windows look at the previous years of the same country.

use log::info;
use polars::prelude::*;

use crate::config::Config;
use crate::error::Result;
use crate::frame::{float_values, int_values, set_float, string_values};
use crate::COL;

/// Neutral value for a missing normalized RRS term.
const NEUTRAL_TERM: f64 = 0.5;
/// Neutral hazard score (on the 0-10 scale) when a row has no hazard value.
const NEUTRAL_EXPOSURE: f64 = 5.0;
const CRI_EPSILON: f64 = 0.001;
const CLIP_MAX: f64 = 5.0;

/// Linear rescaling to [0, 1] over the non-null values. A flat column maps to 0.5.
pub fn min_max(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    });
    values
        .iter()
        .map(|value| {
            value.map(|value| {
                if max > min {
                    (value - min) / (max - min)
                } else {
                    0.5
                }
            })
        })
        .collect()
}

pub fn clip(values: &[Option<f64>], lower: f64, upper: f64) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|value| value.map(|value| value.clamp(lower, upper)))
        .collect()
}

fn scaled(values: &[Option<f64>]) -> Vec<Option<f64>> {
    min_max(values)
        .into_iter()
        .map(|value| value.map(|value| value * 100.0))
        .collect()
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value != 0.0)
}

fn divide(numerator: f64, denominator: f64) -> Option<f64> {
    let result = numerator / denominator;
    (denominator != 0.0 && result.is_finite()).then_some(result)
}

/// Difference with the previous row of the same country; null for a country's first row.
pub fn within_country_diff(codes: &[Option<String>], values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|row| {
            if row == 0 || codes[row].is_none() || codes[row] != codes[row - 1] {
                return None;
            }
            Some(values[row]? - values[row - 1]?)
        })
        .collect()
}

/// Sum of `values` over the trailing `window` years of the same country, current year included.
pub fn trailing_sum(
    codes: &[Option<String>],
    years: &[Option<i32>],
    values: &[Option<f64>],
    window: usize,
) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|row| {
            let year = years[row]?;
            let earliest = year - window.max(1) as i32 + 1;
            let mut total = None;
            let mut idx = row as isize;
            while idx >= 0 {
                let i = idx as usize;
                if codes[i] != codes[row] || years[i].map_or(true, |y| y < earliest) {
                    break;
                }
                if let Some(value) = values[i] {
                    total = Some(total.unwrap_or(0.0) + value);
                }
                idx -= 1;
            }
            total
        })
        .collect()
}

/// The inputs of every index formula, read once from the unified table.
struct Inputs {
    codes: Vec<Option<String>>,
    years: Vec<Option<i32>>,
    population: Vec<Option<f64>>,
    deaths: Vec<Option<f64>>,
    affected: Vec<Option<f64>>,
    gdp_per_capita: Vec<Option<f64>>,
    severity: Vec<Option<f64>>,
    gdp_growth: Vec<Option<f64>>,
    hdi: Vec<Option<f64>>,
    governance: Vec<Option<f64>>,
    events: Vec<Option<f64>>,
    readiness: Vec<Option<f64>>,
    coping: Vec<Option<f64>>,
    hazard: Vec<Option<f64>>,
    ndgain_vulnerability: Vec<Option<f64>>,
    inform_vulnerability: Vec<Option<f64>>,
}

impl Inputs {
    fn read(df: &DataFrame) -> Result<Self> {
        let composite = float_values(df, COL::WGI_COMPOSITE)?;
        let effectiveness = float_values(df, COL::WGI_GOV_EFFECTIVENESS)?;
        Ok(Inputs {
            codes: string_values(df, COL::ISO3)?,
            years: int_values(df, COL::YEAR)?,
            population: float_values(df, COL::POPULATION)?,
            deaths: float_values(df, COL::TOTAL_DISASTER_DEATHS)?,
            affected: float_values(df, COL::TOTAL_DISASTER_AFFECTED)?,
            gdp_per_capita: float_values(df, COL::GDP_PER_CAPITA_BEST)?,
            severity: float_values(df, COL::GDACS_SEVERITY_WEIGHT)?,
            gdp_growth: float_values(df, COL::GDP_GROWTH_BEST)?,
            hdi: float_values(df, COL::HDI)?,
            governance: composite
                .into_iter()
                .zip(effectiveness)
                .map(|(composite, effectiveness)| composite.or(effectiveness))
                .collect(),
            events: float_values(df, COL::TOTAL_DISASTER_EVENTS)?,
            readiness: float_values(df, COL::NDGAIN_READINESS)?,
            coping: float_values(df, COL::INFORM_COPING_CAPACITY)?,
            hazard: float_values(df, COL::INFORM_HAZARD)?,
            ndgain_vulnerability: float_values(df, COL::NDGAIN_VULNERABILITY)?,
            inform_vulnerability: float_values(df, COL::INFORM_VULNERABILITY)?,
        })
    }
}

pub struct DisasterImpact {
    pub fatalities_per_million: Vec<Option<f64>>,
    pub affected_pct: Vec<Option<f64>>,
    pub dii: Vec<Option<f64>>,
}

/// `DII = ((deaths per million + W * affected %) / GDP per capita) * severity`.
///
/// Null when population or GDP per capita is missing or zero. Missing deaths or affected
/// count as zero and a missing severity as 1.
pub fn disaster_impact(
    population: &[Option<f64>],
    deaths: &[Option<f64>],
    affected: &[Option<f64>],
    gdp_per_capita: &[Option<f64>],
    severity: &[Option<f64>],
    affected_weight: f64,
) -> DisasterImpact {
    let rows = population.len();
    let mut impact = DisasterImpact {
        fatalities_per_million: Vec::with_capacity(rows),
        affected_pct: Vec::with_capacity(rows),
        dii: Vec::with_capacity(rows),
    };
    for row in 0..rows {
        let population = positive(population[row]);
        let fatalities =
            population.and_then(|p| divide(deaths[row].unwrap_or(0.0) * 1_000_000.0, p));
        let affected_pct = population.and_then(|p| divide(affected[row].unwrap_or(0.0) * 100.0, p));
        let dii = match (fatalities, affected_pct, positive(gdp_per_capita[row])) {
            (Some(fatalities), Some(affected_pct), Some(gdp)) => {
                divide(fatalities + affected_weight * affected_pct, gdp)
                    .map(|ratio| ratio * severity[row].unwrap_or(1.0))
            }
            _ => None,
        };
        impact.fatalities_per_million.push(fatalities);
        impact.affected_pct.push(affected_pct);
        impact.dii.push(dii);
    }
    impact
}

/// `RRS = (norm(Δgrowth) + norm(HDI) + norm(governance)) / (1 + ln(1 + events) / 3)`.
///
/// Missing normalized terms take the neutral 0.5; a row with none of the three inputs is null.
pub fn recovery_score(
    growth_change: &[Option<f64>],
    hdi: &[Option<f64>],
    governance: &[Option<f64>],
    events: &[Option<f64>],
) -> Vec<Option<f64>> {
    let terms = [min_max(growth_change), min_max(hdi), min_max(governance)];
    (0..growth_change.len())
        .map(|row| {
            if growth_change[row].is_none() && hdi[row].is_none() && governance[row].is_none() {
                return None;
            }
            let numerator: f64 = terms
                .iter()
                .map(|term| term[row].unwrap_or(NEUTRAL_TERM))
                .sum();
            let events = events[row].unwrap_or(0.0).max(0.0);
            let recovery_factor = 1.0 + events.ln_1p() / 3.0;
            divide(numerator, recovery_factor)
        })
        .collect()
}

/// Exposure on a 0-10 scale: the hazard score, or scaled event counts when no row has one.
pub fn exposure(hazard: &[Option<f64>], events: &[Option<f64>]) -> Vec<f64> {
    if hazard.iter().any(Option::is_some) {
        return hazard
            .iter()
            .map(|value| value.unwrap_or(NEUTRAL_EXPOSURE))
            .collect();
    }
    let filled: Vec<Option<f64>> = events.iter().map(|value| Some(value.unwrap_or(0.0))).collect();
    min_max(&filled)
        .into_iter()
        .map(|value| value.unwrap_or(0.5) * 10.0)
        .collect()
}

/// `CRI = adaptive capacity / (exposure / 10 + vulnerability + ε)`.
pub fn composite_resilience(
    readiness: &[Option<f64>],
    coping: &[Option<f64>],
    exposure: &[f64],
    ndgain_vulnerability: &[Option<f64>],
    inform_vulnerability: &[Option<f64>],
) -> Vec<Option<f64>> {
    (0..readiness.len())
        .map(|row| {
            let adaptive = readiness[row].or(coping[row].map(|coping| (10.0 - coping) / 10.0))?;
            let vulnerability =
                ndgain_vulnerability[row].or(inform_vulnerability[row].map(|v| v / 10.0))?;
            divide(adaptive, exposure[row] / 10.0 + vulnerability + CRI_EPSILON)
        })
        .collect()
}

fn covered(values: &[Option<f64>]) -> usize {
    values.iter().filter(|value| value.is_some()).count()
}

/// Add the index columns and their intermediates to the table.
pub fn compute(mut df: DataFrame, config: &Config) -> Result<DataFrame> {
    let inputs = Inputs::read(&df)?;

    let impact = disaster_impact(
        &inputs.population,
        &inputs.deaths,
        &inputs.affected,
        &inputs.gdp_per_capita,
        &inputs.severity,
        config.dii_affected_weight,
    );
    let dii_normalized = scaled(
        &impact
            .dii
            .iter()
            .map(|value| value.map(|value| value.max(0.0)))
            .collect::<Vec<_>>(),
    );
    info!("DII computed for {} rows", covered(&impact.dii));

    let growth_change = within_country_diff(&inputs.codes, &inputs.gdp_growth);
    let rrs = recovery_score(&growth_change, &inputs.hdi, &inputs.governance, &inputs.events);
    let rrs_normalized = scaled(&clip(&rrs, 0.0, CLIP_MAX));
    info!("RRS computed for {} rows", covered(&rrs));

    let exposure = exposure(&inputs.hazard, &inputs.events);
    let cri = composite_resilience(
        &inputs.readiness,
        &inputs.coping,
        &exposure,
        &inputs.ndgain_vulnerability,
        &inputs.inform_vulnerability,
    );
    let cri_normalized = scaled(&clip(&cri, 0.0, CLIP_MAX));
    info!("CRI computed for {} rows", covered(&cri));

    let trailing = trailing_sum(
        &inputs.codes,
        &inputs.years,
        &inputs.events,
        config.recovery_window,
    );

    set_float(&mut df, COL::FATALITIES_PER_MILLION, impact.fatalities_per_million)?;
    set_float(&mut df, COL::AFFECTED_PCT, impact.affected_pct)?;
    set_float(&mut df, COL::GDP_GROWTH_CHANGE, growth_change)?;
    set_float(&mut df, COL::DISASTER_EVENTS_TRAILING, trailing)?;
    set_float(&mut df, COL::DII, impact.dii)?;
    set_float(&mut df, COL::DII_NORMALIZED, dii_normalized)?;
    set_float(&mut df, COL::RRS, rrs)?;
    set_float(&mut df, COL::RRS_NORMALIZED, rrs_normalized)?;
    set_float(&mut df, COL::CRI, cri)?;
    set_float(&mut df, COL::CRI_NORMALIZED, cri_normalized)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.map_or(false, |actual| (actual - expected).abs() < 1e-9)
    }

    #[test]
    fn dii_worked_example() {
        let impact = disaster_impact(
            &[Some(1_000_000.0)],
            &[Some(10.0)],
            &[Some(50_000.0)],
            &[Some(5000.0)],
            &[Some(2.0)],
            4.0,
        );
        assert!(approx(impact.fatalities_per_million[0], 10.0));
        assert!(approx(impact.affected_pct[0], 5.0));
        assert!(approx(impact.dii[0], 0.012));
    }

    #[test]
    fn dii_is_null_without_population_or_gdp() {
        let impact = disaster_impact(
            &[None, Some(0.0), Some(1000.0), Some(1000.0)],
            &[Some(1.0); 4],
            &[Some(1.0); 4],
            &[Some(100.0), Some(100.0), None, Some(0.0)],
            &[None; 4],
            4.0,
        );
        assert_eq!(impact.dii, vec![None, None, None, None]);
    }

    #[test]
    fn dii_defaults_missing_impacts_and_severity() {
        let impact = disaster_impact(&[Some(100.0)], &[None], &[None], &[Some(10.0)], &[None], 4.0);
        assert_eq!(impact.dii, vec![Some(0.0)]);
    }

    #[test]
    fn min_max_rescales_and_handles_flat_columns() {
        assert_eq!(
            min_max(&[Some(2.0), None, Some(4.0), Some(3.0)]),
            vec![Some(0.0), None, Some(1.0), Some(0.5)]
        );
        assert_eq!(min_max(&[Some(7.0), Some(7.0), None]), vec![Some(0.5), Some(0.5), None]);
        assert_eq!(scaled(&[Some(7.0), Some(7.0)]), vec![Some(50.0), Some(50.0)]);
    }

    #[test]
    fn min_max_is_idempotent_on_scaled_columns() {
        let once = scaled(&[Some(3.0), Some(8.0), Some(5.5), Some(13.0)]);
        assert_eq!(scaled(&once), once);
    }

    #[test]
    fn growth_change_restarts_per_country() {
        let codes = vec![Some("A".to_string()), Some("A".to_string()), Some("B".to_string())];
        assert_eq!(
            within_country_diff(&codes, &[Some(2.0), Some(5.0), Some(1.0)]),
            vec![None, Some(3.0), None]
        );
    }

    #[test]
    fn rrs_uses_neutral_terms_and_recovery_factor() {
        let rrs = recovery_score(
            &[None, None, None],
            &[Some(0.4), Some(0.8), None],
            &[None, None, None],
            &[None, Some(0.0), Some(3.0)],
        );
        // Row 0: hdi normalized 0.0, two neutral terms, no events.
        assert!(approx(rrs[0], 1.0));
        assert!(approx(rrs[1], 2.0));
        assert_eq!(rrs[2], None);

        let penalised = recovery_score(&[None], &[Some(0.5)], &[None], &[Some(9.0)]);
        let factor = 1.0 + (10.0f64).ln() / 3.0;
        assert!(approx(penalised[0], 1.5 / factor));
    }

    #[test]
    fn cri_prefers_climate_scores_and_falls_back_to_risk_scores() {
        let exposure = exposure(&[Some(4.0), None], &[None, None]);
        assert_eq!(exposure, vec![4.0, 5.0]);
        let cri = composite_resilience(
            &[Some(0.6), None],
            &[Some(9.0), Some(6.0)],
            &exposure,
            &[Some(0.4), None],
            &[None, Some(5.0)],
        );
        assert!(approx(cri[0], 0.6 / (0.4 + 0.4 + 0.001)));
        assert!(approx(cri[1], 0.4 / (0.5 + 0.5 + 0.001)));
    }

    #[test]
    fn cri_is_null_without_adaptive_capacity_or_vulnerability() {
        let cri = composite_resilience(
            &[None, Some(0.5)],
            &[None, None],
            &[5.0, 5.0],
            &[Some(0.4), None],
            &[None, None],
        );
        assert_eq!(cri, vec![None, None]);
    }

    #[test]
    fn exposure_falls_back_to_scaled_event_counts() {
        assert_eq!(
            exposure(&[None, None, None], &[Some(0.0), Some(10.0), None]),
            vec![0.0, 10.0, 0.0]
        );
    }

    #[test]
    fn trailing_events_stay_within_country_and_window() {
        let codes = vec![Some("A".to_string()); 4];
        let years = vec![Some(2000), Some(2001), Some(2002), Some(2004)];
        let events = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        assert_eq!(
            trailing_sum(&codes, &years, &events, 3),
            vec![Some(1.0), Some(3.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn compute_adds_every_index_column() -> anyhow::Result<()> {
        let df = df!(
            COL::ISO3 => &["AAA", "AAA", "BBB"],
            COL::YEAR => &[2010, 2011, 2010],
            COL::POPULATION => &[Some(1e6), Some(1e6), None],
            COL::TOTAL_DISASTER_DEATHS => &[Some(10.0), Some(20.0), Some(5.0)],
            COL::TOTAL_DISASTER_AFFECTED => &[Some(50_000.0), None, None],
            COL::GDP_PER_CAPITA_BEST => &[Some(5000.0), Some(5000.0), Some(100.0)],
            COL::HDI => &[Some(0.5), Some(0.6), Some(0.7)],
        )?;
        let out = compute(df, &Config::default())?;
        for column in crate::COL::INDEX_COLUMNS {
            assert!(out.column(column).is_ok(), "{column}");
        }
        let dii = float_values(&out, COL::DII)?;
        assert_eq!(dii[2], None);
        assert_eq!(float_values(&out, COL::DII_NORMALIZED)?[0], Some(100.0));
        assert_eq!(float_values(&out, COL::CRI)?, vec![None, None, None]);
        Ok(())
    }
}
