//! GDACS disaster alerts: counts, alert-level tallies and mean severity per country-year.

use log::debug;
use polars::prelude::*;

use crate::error::{ResilienceError, Result};
use crate::frame::{set_float, string_values};
use crate::sources::read::{read_csv_text, require_column, with_keys};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "GDACS/Clean";
const NAME: &str = "GDACS";
const DISASTER_TYPE: &str = "disaster_type";
const SEVERITY: &str = "severity_weight";
const IS_RED: &str = "is_red";
const IS_ORANGE: &str = "is_orange";
const ALERT_SCORE: &str = "alertscore";

/// (file, event type, per-type count column)
pub const EVENT_FILES: [(&str, &str, &str); 6] = [
    ("Earthquake_clean.csv", "earthquake", "gdacs_earthquake_count"),
    ("Flood_clean.csv", "flood", "gdacs_flood_count"),
    ("Drought_clean.csv", "drought", "gdacs_drought_count"),
    ("Forest_Fires_clean.csv", "forest_fire", "gdacs_forest_fire_count"),
    ("Tropical_Cyclone_clean.csv", "tropical_cyclone", "gdacs_tropical_cyclone_count"),
    ("Eruption_clean.csv", "eruption", "gdacs_eruption_count"),
];

#[derive(Debug, Clone, Copy)]
pub struct Gdacs;

impl Normalizer for Gdacs {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![
            COL::GDACS_DISASTER_COUNT,
            COL::GDACS_RED_ALERTS,
            COL::GDACS_ORANGE_ALERTS,
            COL::GDACS_AVG_ALERT_SCORE,
            COL::GDACS_SEVERITY_WEIGHT,
        ];
        columns.extend(EVENT_FILES.iter().map(|(_, _, column)| *column));
        columns
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let dir = ctx.config.source_path(DIR);
        let mut events = Vec::new();
        let mut types = Vec::new();
        for (file, event_type, column) in EVENT_FILES {
            let path = dir.join(file);
            if !path.exists() {
                debug!("GDACS file {} not present", path.display());
                continue;
            }
            events.push(events_from_frame(read_csv_text(&path, 0)?, event_type, ctx)?);
            types.push((event_type, column));
        }
        if events.is_empty() {
            return Err(ResilienceError::MissingFile(dir.join("*_clean.csv")));
        }
        aggregate_alerts(concat(events, UnionArgs::default())?, &types)
    }
}

/// Normalise one event file: lower-cased headers, year from `fromdate`, ordinal severity.
pub fn events_from_frame(mut df: DataFrame, event_type: &str, ctx: &SourceContext) -> Result<LazyFrame> {
    let lowered: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    df.set_column_names(&lowered)?;
    require_column(&df, NAME, COL::ISO3)?;
    require_column(&df, NAME, "fromdate")?;

    let levels = string_values(&df, "alertlevel")?;
    let weights = &ctx.config.severity_weights;
    let is_level = |wanted: &str| -> Vec<Option<f64>> {
        levels
            .iter()
            .map(|level| {
                let matched = level
                    .as_deref()
                    .map_or(false, |level| level.trim().eq_ignore_ascii_case(wanted));
                Some(if matched { 1.0 } else { 0.0 })
            })
            .collect()
    };
    let severity = levels
        .iter()
        .map(|level| Some(weights.weight(level.as_deref())))
        .collect();
    let red = is_level("RED");
    let orange = is_level("ORANGE");
    set_float(&mut df, SEVERITY, severity)?;
    set_float(&mut df, IS_RED, red)?;
    set_float(&mut df, IS_ORANGE, orange)?;
    if !df.get_column_names().contains(&ALERT_SCORE) {
        let height = df.height();
        set_float(&mut df, ALERT_SCORE, vec![None; height])?;
    }

    let df = with_keys(df, COL::ISO3, "fromdate", ctx)?;
    Ok(df.lazy().select([
        col(COL::ISO3),
        col(COL::YEAR),
        lit(event_type).alias(DISASTER_TYPE),
        col(SEVERITY),
        col(IS_RED),
        col(IS_ORANGE),
        col(ALERT_SCORE).cast(DataType::Float64),
    ]))
}

pub fn aggregate_alerts(events: LazyFrame, types: &[(&str, &str)]) -> Result<DataFrame> {
    let mut aggregations = vec![
        col(COL::YEAR)
            .count()
            .cast(DataType::Float64)
            .alias(COL::GDACS_DISASTER_COUNT),
        col(IS_RED).sum().alias(COL::GDACS_RED_ALERTS),
        col(IS_ORANGE).sum().alias(COL::GDACS_ORANGE_ALERTS),
        col(ALERT_SCORE).mean().alias(COL::GDACS_AVG_ALERT_SCORE),
        col(SEVERITY).mean().alias(COL::GDACS_SEVERITY_WEIGHT),
    ];
    aggregations.extend(types.iter().map(|(event_type, column)| {
        col(DISASTER_TYPE)
            .eq(lit(*event_type))
            .cast(DataType::Float64)
            .sum()
            .alias(column)
    }));
    Ok(events
        .group_by([col(COL::ISO3), col(COL::YEAR)])
        .agg(aggregations)
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
        .collect()?)
}
