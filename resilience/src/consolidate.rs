//! "Best available" fields built from overlapping sources. Raw source columns are kept.

use log::info;
use nonempty::{nonempty, NonEmpty};
use polars::prelude::*;

use crate::error::Result;
use crate::frame::{float_values, set_float};
use crate::COL;

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// First non-null value in priority order.
    Coalesce,
    /// Sum of the available values; null only when every source is null.
    Sum,
    /// `Sum`, replaced by the fallback column whenever the sum is not positive.
    SumOrFallback(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedField {
    pub name: &'static str,
    pub sources: NonEmpty<&'static str>,
    pub rule: Rule,
}

pub fn fields() -> Vec<ConsolidatedField> {
    vec![
        ConsolidatedField {
            name: COL::TOTAL_DISASTER_DEATHS,
            sources: nonempty![COL::EMDAT_DEATHS, COL::DESINVENTAR_DEATHS],
            rule: Rule::Sum,
        },
        ConsolidatedField {
            name: COL::TOTAL_DISASTER_AFFECTED,
            sources: nonempty![COL::EMDAT_AFFECTED, COL::DESINVENTAR_AFFECTED],
            rule: Rule::Sum,
        },
        ConsolidatedField {
            name: COL::TOTAL_DISASTER_EVENTS,
            sources: nonempty![COL::EMDAT_EVENT_COUNT, COL::DESINVENTAR_EVENTS],
            rule: Rule::SumOrFallback(COL::GDACS_DISASTER_COUNT),
        },
        ConsolidatedField {
            name: COL::GDP_PER_CAPITA_BEST,
            sources: nonempty![COL::GDP_PER_CAPITA, COL::GDP_PER_CAPITA_IMF],
            rule: Rule::Coalesce,
        },
        ConsolidatedField {
            name: COL::GDP_GROWTH_BEST,
            sources: nonempty![COL::GDP_GROWTH, COL::GDP_GROWTH_IMF],
            rule: Rule::Coalesce,
        },
        ConsolidatedField {
            name: COL::GINI_BEST,
            sources: nonempty![COL::GINI_INDEX, COL::GINI_WID],
            rule: Rule::Coalesce,
        },
        ConsolidatedField {
            name: COL::EDUCATION_YEARS_BEST,
            sources: nonempty![COL::MEAN_YEARS_SCHOOLING, COL::YEARS_OF_SCHOOLING],
            rule: Rule::Coalesce,
        },
    ]
}

pub fn coalesce(columns: &[Vec<Option<f64>>], rows: usize) -> Vec<Option<f64>> {
    (0..rows)
        .map(|row| columns.iter().find_map(|values| values[row]))
        .collect()
}

pub fn sum_present(columns: &[Vec<Option<f64>>], rows: usize) -> Vec<Option<f64>> {
    (0..rows)
        .map(|row| {
            columns
                .iter()
                .filter_map(|values| values[row])
                .fold(None, |total: Option<f64>, value| Some(total.unwrap_or(0.0) + value))
        })
        .collect()
}

impl ConsolidatedField {
    pub fn compute(&self, df: &DataFrame) -> Result<Vec<Option<f64>>> {
        let rows = df.height();
        let columns = self
            .sources
            .iter()
            .map(|source| float_values(df, source))
            .collect::<Result<Vec<_>>>()?;
        Ok(match self.rule {
            Rule::Coalesce => coalesce(&columns, rows),
            Rule::Sum => sum_present(&columns, rows),
            Rule::SumOrFallback(fallback) => {
                let fallback = float_values(df, fallback)?;
                sum_present(&columns, rows)
                    .into_iter()
                    .zip(fallback)
                    .map(|(total, fallback)| match total {
                        Some(total) if total > 0.0 => Some(total),
                        _ => fallback.or(total),
                    })
                    .collect()
            }
        })
    }
}

pub fn consolidate(mut df: DataFrame) -> Result<DataFrame> {
    for field in fields() {
        let values = field.compute(&df)?;
        let filled = values.iter().filter(|value| value.is_some()).count();
        info!("{}: {filled} of {} rows", field.name, df.height());
        set_float(&mut df, field.name, values)?;
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_source_wins_regardless_of_value() -> anyhow::Result<()> {
        let df = df!(
            COL::GDP_PER_CAPITA => &[Some(100.0), None, None],
            COL::GDP_PER_CAPITA_IMF => &[Some(99999.0), Some(500.0), None],
        )?;
        let out = consolidate(df)?;
        assert_eq!(
            float_values(&out, COL::GDP_PER_CAPITA_BEST)?,
            vec![Some(100.0), Some(500.0), None]
        );
        // Raw columns stay for auditability.
        assert_eq!(float_values(&out, COL::GDP_PER_CAPITA_IMF)?[0], Some(99999.0));
        Ok(())
    }

    #[test]
    fn additive_totals_treat_missing_as_zero() -> anyhow::Result<()> {
        let df = df!(
            COL::EMDAT_DEATHS => &[Some(5.0), None, None],
            COL::DESINVENTAR_DEATHS => &[Some(2.0), Some(3.0), None],
        )?;
        let out = consolidate(df)?;
        assert_eq!(
            float_values(&out, COL::TOTAL_DISASTER_DEATHS)?,
            vec![Some(7.0), Some(3.0), None]
        );
        // No affected columns at all: the total is entirely null.
        assert_eq!(
            float_values(&out, COL::TOTAL_DISASTER_AFFECTED)?,
            vec![None, None, None]
        );
        Ok(())
    }

    #[test]
    fn event_count_falls_back_to_alerts() -> anyhow::Result<()> {
        let df = df!(
            COL::EMDAT_EVENT_COUNT => &[Some(2.0), Some(0.0), None, None],
            COL::DESINVENTAR_EVENTS => &[Some(1.0), None, None, Some(0.0)],
            COL::GDACS_DISASTER_COUNT => &[Some(9.0), Some(4.0), Some(6.0), None],
        )?;
        let out = consolidate(df)?;
        assert_eq!(
            float_values(&out, COL::TOTAL_DISASTER_EVENTS)?,
            vec![Some(3.0), Some(4.0), Some(6.0), Some(0.0)]
        );
        Ok(())
    }
}
