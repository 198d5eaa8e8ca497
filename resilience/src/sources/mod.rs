//! Source normalizers: one per raw dataset, each emitting a table keyed by (iso3, year).

use std::cell::Cell;

use enum_dispatch::enum_dispatch;
use log::{info, warn};
use polars::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::country::CountryResolver;
use crate::error::Result;
use crate::frame::{distinct_count, empty_keyed, string_values};
use crate::COL;

pub mod barrolee;
pub mod desinventar;
pub mod emdat;
pub mod fts;
pub mod gdacs;
pub mod gini;
pub mod hdr;
pub mod inform;
pub mod ndgain;
pub mod nightlights;
pub mod read;
pub mod weo;
pub mod wdi;
pub mod wgi;

pub use barrolee::BarroLee;
pub use desinventar::DesInventar;
pub use emdat::EmDat;
pub use fts::Fts;
pub use gdacs::Gdacs;
pub use gini::Gini;
pub use hdr::Hdr;
pub use inform::Inform;
pub use ndgain::NdGain;
pub use nightlights::NightLights;
pub use weo::Weo;
pub use wdi::Wdi;
pub use wgi::Wgi;

/// Everything a normalizer may read: the configuration and the shared resolver.
pub struct SourceContext<'a> {
    pub config: &'a Config,
    pub resolver: &'a CountryResolver,
    /// In-range rows whose country did not resolve, since the last `take_unresolved`.
    unresolved: Cell<usize>,
}

impl<'a> SourceContext<'a> {
    pub fn new(config: &'a Config, resolver: &'a CountryResolver) -> Self {
        Self {
            config,
            resolver,
            unresolved: Cell::new(0),
        }
    }

    pub fn note_unresolved(&self, rows: usize) {
        self.unresolved.set(self.unresolved.get() + rows);
    }

    pub fn take_unresolved(&self) -> usize {
        self.unresolved.take()
    }
}

#[enum_dispatch]
pub trait Normalizer {
    /// Human readable name used in logs and in the validation report.
    fn name(&self) -> &'static str;
    /// Data columns this source contributes, used to key an empty substitute table.
    fn columns(&self) -> Vec<&'static str>;
    /// Read the raw source and emit the normalized table.
    fn load(&self, ctx: &SourceContext) -> Result<DataFrame>;
}

/// Every source, spine first and then in merge order.
#[enum_dispatch(Normalizer)]
#[derive(Debug, Clone, Copy)]
pub enum Source {
    NdGain(NdGain),
    NightLights(NightLights),
    EmDat(EmDat),
    Gdacs(Gdacs),
    Weo(Weo),
    Wdi(Wdi),
    Hdr(Hdr),
    Wgi(Wgi),
    Inform(Inform),
    Fts(Fts),
    DesInventar(DesInventar),
    BarroLee(BarroLee),
    Gini(Gini),
}

impl Source {
    pub fn all() -> Vec<Source> {
        vec![
            NdGain.into(),
            NightLights.into(),
            EmDat.into(),
            Gdacs.into(),
            Weo.into(),
            Wdi.into(),
            Hdr.into(),
            Wgi.into(),
            Inform.into(),
            Fts.into(),
            DesInventar.into(),
            BarroLee.into(),
            Gini.into(),
        ]
    }
}

/// How a source run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Loaded {
        rows: usize,
        countries: usize,
        /// Raw rows dropped because their country could not be resolved.
        unresolved: usize,
    },
    Empty { reason: String },
    Failed { error: String },
}

impl SourceOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SourceOutcome::Loaded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SourceRun {
    pub name: &'static str,
    pub outcome: SourceOutcome,
    /// The normalized table, or an empty keyed table when the source degraded.
    pub table: DataFrame,
}

/// Run one normalizer, never failing: errors and empty results are captured in the outcome.
pub fn run(source: &Source, ctx: &SourceContext) -> SourceRun {
    let name = source.name();
    let empty = || empty_keyed(&source.columns());
    ctx.take_unresolved();
    let loaded = source.load(ctx);
    let unresolved = ctx.take_unresolved();
    if unresolved > 0 {
        warn!("{name}: {unresolved} rows with an unresolvable country will be dropped");
    }
    let (outcome, table) = match loaded {
        Ok(df) if df.height() == 0 => {
            let reason = "no rows for the configured year range".to_string();
            warn!("{name}: {reason}");
            (SourceOutcome::Empty { reason }, empty())
        }
        Ok(df) => {
            let countries = string_values(&df, COL::ISO3)
                .map(|codes| distinct_count(&codes))
                .unwrap_or(0);
            info!("{name}: {} rows, {countries} countries", df.height());
            (
                SourceOutcome::Loaded {
                    rows: df.height(),
                    countries,
                    unresolved,
                },
                df,
            )
        }
        Err(err) => {
            warn!("{name}: unavailable ({err})");
            (
                SourceOutcome::Failed {
                    error: err.to_string(),
                },
                empty(),
            )
        }
    };
    SourceRun {
        name,
        outcome,
        table,
    }
}

/// Run every source in merge order.
pub fn run_all(ctx: &SourceContext) -> Vec<SourceRun> {
    Source::all().iter().map(|source| run(source, ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::data_columns;

    #[test]
    fn missing_sources_degrade_to_empty_keyed_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let runs = run_all(&ctx);
        assert_eq!(runs.len(), 13);
        assert_eq!(runs[0].name, "ND-GAIN");
        for run in runs {
            assert!(matches!(run.outcome, SourceOutcome::Failed { .. }), "{}", run.name);
            assert_eq!(run.table.height(), 0);
            assert_eq!(run.table.get_column_names()[..2], [COL::ISO3, COL::YEAR]);
            assert!(!data_columns(&run.table).is_empty(), "{}", run.name);
        }
    }

    #[test]
    fn unresolvable_country_rows_are_counted() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("WDIworld/economic-inequality-gini-index.csv");
        std::fs::create_dir_all(file.parent().unwrap())?;
        std::fs::write(
            &file,
            "Entity,Code,Year,Gini coefficient\n\
             Brazil,BRA,2010,0.59\n\
             Atlantis,Atlantis,2010,0.3\n\
             Atlantis,Atlantis,2011,0.31\n\
             Atlantis,Atlantis,1950,0.2\n",
        )?;
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let resolver = CountryResolver::new(&config);
        let ctx = SourceContext::new(&config, &resolver);
        let run = run(&Gini.into(), &ctx);
        assert_eq!(
            run.outcome,
            SourceOutcome::Loaded {
                rows: 1,
                countries: 1,
                unresolved: 2,
            }
        );
        assert_eq!(ctx.take_unresolved(), 0, "counter resets after each source");
        Ok(())
    }
}
