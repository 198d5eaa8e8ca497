use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trait to define different output generators. `save` writes the `DataFrame`
/// to any writer; `write_file` places it next to `path` with the format's extension.
#[enum_dispatch]
pub trait OutputGenerator {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()>;

    fn extension(&self) -> &'static str;

    fn write_file(&self, path: &Path, df: &mut DataFrame) -> Result<PathBuf> {
        let path = path.with_extension(self.extension());
        let mut writer = BufWriter::new(File::create(&path)?);
        self.save(&mut writer, df)?;
        writer.flush()?;
        info!("Wrote {} rows to {}", df.height(), path.display());
        Ok(path)
    }
}

/// Enum of OutputFormatters, one for each supported table format.
#[enum_dispatch(OutputGenerator)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum OutputFormatter {
    Csv(CsvFormatter),
    Parquet(ParquetFormatter),
}

impl Default for OutputFormatter {
    fn default() -> Self {
        CsvFormatter.into()
    }
}

/// Comma-separated text with a header row. Nulls are written as empty fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CsvFormatter;

impl OutputGenerator for CsvFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        CsvWriter::new(writer).include_header(true).finish(df)?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ParquetFormatter;

impl OutputGenerator for ParquetFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        ParquetWriter::new(writer)
            .with_compression(ParquetCompression::Zstd(None))
            .finish(df)?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "parquet"
    }
}
