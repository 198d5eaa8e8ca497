//! Error types.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ResilienceError {
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Report formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Source file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Column `{column}` not found in {source_name}")]
    MissingColumn { source_name: String, column: String },
    #[error("Spreadsheet {} has no worksheets", .0.display())]
    EmptyWorkbook(PathBuf),
}

pub type Result<T> = std::result::Result<T, ResilienceError>;

impl ResilienceError {
    pub fn missing_column(source_name: &str, column: &str) -> Self {
        ResilienceError::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_anyhow() {
        let anyhow_error = anyhow!("An anyhow error");
        let error: ResilienceError = anyhow_error.into();
        assert!(error.to_string().contains("An anyhow error"));
    }

    #[test]
    fn test_missing_column_message() {
        let error = ResilienceError::missing_column("EM-DAT", "ISO");
        assert_eq!(error.to_string(), "Column `ISO` not found in EM-DAT");
    }
}
