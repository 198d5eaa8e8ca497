use std::io::{self, Write};

use comfy_table::{presets::NOTHING, *};
use itertools::Itertools;

use resilience::country::Resolution;
use resilience::quality::CoverageRow;
use resilience::registry::name_of;
use resilience::sources::{SourceOutcome, SourceRun};
use resilience::PipelineOutput;

fn new_table<'a>(header: impl IntoIterator<Item = &'a str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .into_iter()
                .map(|name| Cell::new(name).add_attribute(Attribute::Bold)),
        )
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

pub fn sources_table(runs: &[SourceRun]) -> Table {
    let mut table = new_table(["Source", "Status", "Rows", "Countries", "Unresolved", "Detail"]);
    for run in runs {
        let row = match &run.outcome {
            SourceOutcome::Loaded {
                rows,
                countries,
                unresolved,
            } => vec![
                run.name.to_string(),
                "loaded".into(),
                rows.to_string(),
                countries.to_string(),
                unresolved.to_string(),
                String::new(),
            ],
            SourceOutcome::Empty { reason } => vec![
                run.name.to_string(),
                "empty".into(),
                "0".into(),
                "0".into(),
                String::new(),
                reason.clone(),
            ],
            SourceOutcome::Failed { error } => vec![
                run.name.to_string(),
                "failed".into(),
                "0".into(),
                "0".into(),
                String::new(),
                error.clone(),
            ],
        };
        table.add_row(row);
    }
    table
}

pub fn resolutions_table(resolutions: &[(String, Option<Resolution>)]) -> Table {
    let mut table = new_table(["Input", "ISO3", "Registry name", "Resolved by"]);
    for (input, resolution) in resolutions {
        match resolution {
            Some(resolution) => table.add_row(vec![
                input.clone(),
                resolution.code.clone(),
                optional(name_of(&resolution.code)),
                resolution.via.to_string(),
            ]),
            None => table.add_row(vec![
                input.clone(),
                String::new(),
                String::new(),
                "unresolved".into(),
            ]),
        };
    }
    table
}

pub fn coverage_table(rows: &[CoverageRow], max_results: Option<usize>) -> Table {
    let mut table = new_table(["Variable", "Non-null", "Coverage %", "Countries", "Years"]);
    for row in rows.iter().take(max_results.unwrap_or(usize::MAX)) {
        let years = match (row.year_min, row.year_max) {
            (Some(first), Some(last)) => format!("{first}-{last}"),
            _ => String::new(),
        };
        table.add_row(vec![
            row.variable.clone(),
            format!("{}/{}", row.non_null_obs, row.total_obs),
            format!("{:.2}", row.coverage_pct),
            row.countries_covered.to_string(),
            years,
        ]);
    }
    table
}

pub fn summary_table(output: &PipelineOutput) -> Table {
    let loaded = output.runs.iter().filter(|run| run.outcome.is_loaded()).count();
    let mut table = new_table(["", ""]);
    table.add_row(vec!["Rows".to_string(), output.table.height().to_string()]);
    table.add_row(vec!["Columns".to_string(), output.table.width().to_string()]);
    table.add_row(vec![
        "Sources loaded".to_string(),
        format!("{loaded}/{}", output.runs.len()),
    ]);
    if !output.merge.skipped.is_empty() {
        table.add_row(vec![
            "Sources skipped".to_string(),
            output.merge.skipped.iter().map(|(name, _)| name).join(", "),
        ]);
    }
    table.add_row(vec![
        "Duplicate keys".to_string(),
        output.merge.duplicate_keys.len().to_string(),
    ]);
    table
}

/// Print to stdout, surfacing a closed pipe as an error instead of panicking.
pub fn print_stdout(text: impl std::fmt::Display) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{text}")
}

pub fn display_sources(runs: &[SourceRun]) -> io::Result<()> {
    print_stdout(format!("\n{}", sources_table(runs)))
}

pub fn display_resolutions(resolutions: &[(String, Option<Resolution>)]) -> io::Result<()> {
    print_stdout(format!("\n{}", resolutions_table(resolutions)))
}

pub fn display_coverage(rows: &[CoverageRow], max_results: Option<usize>) -> io::Result<()> {
    print_stdout(format!("\n{}", coverage_table(rows, max_results)))
}

pub fn display_summary(output: &PipelineOutput) -> io::Result<()> {
    print_stdout(format!("\n{}", summary_table(output)))
}

#[cfg(test)]
mod tests {
    use resilience::country::Via;

    use super::*;

    #[test]
    fn resolutions_show_path_and_unresolved_inputs() {
        let rendered = resolutions_table(&[
            (
                "United States".into(),
                Some(Resolution {
                    code: "USA".into(),
                    via: Via::Alias,
                }),
            ),
            ("N/A".into(), None),
        ])
        .to_string();
        assert!(rendered.contains("USA"));
        assert!(rendered.contains("alias"));
        assert!(rendered.contains("unresolved"));
    }

    #[test]
    fn coverage_table_respects_limit() {
        let row = |variable: &str| CoverageRow {
            variable: variable.into(),
            total_obs: 10,
            non_null_obs: 5,
            coverage_pct: 50.0,
            countries_covered: 2,
            year_min: Some(2000),
            year_max: Some(2005),
        };
        let rendered = coverage_table(&[row("first"), row("second")], Some(1)).to_string();
        assert!(rendered.contains("first"));
        assert!(!rendered.contains("second"));
        assert!(rendered.contains("2000-2005"));
    }
}
