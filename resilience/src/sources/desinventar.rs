//! DesInventar disaster loss records: XML event exports per country, either extracted into
//! folders or still inside zip archives.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, warn};
use polars::prelude::*;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ResilienceError, Result};
use crate::sources::read::{list_files, parse_year};
use crate::sources::{Normalizer, SourceContext};
use crate::COL;

const DIR: &str = "desinventarSandai";
const NAME: &str = "DesInventar";
const FOLDER_PREFIX: &str = "DI_EXPORT_";

/// Folder and archive codes that differ from the country code they hold.
const CODE_CORRECTIONS: [(&str, &str); 3] = [("AR2", "ARM"), ("LAO2", "LAO"), ("NG_OY", "NGA")];

const EVENTS: &str = "events";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub year: Option<i32>,
    pub deaths: f64,
    pub affected: f64,
    pub houses_destroyed: f64,
    pub houses_damaged: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DesInventar;

impl Normalizer for DesInventar {
    fn name(&self) -> &'static str {
        NAME
    }

    fn columns(&self) -> Vec<&'static str> {
        vec![
            COL::DESINVENTAR_EVENTS,
            COL::DESINVENTAR_DEATHS,
            COL::DESINVENTAR_AFFECTED,
            COL::DESINVENTAR_HOUSES_DESTROYED,
            COL::DESINVENTAR_HOUSES_DAMAGED,
        ]
    }

    fn load(&self, ctx: &SourceContext) -> Result<DataFrame> {
        let dir = ctx.config.source_path(DIR);
        let extracted = dir.join("extracted");
        let mut events: Vec<(String, EventRecord)> = Vec::new();
        if extracted.is_dir() {
            for entry in std::fs::read_dir(&extracted)? {
                let folder = entry?.path();
                if !folder.is_dir() {
                    continue;
                }
                let Some(code) = resolve_folder(&folder, ctx) else {
                    continue;
                };
                for xml in list_files(&folder, &["xml"])? {
                    match File::open(&xml)
                        .map_err(ResilienceError::from)
                        .and_then(|file| parse_records(BufReader::new(file)))
                    {
                        Ok(records) => extend(&mut events, &code, records),
                        Err(err) => warn!("{NAME}: skipping {} ({err})", xml.display()),
                    }
                }
            }
        } else {
            let archives = list_files(&dir, &["zip"])?;
            if archives.is_empty() {
                return Err(ResilienceError::MissingFile(extracted));
            }
            for archive in archives {
                let Some(code) = resolve_folder(&archive, ctx) else {
                    continue;
                };
                match read_archive(&archive) {
                    Ok(records) => extend(&mut events, &code, records),
                    Err(err) => warn!("{NAME}: skipping {} ({err})", archive.display()),
                }
            }
        }
        aggregate(events, ctx)
    }
}

fn extend(events: &mut Vec<(String, EventRecord)>, code: &str, records: Vec<EventRecord>) {
    events.extend(records.into_iter().map(|record| (code.to_string(), record)));
}

/// Country code held in a `DI_export_<code>` folder or archive name.
pub fn folder_code(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    let code = upper.strip_prefix(FOLDER_PREFIX).unwrap_or(&upper);
    CODE_CORRECTIONS
        .iter()
        .find(|(raw, _)| *raw == code)
        .map(|(_, corrected)| corrected.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn resolve_folder(path: &Path, ctx: &SourceContext) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let code = ctx.resolver.code(&folder_code(stem));
    if code.is_none() {
        debug!("{NAME}: no country for {}", path.display());
    }
    code
}

fn read_archive(path: &Path) -> Result<Vec<EventRecord>> {
    let mut archive = ::zip::ZipArchive::new(File::open(path)?)?;
    let mut records = Vec::new();
    for idx in 0..archive.len() {
        let mut entry = archive.by_index(idx)?;
        if !entry.name().to_lowercase().ends_with(".xml") {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        records.extend(parse_records(bytes.as_slice())?);
    }
    Ok(records)
}

fn number(fields: &[(String, String)], name: &str) -> f64 {
    fields
        .iter()
        .find(|(field, _)| field == name)
        .and_then(|(_, value)| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn to_record(fields: &[(String, String)]) -> EventRecord {
    EventRecord {
        year: fields
            .iter()
            .find(|(field, _)| field == "fechano")
            .and_then(|(_, value)| parse_year(value)),
        deaths: number(fields, "muertos"),
        affected: number(fields, "afectados"),
        houses_destroyed: number(fields, "vivdest"),
        houses_damaged: number(fields, "vivafec"),
    }
}

/// Read every `TR` record inside the `fichas` element. Unparseable counts read as zero.
pub fn parse_records<R: BufRead>(source: R) -> Result<Vec<EventRecord>> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut records = Vec::new();
    let mut in_fichas = false;
    let mut fields: Option<Vec<(String, String)>> = None;
    let mut field: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(tag) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).to_lowercase();
                if name == "fichas" {
                    in_fichas = true;
                } else if in_fichas && name == "tr" {
                    fields = Some(Vec::new());
                } else if fields.is_some() {
                    field = Some(name);
                }
            }
            Event::Text(text) => {
                if let (Some(fields), Some(field)) = (fields.as_mut(), field.as_ref()) {
                    fields.push((field.clone(), String::from_utf8_lossy(&text).into_owned()));
                }
            }
            Event::End(tag) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).to_lowercase();
                if name == "tr" {
                    if let Some(done) = fields.take() {
                        records.push(to_record(&done));
                    }
                } else if name == "fichas" {
                    in_fichas = false;
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(records)
}

fn aggregate(events: Vec<(String, EventRecord)>, ctx: &SourceContext) -> Result<DataFrame> {
    let in_range: Vec<(String, i32, EventRecord)> = events
        .into_iter()
        .filter_map(|(code, record)| {
            let year = record.year.filter(|year| ctx.config.in_range(*year))?;
            Some((code, year, record))
        })
        .collect();
    let column = |value: fn(&EventRecord) -> f64| -> Vec<f64> {
        in_range.iter().map(|(_, _, record)| value(record)).collect()
    };
    let df = DataFrame::new(vec![
        Series::new(
            COL::ISO3,
            in_range.iter().map(|(code, _, _)| code.clone()).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::YEAR,
            in_range.iter().map(|(_, year, _)| *year).collect::<Vec<_>>(),
        ),
        Series::new(EVENTS, vec![1.0; in_range.len()]),
        Series::new(COL::DESINVENTAR_DEATHS, column(|r| r.deaths)),
        Series::new(COL::DESINVENTAR_AFFECTED, column(|r| r.affected)),
        Series::new(COL::DESINVENTAR_HOUSES_DESTROYED, column(|r| r.houses_destroyed)),
        Series::new(COL::DESINVENTAR_HOUSES_DAMAGED, column(|r| r.houses_damaged)),
    ])?;
    Ok(df
        .lazy()
        .group_by([col(COL::ISO3), col(COL::YEAR)])
        .agg([
            col(EVENTS).sum().alias(COL::DESINVENTAR_EVENTS),
            col(COL::DESINVENTAR_DEATHS).sum(),
            col(COL::DESINVENTAR_AFFECTED).sum(),
            col(COL::DESINVENTAR_HOUSES_DESTROYED).sum(),
            col(COL::DESINVENTAR_HOUSES_DAMAGED).sum(),
        ])
        .sort([COL::ISO3, COL::YEAR], SortMultipleOptions::default())
        .collect()?)
}
