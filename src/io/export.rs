//! Writing result tables as CSV

use anyhow::Result;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::config::ScrapeMode;
use crate::scrape_types::ScrapeResult;

pub const DIRECT_COLUMNS: [&str; 5] = ["url", "business", "emails", "domain", "error"];
pub const MAPS_COLUMNS: [&str; 4] = ["Original_URL", "Website_URL", "Found_Emails", "Status"];

/// Write `results` in the column layout of `mode`
pub fn write_results<W: Write>(writer: W, mode: ScrapeMode, results: &[ScrapeResult]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    match mode {
        ScrapeMode::Direct => write_direct(&mut wtr, results)?,
        ScrapeMode::Maps => write_maps(&mut wtr, results)?,
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, mode: ScrapeMode, results: &[ScrapeResult]) -> Result<()> {
    debug!("Exporting {} results to CSV: {}", results.len(), path.display());
    let file = File::create(path)?;
    write_results(file, mode, results)?;
    info!("Saved {} results to {}", results.len(), path.display());
    Ok(())
}

fn write_direct<W: Write>(wtr: &mut Writer<W>, results: &[ScrapeResult]) -> Result<()> {
    wtr.write_record(DIRECT_COLUMNS)?;
    for result in results {
        wtr.write_record([
            result.url.as_str(),
            result.business.as_str(),
            result.emails.joined().as_str(),
            result.domain.as_str(),
            result.error.as_deref().unwrap_or_default(),
        ])?;
    }
    Ok(())
}

/// Original row columns first (in order of first appearance), then the maps columns
fn write_maps<W: Write>(wtr: &mut Writer<W>, results: &[ScrapeResult]) -> Result<()> {
    let mut row_columns: Vec<&str> = Vec::new();
    for maps in results.iter().filter_map(|r| r.maps.as_ref()) {
        for column in maps.source_row.columns() {
            if !row_columns.contains(&column) && !MAPS_COLUMNS.contains(&column) {
                row_columns.push(column);
            }
        }
    }

    let header: Vec<&str> = row_columns.iter().copied().chain(MAPS_COLUMNS).collect();
    wtr.write_record(&header)?;

    for result in results {
        let mut record: Vec<String> = row_columns
            .iter()
            .map(|column| {
                result
                    .maps
                    .as_ref()
                    .and_then(|maps| maps.source_row.get(column))
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();

        match &result.maps {
            Some(maps) => record.extend([
                maps.original_url.clone(),
                maps.website_url.clone(),
                result.emails.joined(),
                maps.status.to_string(),
            ]),
            None => record.extend([
                result.url.clone(),
                String::new(),
                result.emails.joined(),
                result.error.clone().unwrap_or_default(),
            ]),
        }

        wtr.write_record(&record)?;
    }
    Ok(())
}
