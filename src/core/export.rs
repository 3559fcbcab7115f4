// distress-triage - core/export.rs
//
// CSV and JSON export of scored properties.
// Core layer: writes to any Write trait object.

use crate::core::model::ScoredProperty;
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export column labels, in output order.
pub const EXPORT_HEADERS: [&str; 20] = [
    "Address",
    "Suburb",
    "State",
    "Postcode",
    "Property Type",
    "Asking Price (AUD)",
    "Price Text",
    "Land Area (sqm)",
    "Building Area (sqm)",
    "Days on Market",
    "Agent",
    "Agency",
    "Listing URL",
    "Score",
    "Priority",
    "Distress Signals",
    "Distress Score",
    "DOM Score",
    "Vacancy Score",
    "Description",
];

/// Flatten a property into export cells matching `EXPORT_HEADERS`.
/// Missing numbers become empty cells.
pub fn to_export_record(p: &ScoredProperty) -> [String; 20] {
    [
        p.address.clone(),
        p.suburb.clone(),
        p.state.clone(),
        p.postcode.clone(),
        p.property_type.clone(),
        p.asking_price.map(|v| v.to_string()).unwrap_or_default(),
        p.price_text.clone(),
        p.land_area.clone(),
        p.building_area.clone(),
        p.days_on_market.map(|v| v.to_string()).unwrap_or_default(),
        p.agent.clone(),
        p.agency.clone(),
        p.url.clone(),
        p.score.to_string(),
        p.priority.label().to_string(),
        p.matched_keywords.join(constants::KEYWORD_SEPARATOR),
        p.distress_score.to_string(),
        p.dom_score.to_string(),
        p.vacancy_score.to_string(),
        p.description.clone(),
    ]
}

fn check_size(count: usize) -> Result<(), ExportError> {
    if count > constants::MAX_EXPORT_ROWS {
        return Err(ExportError::TooManyRows {
            count,
            max: constants::MAX_EXPORT_ROWS,
        });
    }
    Ok(())
}

/// Export properties to CSV with the fixed column order.
///
/// Returns the number of data rows written.
pub fn export_csv<W: Write>(
    properties: &[ScoredProperty],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(properties.len())?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    csv_writer.write_record(EXPORT_HEADERS).map_err(csv_err)?;

    let mut count = 0;
    for p in properties {
        csv_writer.write_record(&to_export_record(p)).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export properties to JSON format (array of objects, camelCase keys).
pub fn export_json<W: Write>(
    properties: &[ScoredProperty],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(properties.len())?;
    serde_json::to_writer_pretty(writer, properties).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(properties.len())
}

/// Default export file name for the given local date.
pub fn default_file_name(date: chrono::NaiveDate, extension: &str) -> String {
    format!(
        "{}_{}.{extension}",
        constants::EXPORT_FILE_PREFIX,
        date.format("%Y-%m-%d")
    )
}
