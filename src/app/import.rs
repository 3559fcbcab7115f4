// distress-triage - app/import.rs
//
// Import orchestration: open a listing export, decode it, build the column
// map (auto + manual overrides), enforce the mapping confidence gate, and
// run the row pipeline.
//
// Only the outer surfaces fail here (unreadable file, unsupported type,
// unresolvable mapping). Bad cell values never do.

use crate::core::ingest::{self, Delimiter, RawTable};
use crate::core::mapper::{self, ColumnMap};
use crate::core::model::{Field, ScoredProperty};
use crate::core::pipeline::{self, PipelineConfig};
use crate::util::constants;
use crate::util::error::{IngestError, MappingError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options controlling how a file is mapped and scored.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Manual `field=Header` overrides applied after auto-mapping.
    pub overrides: Vec<String>,
    /// Process even if fewer than `min_mapped_fields` columns are mapped.
    pub force: bool,
    /// Mapping confidence gate.
    pub min_mapped_fields: usize,
    pub pipeline: PipelineConfig,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            overrides: Vec::new(),
            force: false,
            min_mapped_fields: constants::DEFAULT_MIN_MAPPED_FIELDS,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Result of a successful import.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub path: PathBuf,
    /// Header row as found in the file.
    pub headers: Vec<String>,
    /// Final column map (after overrides).
    pub columns: ColumnMap,
    /// Number of fields the auto-mapper recognised on its own.
    pub auto_mapped: usize,
    pub properties: Vec<ScoredProperty>,
    /// Non-fatal notices for the user.
    pub warnings: Vec<String>,
}

/// Import and score a listing export from disk.
pub fn import_file(path: &Path, options: &ImportOptions) -> Result<ImportOutcome> {
    let started = Instant::now();
    let delimiter = Delimiter::from_path(path)?;

    let metadata = std::fs::metadata(path).map_err(|e| IngestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if metadata.len() > constants::MAX_IMPORT_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_IMPORT_FILE_SIZE,
        }
        .into());
    }

    let file = File::open(path).map_err(|e| IngestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let table = ingest::read_rows(BufReader::new(file), delimiter, path)?;

    let outcome = import_table(path, table, options)?;
    tracing::info!(
        path = %path.display(),
        rows = outcome.properties.len(),
        mapped = outcome.columns.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Import complete"
    );
    Ok(outcome)
}

/// Map and score an already-decoded table.
pub fn import_table(path: &Path, table: RawTable, options: &ImportOptions) -> Result<ImportOutcome> {
    let (columns, auto_mapped) = resolve_columns(&table.headers, options)?;

    let mut warnings = Vec::new();
    if columns.get(Field::Description).is_none() {
        warnings.push(
            "No description column mapped: keyword and vacancy scores are based on empty text."
                .to_string(),
        );
    }
    if columns.get(Field::DaysOnMarket).is_none() {
        warnings.push("No days-on-market column mapped: every listing gets the unknown-DOM score.".to_string());
    }
    if columns.get(Field::AskingPrice).is_none() {
        warnings.push("No price column mapped: price filters will not exclude anything.".to_string());
    }
    for w in &warnings {
        tracing::warn!("{}", w);
    }

    let properties = pipeline::process_with(&table.rows, &columns, &options.pipeline);

    Ok(ImportOutcome {
        path: path.to_path_buf(),
        headers: table.headers,
        columns,
        auto_mapped,
        properties,
        warnings,
    })
}

/// Auto-map, apply overrides, then enforce the confidence gate.
///
/// Returns the final map and the auto-mapped field count.
pub fn resolve_columns(
    headers: &[String],
    options: &ImportOptions,
) -> std::result::Result<(ColumnMap, usize), MappingError> {
    let mut columns = mapper::auto_map(headers);
    let auto_mapped = columns.len();
    tracing::info!(
        auto_mapped,
        headers = headers.len(),
        unmapped = ?columns.unmapped(),
        "Columns auto-mapped"
    );

    columns.apply_overrides(&options.overrides, headers)?;

    if !columns.meets_threshold(options.min_mapped_fields) {
        if options.force {
            tracing::warn!(
                mapped = columns.len(),
                required = options.min_mapped_fields,
                "Proceeding with a low-confidence column map (--force)"
            );
        } else {
            return Err(MappingError::TooFewMappedFields {
                mapped: columns.len(),
                required: options.min_mapped_fields,
                headers: headers.to_vec(),
            });
        }
    }

    Ok((columns, auto_mapped))
}
