// distress-triage - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Data-quality problems (bad prices, missing columns) are NOT errors:
// they degrade to empty values inside the pipeline. These types cover
// the outer surfaces only: reading files, manual mapping, user-supplied
// query ranges, export, and configuration.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all distress-triage operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TriageError {
    /// Reading or decoding the listing export failed.
    Ingest(IngestError),

    /// Column mapping could not be completed.
    Mapping(MappingError),

    /// User-supplied query parameters are invalid.
    Query(QueryError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for TriageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest(e) => write!(f, "Import error: {e}"),
            Self::Mapping(e) => write!(f, "Column mapping error: {e}"),
            Self::Query(e) => write!(f, "Query error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for TriageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ingest(e) => Some(e),
            Self::Mapping(e) => Some(e),
            Self::Query(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingest errors
// ---------------------------------------------------------------------------

/// Errors related to reading a listing export.
#[derive(Debug)]
pub enum IngestError {
    /// The file extension is not one of the accepted tabular formats.
    UnsupportedFileType { path: PathBuf },

    /// File exceeds the maximum allowed import size.
    FileTooLarge { path: PathBuf, size: u64, max_size: u64 },

    /// The file has no header row.
    MissingHeader { path: PathBuf },

    /// CSV decoding failed (malformed quoting, invalid UTF-8, ...).
    Csv { path: PathBuf, source: csv::Error },

    /// I/O error opening or reading the file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFileType { path } => write!(
                f,
                "'{}' is not a CSV file. Export the listings as .csv (or .tsv) and try again.",
                path.display()
            ),
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingHeader { path } => {
                write!(f, "'{}' has no header row", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "Failed to read CSV '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "I/O error reading '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<IngestError> for TriageError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

// ---------------------------------------------------------------------------
// Mapping errors
// ---------------------------------------------------------------------------

/// Errors related to column mapping and manual overrides.
#[derive(Debug, PartialEq, Eq)]
pub enum MappingError {
    /// Override was not in `field=Header` form.
    MalformedOverride { raw: String },

    /// Override names a field that does not exist.
    UnknownField { field: String },

    /// Override names a header that is not present in the file.
    UnknownHeader { field: String, header: String },

    /// Too few fields were recognised to trust the mapping.
    TooFewMappedFields {
        mapped: usize,
        required: usize,
        headers: Vec<String>,
    },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedOverride { raw } => write!(
                f,
                "Mapping override '{raw}' must be in the form field=Header"
            ),
            Self::UnknownField { field } => write!(
                f,
                "Unknown field '{field}' in mapping override. \
                 Use --show-mapping to list the available fields."
            ),
            Self::UnknownHeader { field, header } => write!(
                f,
                "Cannot map '{field}' to '{header}': no such column in the file"
            ),
            Self::TooFewMappedFields {
                mapped,
                required,
                headers,
            } => write!(
                f,
                "Only {mapped} column(s) recognised (need at least {required}). \
                 Map columns manually with --map field=Header, or pass --force. \
                 Columns in file: {}",
                headers.join(", ")
            ),
        }
    }
}

impl std::error::Error for MappingError {}

impl From<MappingError> for TriageError {
    fn from(e: MappingError) -> Self {
        Self::Mapping(e)
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Errors related to user-supplied query parameters.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryError {
    /// A range filter has its lower bound above its upper bound.
    InvalidRange {
        name: &'static str,
        min: i64,
        max: i64,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { name, min, max } => {
                write!(f, "Invalid {name} range: minimum {min} is above maximum {max}")
            }
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QueryError> for TriageError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum row count.
    TooManyRows { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyRows { count, max } => write!(
                f,
                "Export of {count} rows exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for TriageError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for TriageError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for distress-triage results.
pub type Result<T> = std::result::Result<T, TriageError>;
