// distress-triage - util/constants.rs
//
// Single source of truth for named constants, limits, and defaults.
// Scoring thresholds live next to the scorer; this file holds the
// operational knobs that config.toml may adjust.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "distress-triage";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "DistressTriage";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Import
// =============================================================================

/// File extensions accepted as listing exports (lowercase, no dot).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Maximum import file size in bytes. Listing exports are a few MB at most;
/// anything larger is almost certainly the wrong file.
pub const MAX_IMPORT_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256 MB

// =============================================================================
// Column mapping
// =============================================================================

/// Minimum number of auto-mapped fields before a file is processed without
/// manual mapping.
pub const DEFAULT_MIN_MAPPED_FIELDS: usize = 3;

/// Lower bound for the configurable mapping threshold.
pub const MIN_MIN_MAPPED_FIELDS: usize = 1;

/// Upper bound for the configurable mapping threshold (number of fields).
pub const MAX_MIN_MAPPED_FIELDS: usize = 15;

// =============================================================================
// Pipeline
// =============================================================================

/// State used when a row's state column is blank.
pub const DEFAULT_STATE: &str = "NSW";

/// Row count above which scoring fans out across the rayon pool.
/// Small batches finish faster sequentially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2_000;

/// Hard upper bound on the configurable parallel threshold.
pub const MAX_PARALLEL_THRESHOLD: usize = 1_000_000;

// =============================================================================
// Export
// =============================================================================

/// Number of rows above which an export warning is logged.
pub const DEFAULT_LARGE_EXPORT_THRESHOLD: usize = 50_000;

/// Maximum number of rows written in a single export operation.
pub const MAX_EXPORT_ROWS: usize = 5_000_000;

/// Prefix of the default export file name; the local date is appended.
pub const EXPORT_FILE_PREFIX: &str = "distressed_properties";

/// Separator used to join matched distress keywords in CSV exports.
pub const KEYWORD_SEPARATOR: &str = "; ";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a description included in debug output.
pub const DEBUG_MAX_TEXT_PREVIEW: usize = 120;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
