// distress-triage - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::pipeline::PipelineConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for distress-triage configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/distresstriage/ or %APPDATA%\DistressTriage\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[mapping]` section.
    pub mapping: MappingSection,
    /// `[pipeline]` section.
    pub pipeline: PipelineSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[mapping]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct MappingSection {
    /// Minimum auto-mapped fields before a file is processed unattended.
    pub min_mapped_fields: Option<usize>,
}

/// `[pipeline]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// State used when a row's state cell is blank.
    pub default_state: Option<String>,
    /// Row count above which scoring runs in parallel.
    pub parallel_threshold: Option<usize>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Warn before exporting this many rows.
    pub large_export_warning_threshold: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Mapping confidence gate.
    pub min_mapped_fields: usize,
    /// Row pipeline settings.
    pub pipeline: PipelineConfig,
    /// Export warning threshold.
    pub large_export_threshold: usize,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_mapped_fields: constants::DEFAULT_MIN_MAPPED_FIELDS,
            pipeline: PipelineConfig::default(),
            large_export_threshold: constants::DEFAULT_LARGE_EXPORT_THRESHOLD,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning: the tool still runs.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    match toml::from_str::<RawConfig>(&content) {
        Ok(raw) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            validate(raw)
        }
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            (AppConfig::default(), warnings)
        }
    }
}

/// Load a config file the user named explicitly (`--config`).
///
/// Unlike `load_config`, a missing or unparseable file is an error: the user
/// asked for that file, so silently using defaults would hide a typo.
/// Out-of-range values are still warnings.
pub fn load_explicit_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %config_path.display(), "Loaded config file");
    Ok(validate(raw))
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> (AppConfig, Vec<String>) {
    match toml::from_str::<RawConfig>(content) {
        Ok(raw) => validate(raw),
        Err(e) => (
            AppConfig::default(),
            vec![format!("Failed to parse config: {e}. Using defaults.")],
        ),
    }
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Mapping: min_mapped_fields --
    if let Some(min) = raw.mapping.min_mapped_fields {
        if (constants::MIN_MIN_MAPPED_FIELDS..=constants::MAX_MIN_MAPPED_FIELDS).contains(&min) {
            config.min_mapped_fields = min;
        } else {
            warnings.push(format!(
                "[mapping] min_mapped_fields = {min} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MIN_MAPPED_FIELDS,
                constants::MAX_MIN_MAPPED_FIELDS,
                constants::DEFAULT_MIN_MAPPED_FIELDS,
            ));
        }
    }

    // -- Pipeline: default_state --
    if let Some(ref state) = raw.pipeline.default_state {
        let state = state.trim();
        let valid = (2..=3).contains(&state.len()) && state.chars().all(|c| c.is_ascii_alphabetic());
        if valid {
            config.pipeline.default_state = state.to_ascii_uppercase();
        } else {
            warnings.push(format!(
                "[pipeline] default_state = \"{state}\" is not a state code. Using default ({}).",
                constants::DEFAULT_STATE,
            ));
        }
    }

    // -- Pipeline: parallel_threshold --
    if let Some(threshold) = raw.pipeline.parallel_threshold {
        if threshold <= constants::MAX_PARALLEL_THRESHOLD {
            config.pipeline.parallel_threshold = threshold;
        } else {
            warnings.push(format!(
                "[pipeline] parallel_threshold = {threshold} is out of range (0-{}). Using default ({}).",
                constants::MAX_PARALLEL_THRESHOLD,
                constants::DEFAULT_PARALLEL_THRESHOLD,
            ));
        }
    }

    // -- Export: large_export_warning_threshold --
    if let Some(threshold) = raw.export.large_export_warning_threshold {
        if (1..=constants::MAX_EXPORT_ROWS).contains(&threshold) {
            config.large_export_threshold = threshold;
        } else {
            warnings.push(format!(
                "[export] large_export_warning_threshold = {threshold} is out of range (1-{}). Using default ({}).",
                constants::MAX_EXPORT_ROWS,
                constants::DEFAULT_LARGE_EXPORT_THRESHOLD,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}
