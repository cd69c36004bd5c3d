// JamfLens - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation. Invalid values produce warnings and fall back to the named
// defaults in util::constants; the application always starts.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::discovery::DiscoveryConfig;
use crate::core::export::ExportFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Resolved platform paths for JamfLens configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/jamflens/ or %APPDATA%\JamfLens\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths, falling back to the current
    /// directory if platform dirs cannot be determined.
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
/// Unknown keys are ignored so a newer config file still loads.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub discovery: DiscoverySection,
    pub display: DisplaySection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub max_depth: Option<usize>,
    pub max_files: Option<usize>,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[display]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Maximum rows printed per table.
    pub max_rows: Option<usize>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// "csv" or "json". Kept as a string so a typo is a warning, not a parse failure.
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Discovery --
    pub max_depth: usize,
    pub max_files: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    // -- Display --
    pub max_rows: usize,

    // -- Export --
    pub export_format: ExportFormat,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let discovery = DiscoveryConfig::default();
        Self {
            max_depth: discovery.max_depth,
            max_files: discovery.max_files,
            include_patterns: discovery.include_patterns,
            exclude_patterns: discovery.exclude_patterns,
            max_rows: constants::DEFAULT_MAX_DISPLAY_ROWS,
            export_format: ExportFormat::default(),
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Discovery settings for a directory walk.
    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_depth: self.max_depth,
            max_files: self.max_files,
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

/// Read and parse config.toml without validating values.
pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load and validate config.toml at `config_path`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings; an unreadable or unparseable file
/// yields defaults with one warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(config_path) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// A numeric setting inside `range`, or `default` with a warning.
fn ranged<T>(
    key: &str,
    value: Option<T>,
    range: RangeInclusive<T>,
    default: T,
    warnings: &mut Vec<String>,
) -> T
where
    T: PartialOrd + Copy + Display,
{
    match value {
        None => default,
        Some(v) if range.contains(&v) => v,
        Some(v) => {
            warnings.push(format!(
                "{key} = {v} is out of range ({}-{}). Using default ({default}).",
                range.start(),
                range.end(),
            ));
            default
        }
    }
}

/// Check every field, collecting one warning per rejected value.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let defaults = AppConfig::default();

    let max_depth = ranged(
        "[discovery] max_depth",
        raw.discovery.max_depth,
        1..=constants::ABSOLUTE_MAX_DEPTH,
        defaults.max_depth,
        warnings,
    );
    let max_files = ranged(
        "[discovery] max_files",
        raw.discovery.max_files,
        constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES,
        defaults.max_files,
        warnings,
    );
    let max_rows = ranged(
        "[display] max_rows",
        raw.display.max_rows,
        1..=constants::ABSOLUTE_MAX_DISPLAY_ROWS,
        defaults.max_rows,
        warnings,
    );

    let include_patterns = match raw.discovery.include_patterns {
        Some(patterns) => checked_patterns("include_patterns", patterns, warnings),
        None => defaults.include_patterns,
    };
    let exclude_patterns = match raw.discovery.exclude_patterns {
        Some(patterns) => checked_patterns("exclude_patterns", patterns, warnings),
        None => defaults.exclude_patterns,
    };

    let export_format = match raw.export.format.as_deref().map(str::to_lowercase) {
        None => defaults.export_format,
        Some(f) if f == "csv" => ExportFormat::Csv,
        Some(f) if f == "json" => ExportFormat::Json,
        Some(other) => {
            warnings.push(format!(
                "[export] format = \"{other}\" is not recognised. \
                 Expected \"csv\" or \"json\". Using default (csv).",
            ));
            defaults.export_format
        }
    };

    let log_level = raw.logging.level.and_then(|level| {
        let lower = level.to_lowercase();
        if LOG_LEVELS.contains(&lower.as_str()) {
            Some(lower)
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
            None
        }
    });

    AppConfig {
        max_depth,
        max_files,
        include_patterns,
        exclude_patterns,
        max_rows,
        export_format,
        log_level,
    }
}

/// Keep only patterns that compile as globs.
fn checked_patterns(key: &str, patterns: Vec<String>, warnings: &mut Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .filter(|p| match glob::Pattern::new(p) {
            Ok(_) => true,
            Err(e) => {
                warnings.push(format!(
                    "[discovery] {key} entry \"{p}\" is not a valid glob ({e}). Ignoring it."
                ));
                false
            }
        })
        .collect()
}
