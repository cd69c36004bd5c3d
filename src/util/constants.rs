// JamfLens - util/constants.rs
//
// Single source of truth for named constants, thresholds, and defaults.
// Classification thresholds live here so the enrichment rules and their
// tests read the same numbers.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "JamfLens";

/// Application identifier used for config directories.
pub const APP_ID: &str = "JamfLens";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Classification thresholds
// =============================================================================

/// Device counts as recently checked in when it reported fewer than this many
/// days ago.
pub const CHECK_IN_THRESHOLD_DAYS: i64 = 30;

/// Warranty counts as expiring soon when at most this many days remain.
pub const EXPIRING_SOON_THRESHOLD_DAYS: i64 = 90;

// =============================================================================
// Filter vocabulary
// =============================================================================

/// Selection label meaning "no constraint".
pub const ALL_LABEL: &str = "All";

/// Managed-status pseudo value matching both null and the literal string.
pub const UNMANAGED_LABEL: &str = "Unmanaged";

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth when collecting CSV files.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Hard upper bound on max depth.
pub const ABSOLUTE_MAX_DEPTH: usize = 32;

/// Maximum number of CSV files collected from a directory.
pub const DEFAULT_MAX_FILES: usize = 200;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Hard upper bound on max files.
pub const ABSOLUTE_MAX_FILES: usize = 5_000;

/// Default include glob patterns for inventory export discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.csv", "*.CSV"];

/// Default exclude glob patterns. Excludes previously written filtered
/// exports so re-running over an output directory does not double count.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "jamf_filtered_*.csv",
    "jamf_expired_*.csv",
    ".git",
    "~$*",
];

// =============================================================================
// Display
// =============================================================================

/// Default maximum number of result rows printed to the terminal.
pub const DEFAULT_MAX_DISPLAY_ROWS: usize = 200;

/// Hard upper bound on displayed rows.
pub const ABSOLUTE_MAX_DISPLAY_ROWS: usize = 100_000;

/// Maximum rendered width of a single table cell before truncation.
pub const MAX_CELL_WIDTH: usize = 40;

// =============================================================================
// Ingestion
// =============================================================================

/// Cell values read as missing, besides the empty cell. Matched exactly,
/// case-sensitive, the way spreadsheet and dataframe tools spell "no value".
pub const NULL_CELL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// =============================================================================
// Export
// =============================================================================

/// Export file name for the filtered inventory view.
pub const INVENTORY_EXPORT_FILE_NAME: &str = "jamf_filtered_inventory.csv";

/// Export file name for the expired warranty view.
pub const WARRANTY_EXPORT_FILE_NAME: &str = "jamf_expired_warranty.csv";

/// Timestamp format used when writing dates back out. `%.f` writes the
/// sub-second part only when it is non-zero.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
