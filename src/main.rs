// JamfLens - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation, then config loading
// 3. Input collection and batch loading
// 4. Rendering the selected page and optional export

use chrono::{DateTime, Utc};
use clap::Parser;
use jamflens::app::{load, state::AppState};
use jamflens::core::dates::parse_timestamp;
use jamflens::core::export::{self, ExportFormat};
use jamflens::core::filter::FilterSpec;
use jamflens::core::report::Page;
use jamflens::platform::config::{self, AppConfig, PlatformPaths};
use jamflens::ui::render;
use jamflens::util::error::{JamfLensError, Result};
use jamflens::util::{self, constants};
use std::path::PathBuf;
use std::process::ExitCode;

/// JamfLens - check-in and warranty reporting over Jamf inventory exports.
///
/// Load one or more CSV exports, enrich each device with department,
/// check-in recency and warranty status, then filter, summarise and export.
#[derive(Parser, Debug)]
#[command(name = "JamfLens", version, about)]
struct Cli {
    /// Inventory CSV files, concatenated in the order given.
    files: Vec<PathBuf>,

    /// Directory to search for additional CSV files.
    #[arg(long = "dir")]
    dir: Option<PathBuf>,

    /// Page to show.
    #[arg(long = "page", value_enum, default_value = "inventory")]
    page: Page,

    /// Department code (e.g. PRO) or "All".
    #[arg(long = "department", default_value = constants::ALL_LABEL)]
    department: String,

    /// Managed status value, "Unmanaged" or "All" (inventory page).
    #[arg(long = "managed", default_value = constants::ALL_LABEL)]
    managed: String,

    /// Operating system or "All" (inventory page).
    #[arg(long = "os", default_value = constants::ALL_LABEL)]
    os: String,

    /// Case-insensitive text search across all columns (inventory page).
    #[arg(short = 's', long = "search", default_value = "")]
    search: String,

    /// Reference time for day counts (defaults to now).
    #[arg(long = "as-of")]
    as_of: Option<String>,

    /// Write the page's result set to this file or directory.
    #[arg(short = 'o', long = "export")]
    export: Option<PathBuf>,

    /// Export format (overrides config).
    #[arg(long = "format", value_enum)]
    format: Option<ExportFormat>,

    /// Print the available filter values and exit.
    #[arg(long = "options")]
    options: bool,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_handle = util::logging::init(cli.debug);

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "JamfLens starting"
    );

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);
    log_handle.apply_config_level(app_config.log_level.as_deref());

    for warning in &config_warnings {
        eprintln!("Config warning: {warning}");
    }

    let now = match cli.as_of.as_deref() {
        None => Utc::now(),
        Some(raw) => match parse_timestamp(raw) {
            Some(ts) => ts,
            None => {
                eprintln!("Error: --as-of '{raw}' is not a recognised date");
                return ExitCode::from(2);
            }
        },
    };

    match run(&cli, &app_config, now) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "JamfLens failed");
            eprintln!("Error: {e}");
            match e {
                JamfLensError::Export(_) => ExitCode::FAILURE,
                _ => ExitCode::from(2),
            }
        }
    }
}

/// Load the inputs, render the selected page and write the optional export.
fn run(cli: &Cli, app_config: &AppConfig, now: DateTime<Utc>) -> Result<()> {
    let (paths, walk_warnings) =
        load::collect_inputs(&cli.files, cli.dir.as_deref(), &app_config.discovery())?;
    for warning in &walk_warnings {
        eprintln!("Warning: {warning}");
    }

    let (uploads, read_errors) = load::read_uploads(&paths);

    let mut state = AppState::new(now);
    state.load(&uploads);
    state.load_errors.extend(read_errors);
    state.page = cli.page;
    state.inventory_filter =
        FilterSpec::from_labels(&cli.department, &cli.managed, &cli.os, &cli.search);
    state.warranty_department = cli.department.clone();

    eprint!("{}", render::render_load_errors(&state.load_errors));

    if cli.options {
        print!("{}", render::render_options(&state.filter_options()));
        return Ok(());
    }

    let max_rows = app_config.max_rows;
    let page_text = match state.page {
        Page::Inventory => render::render_inventory(&state.inventory_report(), max_rows),
        Page::Warranty => {
            let department = state.warranty_department.clone();
            render::render_warranty(&state.warranty_report(), &department, max_rows)
        }
    };
    print!("{page_text}");

    if let Some(ref target) = cli.export {
        let format = cli.format.unwrap_or(app_config.export_format);
        let path = export::resolve_export_path(target, state.page.export_file_name(), format);
        let count = export::write_export(&state.export_batch(), &path, format)?;
        eprintln!("Exported {count} record(s) to {}", path.display());
    }

    Ok(())
}
