// JamfLens - util/logging.rs
//
// tracing subscriber setup. All diagnostics go to stderr; stdout is
// reserved for the rendered report so it can be piped.
//
// Level selection, highest priority first:
//   RUST_LOG, then --debug, then [logging] level in config.toml, then "info".
//
// The subscriber is installed before config.toml is read, so config loading
// is itself logged. The config level is applied afterwards through a reload
// handle. Device names and usernames are only ever logged at trace level.

use super::constants::{APP_NAME, APP_VERSION, DEFAULT_LOG_LEVEL};
use tracing::Subscriber;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

fn select_filter(debug_flag: bool, config_level: Option<&str>) -> EnvFilter {
    match (std::env::var_os("RUST_LOG"), debug_flag, config_level) {
        (Some(_), _, _) => EnvFilter::from_default_env(),
        (None, true, _) => EnvFilter::new("debug"),
        (None, false, Some(level)) => EnvFilter::new(level),
        (None, false, None) => EnvFilter::new(DEFAULT_LOG_LEVEL),
    }
}

/// Swaps the active level filter after the subscriber is installed.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    debug_flag: bool,
}

impl LogHandle {
    /// Apply the `[logging] level` from config.toml. RUST_LOG and `--debug`
    /// still take priority over it.
    pub fn apply_config_level(&self, config_level: Option<&str>) {
        if config_level.is_none() {
            return;
        }
        self.replace(select_filter(self.debug_flag, config_level));
    }

    fn replace(&self, filter: EnvFilter) {
        if let Err(e) = self.filter.reload(filter) {
            tracing::warn!(error = %e, "Could not change log level");
        }
    }
}

fn build(
    initial: EnvFilter,
    debug_flag: bool,
) -> (impl Subscriber + Send + Sync + 'static, LogHandle) {
    let (filter, handle) = reload::Layer::new(initial);
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(debug_flag)
            .with_file(debug_flag)
            .with_line_number(debug_flag)
            .compact(),
    );
    let handle = LogHandle {
        filter: handle,
        debug_flag,
    };
    (subscriber, handle)
}

/// Install the global subscriber. Call once, before any work is logged.
pub fn init(debug_flag: bool) -> LogHandle {
    let (subscriber, handle) = build(select_filter(debug_flag, None), debug_flag);
    subscriber.init();

    tracing::debug!(app = APP_NAME, version = APP_VERSION, "Logging ready");
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_level_can_change_after_install() {
        let (subscriber, handle) = build(EnvFilter::new("info"), false);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));

            handle.replace(EnvFilter::new("debug"));
            assert!(tracing::enabled!(Level::DEBUG));

            handle.replace(EnvFilter::new("warn"));
            assert!(!tracing::enabled!(Level::INFO));
        });
    }

    #[test]
    fn test_missing_config_level_keeps_current_filter() {
        let (subscriber, handle) = build(EnvFilter::new("debug"), false);
        tracing::subscriber::with_default(subscriber, || {
            handle.apply_config_level(None);
            assert!(tracing::enabled!(Level::DEBUG));
        });
    }
}
