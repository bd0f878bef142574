//! Logging initialization.
//!
//! `tracing-subscriber` with an `EnvFilter`; output always goes to stderr so
//! stdout stays clean for JSON render states and the page HTML.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resolved logging settings after CLI flags are applied over `[logging]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of the pretty format
    pub json: bool,
}

impl LogSettings {
    pub fn resolve(
        config: &captioner_core::config::LoggingConfig,
        verbose_override: bool,
        json_logs_override: bool,
    ) -> Self {
        let level = if verbose_override && !matches!(config.level.as_str(), "debug" | "trace") {
            "debug".to_string()
        } else {
            config.level.clone()
        };
        Self {
            level,
            json: json_logs_override || config.format == "json",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `settings.level`.
pub fn init(settings: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(console::colors_enabled_stderr()),
            )
            .init();
    }
}

/// Initialize logging from the loaded config plus CLI flags.
pub fn init_from_config(
    config: &captioner_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    init(&LogSettings::resolve(
        &config.logging,
        verbose_override,
        json_logs_override,
    ));
}
