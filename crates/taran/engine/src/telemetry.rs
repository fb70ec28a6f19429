//! Tracing initialization

use serde::{Deserialize, Deserializer, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    ///
    /// Accepts `trace`..`error`, the names `NOTSET`, `DEBUG`, `INFO`,
    /// `WARNING`, `ERROR`, `CRITICAL`, or their numeric values 0-50.
    #[serde(default = "default_level", deserialize_with = "deserialize_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = normalize_level_name(level).to_string();
        self
    }

    pub fn with_json_format(mut self) -> Self {
        self.json = true;
        self
    }
}

fn default_level() -> String {
    "debug".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelSetting {
    Number(i64),
    Name(String),
}

fn deserialize_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let level = match LevelSetting::deserialize(deserializer)? {
        LevelSetting::Number(n) => normalize_level_number(n),
        LevelSetting::Name(name) => normalize_level_name(&name),
    };
    Ok(level.to_string())
}

/// Map a level name onto a tracing filter directive; unknown names mean `debug`
pub fn normalize_level_name(name: &str) -> &'static str {
    match name.trim().to_ascii_uppercase().as_str() {
        "NOTSET" | "TRACE" => "trace",
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "debug",
    }
}

/// Map a numeric level (0, 10, .., 50) onto a tracing filter directive
pub fn normalize_level_number(level: i64) -> &'static str {
    match level {
        0 => "trace",
        10 => "debug",
        20 => "info",
        30 => "warn",
        40 | 50 => "error",
        _ => "debug",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true);
        subscriber.with(fmt_layer).try_init()
    } else {
        let fmt_layer = fmt::layer().with_target(true).with_thread_ids(false);
        subscriber.with(fmt_layer).try_init()
    }
}
