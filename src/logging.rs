//! Logging setup
//!
//! The library only emits `tracing` events; embedders that have no
//! subscriber of their own can install one here. Configuration comes from
//! code or from environment variables:
//!
//! - `CLASSMETA_LOG_LEVEL`: trace, debug, info, warn, error
//! - `CLASSMETA_LOG_FILE`: directory for daily-rotated log files
//! - `CLASSMETA_LOG_JSON`: JSON output when set
//! - `CLASSMETA_LOG_SPANS`: span open/close events when set
//! - `CLASSMETA_LOG`: filter directives, overriding the level

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const FILTER_ENV: &str = "CLASSMETA_LOG";

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily-rotated files `<directory>/<prefix>.YYYY-MM-DD`
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: bool,
    /// Extra filter directives, e.g. "classmeta::cache=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("CLASSMETA_LOG_LEVEL") {
            config.level = parse_level(&level).unwrap_or(Level::INFO);
        }

        if let Ok(directory) = std::env::var("CLASSMETA_LOG_FILE") {
            config.output = LogOutput::File {
                directory,
                prefix: "classmeta".to_string(),
            };
        }

        if std::env::var("CLASSMETA_LOG_JSON").is_ok() {
            config.format = LogFormat::Json;
        }

        config.span_events = std::env::var("CLASSMETA_LOG_SPANS").is_ok();

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Install a global subscriber. Only the first call in a process has an
/// effect; later calls, or a subscriber installed elsewhere, return `None`.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(config: LogConfig) -> Option<WorkerGuard> {
    let mut guard = None;
    LOGGER_INITIALIZED.get_or_init(|| {
        guard = install(config);
    });
    guard
}

/// Initialize logging from `CLASSMETA_*` environment variables
pub fn init_from_env() -> Option<WorkerGuard> {
    init_logging(LogConfig::from_env())
}

fn install(config: LogConfig) -> Option<WorkerGuard> {
    let filter = build_filter(&config);

    let (writer, guard) = match &config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => tracing_appender::non_blocking(rolling::daily(directory, prefix)),
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_span_events(span_events_config(config.span_events));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    };

    match tracing_subscriber::registry().with(layer.with_filter(filter)).try_init() {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("classmeta={}", config.level.as_str().to_lowercase()))
    });

    config
        .filter
        .iter()
        .flat_map(|filter| filter.split(','))
        .filter_map(|directive| directive.trim().parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

fn parse_level(level: &str) -> Option<Level> {
    level.trim().parse().ok()
}
