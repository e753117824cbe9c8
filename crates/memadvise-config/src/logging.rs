use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

/// `[logging]` section of `memadvise.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or `EnvFilter` directives such as
    /// `memadvise.process=trace`.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,

    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Extra append-only sink. Ignored with a warning if it cannot be opened.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        DEFAULT_LEVEL.to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// `level` as `EnvFilter` directives. `EnvFilter` already matches level
    /// names case-insensitively; only the `warning`/`none` aliases need mapping.
    pub(crate) fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            DEFAULT_LEVEL.to_owned()
        } else if level.eq_ignore_ascii_case("warning") {
            "warn".to_owned()
        } else if level.eq_ignore_ascii_case("none") {
            "off".to_owned()
        } else {
            level.to_owned()
        }
    }

    /// Filter for the global subscriber. `RUST_LOG`, when set, is appended to
    /// the configured directives so it can raise individual targets.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let from_env = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let mut candidates = Vec::with_capacity(3);
        if let Some(env) = from_env {
            candidates.push(format!("{configured},{env}"));
            candidates.push(env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber. Later calls are no-ops.
pub fn init_tracing(logging: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let file = logging.file.as_ref().map(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
        });

        let mut make_writer = BoxMakeWriter::new(io::sink);
        if logging.stderr {
            make_writer = BoxMakeWriter::new(make_writer.and(io::stderr));
        }
        let mut open_error = None;
        match file {
            Some(Ok(file)) => {
                make_writer = BoxMakeWriter::new(make_writer.and(Mutex::new(file)));
            }
            Some(Err(err)) => open_error = Some(err),
            None => {}
        }

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if logging.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry()
            .with(logging.env_filter())
            .with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        if let (Some(err), Some(path)) = (open_error, logging.file.as_ref()) {
            tracing::warn!(
                target: "memadvise.config",
                path = %path.display(),
                error = %err,
                "cannot open log file; logging to remaining sinks only"
            );
        }
    });
}
