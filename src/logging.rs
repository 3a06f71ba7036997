use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Log file name prefix inside `log_dir`
const LOG_FILE_NAME: &str = "heimdall.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the `EnvFilter`; `RUST_LOG` wins over the configured level
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber.
///
/// Console output always goes to stderr. When `log_dir` is set a daily
/// rolling file is added; the returned guard must be held for the lifetime
/// of the process or buffered file output is lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.json)];

    let guard = match &config.log_dir {
        Some(dir) => {
            ensure_log_dir(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_NAME));
            let layer = if config.json {
                fmt::layer().json().with_writer(writer).with_ansi(false).boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .boxed()
            };
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(build_filter(&config.level))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        level = %config.level,
        json = config.json,
        log_dir = ?config.log_dir,
        "logging initialized"
    );

    Ok(guard)
}

fn console_layer(json: bool) -> BoxedLayer {
    if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    }
}

/// Make sure the log directory exists
fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    Ok(())
}
