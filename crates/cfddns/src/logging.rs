//! Tracing setup for the cfddns binary

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Stdout,
    /// Appended to this file
    File(PathBuf),
}

impl LogTarget {
    /// Interpret the `log_file` setting
    pub fn from_setting(log_file: Option<&str>) -> Self {
        match log_file.map(str::trim) {
            None | Some("") => LogTarget::Stderr,
            Some(value) if value.eq_ignore_ascii_case("stdout") => LogTarget::Stdout,
            Some(path) => LogTarget::File(PathBuf::from(path)),
        }
    }
}

/// `RUST_LOG` wins over the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.trim().is_empty() => EnvFilter::new(filter),
        _ => EnvFilter::new(level),
    }
}

/// Install the global subscriber
///
/// The returned guard flushes buffered file output when dropped and must be
/// held until the process exits.
pub fn initialize_tracing(level: &str, target: &LogTarget) -> Option<WorkerGuard> {
    let filter = env_filter(level);

    let LogTarget::File(path) = target else {
        let layer = match target {
            LogTarget::Stdout => build_fmt_layer(std::io::stdout, true),
            _ => build_fmt_layer(std::io::stderr, true),
        };
        install(filter, layer);
        return None;
    };

    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            install(filter, build_fmt_layer(writer, false));
            Some(guard)
        }
        Err(e) => {
            install(filter, build_fmt_layer(std::io::stderr, true));
            tracing::error!(
                "Cannot open log file {}: {}; logging to stderr",
                path.display(),
                e
            );
            None
        }
    }
}

fn install(filter: EnvFilter, layer: Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>) {
    if let Err(e) = tracing_subscriber::registry().with(layer).with(filter).try_init() {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn build_fmt_layer<S, W>(writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    Box::new(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_ansi(ansi),
    )
}
