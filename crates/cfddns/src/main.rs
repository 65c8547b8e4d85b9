// # cfddns
//
// Single-pass Cloudflare dynamic DNS updater. Each invocation detects the
// public IPv4/IPv6 address, brings the A/AAAA records of one name in line
// with it and exits. Scheduling is left to cron or a systemd timer.
//
// This binary is a thin integration layer: it parses arguments, loads the
// configuration, sets up logging and wires the components together. All
// reconciliation logic lives in cfddns-core.
//
// ## Example
//
// ```bash
// cfddns --config /etc/cfddns/config.toml
// CFDDNS_API_KEY=... cfddns -c config.toml --dry-run -v
// ```

mod logging;

use anyhow::Context;
use cfddns_core::traits::ChangeNotifier;
use cfddns_core::{DdnsConfig, DdnsEngine, RunReport, ScriptNotifier};
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::CloudflareProvider;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use logging::LogTarget;

/// Exit codes for different termination scenarios
///
/// - 0: The run completed (individual families may have failed)
/// - 1: Configuration or startup error
/// - 2: Fatal runtime error (provider unreachable or answered garbage)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&cfddns_core::Error> for DdnsExitCode {
    fn from(err: &cfddns_core::Error) -> Self {
        match err {
            cfddns_core::Error::Config(_) => DdnsExitCode::ConfigError,
            _ => DdnsExitCode::RuntimeError,
        }
    }
}

/// Keep Cloudflare A/AAAA records in sync with this machine's public IP
#[derive(Debug, Parser)]
#[command(name = "cfddns", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "CFDDNS_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Detect and compare, but do not create or update records
    #[arg(short, long)]
    dry_run: bool,

    /// Log level, overrides the configuration file
    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// API key, overrides the configuration file
    #[arg(long, env = "CFDDNS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Cli {
    /// Load the configuration file and apply command-line overrides
    fn load_config(&self) -> anyhow::Result<DdnsConfig> {
        let mut config = DdnsConfig::load(&self.config)?;

        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.api_key = key.to_string();
        }

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", self.config.display()))?;

        Ok(config)
    }

    /// `--log-level` beats `--verbose`, which beats the file
    fn effective_log_level(&self, config: &DdnsConfig) -> String {
        match (&self.log_level, self.verbose) {
            (Some(level), _) => level.clone(),
            (None, true) => "debug".to_string(),
            (None, false) => config.log_level.to_lowercase(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let _log_guard = logging::initialize_tracing(
        &cli.effective_log_level(&config),
        &LogTarget::from_setting(config.log_file.as_deref()),
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = runtime.block_on(async {
        match run(&config, cli.dry_run).await {
            Ok(report) => {
                info!(failures = report.failures(), "Run finished");
                DdnsExitCode::Success
            }
            Err(e) => {
                error!("Run aborted: {}", e);
                DdnsExitCode::from(&e)
            }
        }
    });

    code.into()
}

/// Build the HTTP client shared by the echo service and the provider
fn build_http_client(config: &DdnsConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("cfddns/", env!("CARGO_PKG_VERSION")));

    if let Some(timeout) = config.http_timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Script notifier for the configured change script, if any
fn change_notifier(config: &DdnsConfig) -> Option<Box<dyn ChangeNotifier>> {
    config
        .change_script()
        .map(|path| Box::new(ScriptNotifier::new(path)) as Box<dyn ChangeNotifier>)
}

/// Wire the components and run a single reconciliation pass
async fn run(config: &DdnsConfig, dry_run: bool) -> cfddns_core::Result<RunReport> {
    info!(
        "cfddns {} started at {}",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().to_rfc3339()
    );

    if !config.has_subdomain() {
        warn!(
            "No subdomain configured, managing the records of {} itself",
            config.domain
        );
    }

    if dry_run {
        info!("Dry-run: records will not be modified");
    }

    let client = build_http_client(config)
        .map_err(|e| cfddns_core::Error::transport(format!("Failed to build HTTP client: {}", e)))?;

    let ip_source = HttpIpSource::from_config(client.clone(), config);
    let provider = CloudflareProvider::from_config(client, config)?;

    let notifier = change_notifier(config);

    let engine = DdnsEngine::new(Box::new(ip_source), Box::new(provider), notifier, config)?
        .with_dry_run(dry_run);

    // The engine owns the last client handle; dropping it closes idle connections
    engine.run_once().await
}
