// # ddnsd - DDNS Updater Daemon
//
// Thin process shell around ddns-core. All DNS and address logic lives in
// the library crates; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes tracing and the runtime
// 3. Wires the HTTP resolver and the Cloudflare provider into a `DdnsUpdater`
// 4. Runs one pass, or repeats passes on an interval, until a signal arrives
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### DNS Provider
// - `DDNS_PROVIDER_API_TOKEN`: Cloudflare API token (required)
// - `DDNS_PROVIDER_API_URL`: API base URL override (optional)
//
// ### Record
// - `DDNS_ZONE`: Zone the record lives in (required)
// - `DDNS_DOMAIN`: Fully qualified record name (required)
//
// ### Address Lookup
// - `DDNS_IP4_ENDPOINT`: IPv4 IP-echo endpoint (default https://api.ipify.org, empty disables)
// - `DDNS_IP6_ENDPOINT`: IPv6 IP-echo endpoint (unset disables)
// - `DDNS_HTTP_TIMEOUT_SECS`: Per-lookup timeout (default 10)
//
// ### Schedule
// - `DDNS_INTERVAL_SECS`: Repeat interval; unset runs a single pass
//
// ### Logging
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DDNS_PROVIDER_API_TOKEN=your_token
// export DDNS_ZONE=example.com
// export DDNS_DOMAIN=home.example.com
// export DDNS_IP6_ENDPOINT=https://api6.ipify.org
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::config::DEFAULT_IPV4_ENDPOINT;
use ddns_core::{
    CancellationToken, DdnsConfig, DdnsUpdater, DnsProvider, DomainUpdate, ProviderConfig, RecordType,
    UpdateOutcome,
};
use ddns_ip_http::HttpAddressResolver;
use ddns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (a family failed in one-shot mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    ddns: DdnsConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{key} is required. Set it via: export {key}=..."))
        };
        let number = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{key} must be a number of seconds. Got: {v}"))
                })
                .transpose()
        };

        let provider = ProviderConfig::Cloudflare {
            api_token: required("DDNS_PROVIDER_API_TOKEN")?,
            base_url: lookup("DDNS_PROVIDER_API_URL").filter(|v| !v.is_empty()),
        };

        let mut ddns = DdnsConfig::new(required("DDNS_ZONE")?, required("DDNS_DOMAIN")?, provider);

        // an explicitly empty IPv4 endpoint turns IPv4 off
        ddns.ipv4_endpoint = match lookup("DDNS_IP4_ENDPOINT") {
            None => Some(DEFAULT_IPV4_ENDPOINT.to_string()),
            Some(v) if v.is_empty() => None,
            Some(v) => Some(v),
        };
        ddns.ipv6_endpoint = lookup("DDNS_IP6_ENDPOINT").filter(|v| !v.is_empty());

        if let Some(timeout) = number("DDNS_HTTP_TIMEOUT_SECS")? {
            ddns.http_timeout_secs = timeout;
        }
        ddns.interval_secs = number("DDNS_INTERVAL_SECS")?;

        let log_level = parse_log_level(&lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()))?;

        Ok(Self { ddns, log_level })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.ddns.validate()?;
        Ok(())
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let updater = match build_updater(&config.ddns) {
        Ok(updater) => updater,
        Err(e) => {
            error!("Failed to initialize: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!(
        "Starting ddnsd for {} in zone {} (provider: {})",
        config.ddns.domain,
        config.ddns.zone,
        updater.provider().provider_name()
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(&updater, &config.ddns)).into()
}

fn build_updater(config: &DdnsConfig) -> Result<DdnsUpdater> {
    let resolver = HttpAddressResolver::with_timeout(config.http_timeout())
        .context("failed to create the address resolver")?;
    let provider = CloudflareProvider::from_config(&config.provider)
        .context("failed to create the DNS provider")?;

    Ok(DdnsUpdater::new(Box::new(resolver), Box::new(provider)))
}

/// Run one pass, or repeat passes until a shutdown signal arrives
async fn run_daemon(updater: &DdnsUpdater, config: &DdnsConfig) -> DdnsExitCode {
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => {
                info!("Received shutdown signal: {}", signal);
                trigger.cancel();
            }
            Err(e) => error!("Shutdown handler error: {}", e),
        }
    });

    let Some(interval) = config.interval() else {
        return one_shot_exit_code(run_pass(updater, config, &cancel).await);
    };

    info!("Updating every {:?}", interval);
    loop {
        if run_pass(updater, config, &cancel).await == PassResult::Canceled {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("Shutting down daemon");
    DdnsExitCode::CleanShutdown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassResult {
    Ok,
    Failed,
    Canceled,
}

/// Update the A and AAAA records concurrently
async fn run_pass(
    updater: &DdnsUpdater,
    config: &DdnsConfig,
    cancel: &CancellationToken,
) -> PassResult {
    let ipv4 = async {
        match &config.ipv4_endpoint {
            Some(endpoint) => Some(
                updater
                    .update_domain4(cancel, &config.zone, &config.domain, endpoint)
                    .await,
            ),
            None => None,
        }
    };
    let ipv6 = async {
        match &config.ipv6_endpoint {
            Some(endpoint) => Some(
                updater
                    .update_domain6(cancel, &config.zone, &config.domain, endpoint)
                    .await,
            ),
            None => None,
        }
    };

    let (ipv4, ipv6) = tokio::join!(ipv4, ipv6);

    [(RecordType::A, ipv4), (RecordType::Aaaa, ipv6)]
        .into_iter()
        .filter_map(|(record_type, result)| result.map(|r| report(record_type, r)))
        .fold(PassResult::Ok, combine)
}

/// Merge two family results; a failure outranks a cancellation
fn combine(acc: PassResult, result: PassResult) -> PassResult {
    match (acc, result) {
        (PassResult::Failed, _) | (_, PassResult::Failed) => PassResult::Failed,
        (PassResult::Canceled, _) | (_, PassResult::Canceled) => PassResult::Canceled,
        _ => PassResult::Ok,
    }
}

fn one_shot_exit_code(result: PassResult) -> DdnsExitCode {
    match result {
        PassResult::Ok | PassResult::Canceled => DdnsExitCode::CleanShutdown,
        PassResult::Failed => DdnsExitCode::RuntimeError,
    }
}

/// Log the result of one family's update
fn report(record_type: RecordType, result: ddns_core::Result<DomainUpdate>) -> PassResult {
    match result {
        Ok(update) => {
            info!("Got current address for {} record: {}", record_type, update.address);
            match &update.outcome {
                UpdateOutcome::Updated { record, previous_content } => info!(
                    "Updated record {} {} from {} to {}",
                    record.name, record.record_type, previous_content, record.content
                ),
                UpdateOutcome::NoChange { record } => info!(
                    "No change for record {} {} ({})",
                    record.name, record.record_type, record.content
                ),
            }
            PassResult::Ok
        }
        Err(e) if e.is_canceled() => {
            warn!("{} update canceled", record_type);
            PassResult::Canceled
        }
        Err(e) => {
            error!("{} update failed: {}", record_type, e);
            PassResult::Failed
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
