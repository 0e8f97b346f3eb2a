// # publicip - Public IP Lookup
//
// Thin host for the lookup library. It:
// 1. Reads provider settings and the lookup request from environment variables
// 2. Resolves the provider configuration once
// 3. Runs a single lookup
// 4. Prints the result as JSON on stdout
//
// Logs go to stderr so stdout stays machine readable.
//
// ## Configuration
//
// ### Provider
// - `PUBLICIP_PROVIDER_URL`: ifconfig.co-compatible service (default `https://ifconfig.co/`)
// - `PUBLICIP_TIMEOUT`: Request timeout (default `5s`)
// - `PUBLICIP_RATE_LIMIT_RATE`: Time until the rate limit resets (default `500ms`)
// - `PUBLICIP_RATE_LIMIT_BURST`: Requests per rate period (default `1`)
//
// ### Request
// - `PUBLICIP_IP_VERSION`: Force `v4` or `v6`
// - `PUBLICIP_SOURCE_IP`: Local address to connect from
//
// ### Logging
// - `PUBLICIP_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//
// ## Example
//
// ```bash
// export PUBLICIP_IP_VERSION=v6
// export PUBLICIP_TIMEOUT=10s
//
// publicip
// ```

use anyhow::{Context, Result};
use publicip_core::{IpVersion, LookupRequest, LookupResult, ProviderConfig, ProviderSettings};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const TOOL_NAME: &str = "publicip";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const COMMIT: &str = match option_env!("PUBLICIP_BUILD_COMMIT") {
    Some(commit) => commit,
    None => "",
};
const BUILD_DATE: &str = match option_env!("PUBLICIP_BUILD_DATE") {
    Some(date) => date,
    None => "",
};

/// Exit codes for the outcome of one invocation
///
/// - 0: Lookup succeeded
/// - 1: Configuration or startup error
/// - 2: Lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublicIpExitCode {
    Success = 0,
    ConfigError = 1,
    LookupError = 2,
}

impl From<PublicIpExitCode> for ExitCode {
    fn from(code: PublicIpExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug, Default)]
struct Config {
    provider_url: Option<String>,
    timeout: Option<String>,
    rate_limit_rate: Option<String>,
    rate_limit_burst: Option<i64>,
    ip_version: Option<String>,
    source_ip: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from any variable source
    ///
    /// Empty values count as unset.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let rate_limit_burst = get("PUBLICIP_RATE_LIMIT_BURST")
            .map(|value| {
                value.trim().parse::<i64>().with_context(|| {
                    format!("PUBLICIP_RATE_LIMIT_BURST '{}' is not a number", value)
                })
            })
            .transpose()?;

        Ok(Self {
            provider_url: get("PUBLICIP_PROVIDER_URL"),
            timeout: get("PUBLICIP_TIMEOUT"),
            rate_limit_rate: get("PUBLICIP_RATE_LIMIT_RATE"),
            rate_limit_burst,
            ip_version: get("PUBLICIP_IP_VERSION"),
            source_ip: get("PUBLICIP_SOURCE_IP"),
            log_level: get("PUBLICIP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Tracing level from `PUBLICIP_LOG_LEVEL`
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "PUBLICIP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            provider_url: self.provider_url.clone(),
            timeout: self.timeout.clone(),
            rate_limit_rate: self.rate_limit_rate.clone(),
            rate_limit_burst: self.rate_limit_burst,
        }
    }

    /// The lookup request described by the environment
    ///
    /// A bad `PUBLICIP_IP_VERSION` is a lookup input error, not a
    /// configuration error.
    fn lookup_request(&self) -> publicip_core::Result<LookupRequest> {
        let mut request = LookupRequest::new();

        if let Some(version) = &self.ip_version {
            request = request.with_ip_version(version.trim().parse::<IpVersion>()?);
        }
        if let Some(source_ip) = &self.source_ip {
            request = request.with_source_ip(source_ip.trim());
        }

        Ok(request)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return PublicIpExitCode::ConfigError.into();
        }
    };

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return PublicIpExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PublicIpExitCode::ConfigError.into();
    }

    info!(
        "Starting {} (version={}, commit={}, date={})",
        TOOL_NAME, VERSION, COMMIT, BUILD_DATE
    );

    let provider = match ProviderConfig::from_settings(&config.provider_settings(), TOOL_NAME, VERSION)
    {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("Unable to configure the IP information provider: {}", e);
            return PublicIpExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PublicIpExitCode::ConfigError.into();
        }
    };

    let outcome = rt
        .block_on(run_lookup(&config, provider))
        .and_then(|result| print_result(&result));

    match outcome {
        Ok(()) => PublicIpExitCode::Success.into(),
        Err(e) => {
            error!("Lookup failed: {:#}", e);
            PublicIpExitCode::LookupError.into()
        }
    }
}

/// Run one lookup against the configured provider
async fn run_lookup(config: &Config, provider: Arc<ProviderConfig>) -> Result<LookupResult> {
    let request = config.lookup_request()?;
    let lookup = publicip_http::lookup(provider);

    let result = lookup
        .run(&request)
        .await
        .with_context(|| format!("Looking up the public IP via {}", lookup.config().base_url()))?;

    Ok(result)
}

fn print_result(result: &LookupResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Unable to encode the lookup result")?;
    println!("{}", json);
    Ok(())
}
