use super::cli::{Cli, SessionOptions, TransportCommand};
use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Delimiter the HTTP reader prints in front of every line unless told otherwise.
pub const HTTP_DEFAULT_DELIMITER: &str = "DATADATADATA";

const TCP_TIMEOUT: Duration = Duration::from_millis(500);
const HTTP_TIMEOUT: Duration = Duration::from_millis(100);
const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Complete, immutable configuration of one capture run.
///
/// Built once at startup from the command line, the optional settings file
/// and the defaults of the selected transport, then handed to the
/// [`Controller`](crate::controller::Controller).
///
/// # Fields Overview
///
/// - `endpoint`: what to attach to (TCP peer, local UDP port or HTTP URL)
/// - `buffer_size`: capacity of the read buffer, fixed for the whole run
/// - `encoding`: hex or ASCII rendering of captured bytes
/// - `delimiter`: printed in front of every trace line
/// - `connect_timeout` / `read_timeout`: bounds on session setup and on each read
/// - `reconnect_delay`: fixed pause between acquisition attempts in retry mode
/// - `policy`: fail-fast or retry-forever
/// - `output`: trace file to append to, standard output when `None`
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub endpoint: Endpoint,
    pub buffer_size: NonZeroUsize,
    pub encoding: Encoding,
    pub delimiter: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub reconnect_delay: Duration,
    pub policy: RetryPolicy,
    pub output: Option<PathBuf>,
}

/// Session defaults read from a TOML settings file.
///
/// ```toml
/// policy = "retry"
/// connect_timeout_ms = 500
/// read_timeout_ms = 500
/// reconnect_delay_ms = 2000
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureSettings {
    pub policy: Option<RetryPolicy>,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub reconnect_delay_ms: Option<u64>,
}

impl CaptureSettings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let settings: CaptureSettings =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Command-line values win over the ones read from the file.
    fn overridden_by(self, options: &SessionOptions) -> Self {
        Self {
            policy: options.policy.or(self.policy),
            connect_timeout_ms: options.connect_timeout_ms.or(self.connect_timeout_ms),
            read_timeout_ms: options.read_timeout_ms.or(self.read_timeout_ms),
            reconnect_delay_ms: options.reconnect_delay_ms.or(self.reconnect_delay_ms),
        }
    }
}

impl CaptureConfig {
    /// Parses the process arguments.
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::try_from_iter(std::env::args_os())
    }

    /// Parses an explicit argument list; the first item is the program name.
    ///
    /// # Errors
    /// - [`ConfigError::Usage`] for malformed invocations (unknown encoding,
    ///   missing or unparsable positional arguments, `--help`)
    /// - [`ConfigError::IoError`] / [`ConfigError::TomlError`] when the
    ///   settings file cannot be read
    /// - [`ConfigError::InvalidUrl`] / [`ConfigError::NotInRange`] for values
    ///   that parse but cannot be used
    pub fn try_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        Self::from_cli(cli)
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let settings = match cli.options.settings.as_deref() {
            Some(path) => CaptureSettings::from_file(path)?,
            None => CaptureSettings::default(),
        }
        .overridden_by(&cli.options);

        let (endpoint, buffer_size, encoding, delimiter) = match cli.transport {
            TransportCommand::Tcp {
                address,
                port,
                buffer_size,
                encoding,
                delimiter,
            } => (
                Endpoint::Tcp { address, port },
                buffer_size,
                encoding,
                delimiter.unwrap_or_default(),
            ),
            TransportCommand::Udp {
                port,
                buffer_size,
                encoding,
                delimiter,
            } => (
                Endpoint::Udp { port },
                buffer_size,
                encoding,
                delimiter.unwrap_or_default(),
            ),
            TransportCommand::Http {
                url,
                buffer_size,
                delimiter,
            } => {
                validate_url(&url)?;
                (
                    Endpoint::Http { url },
                    buffer_size,
                    Encoding::Hex,
                    delimiter.unwrap_or_else(|| HTTP_DEFAULT_DELIMITER.to_string()),
                )
            }
        };

        let (default_timeout, default_policy) = match endpoint {
            Endpoint::Tcp { .. } => (TCP_TIMEOUT, RetryPolicy::FailFast),
            // Datagram receives block until data arrives; the timeouts are unused.
            Endpoint::Udp { .. } => (TCP_TIMEOUT, RetryPolicy::FailFast),
            Endpoint::Http { .. } => (HTTP_TIMEOUT, RetryPolicy::Retry),
        };

        let config = CaptureConfig {
            endpoint,
            buffer_size,
            encoding,
            delimiter,
            connect_timeout: positive_millis(
                "connect_timeout_ms",
                settings.connect_timeout_ms,
                default_timeout,
            )?,
            read_timeout: positive_millis("read_timeout_ms", settings.read_timeout_ms, default_timeout)?,
            reconnect_delay: settings
                .reconnect_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(RECONNECT_DELAY),
            policy: settings.policy.unwrap_or(default_policy),
            output: cli.options.output,
        };

        info!(
            "Capturing {} with buffer={} encoding={:?} policy={}",
            config.endpoint, config.buffer_size, config.encoding, config.policy
        );
        Ok(config)
    }
}

fn positive_millis(
    name: &str,
    value: Option<u64>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::NotInRange(format!("{} must be > 0", name))),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", url, e)))?;
    if parsed.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: only plain http:// endpoints are supported",
            url
        )));
    }
    Ok(())
}
