use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

/// Rendering applied to captured bytes before they are written out.
#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum)]
pub enum Encoding {
    Hex,
    Ascii,
}

/// What the capture loop does when a session fails.
#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Report the first failure and stop (debug reader).
    FailFast,
    /// Sleep the reconnect delay and acquire again, forever.
    Retry,
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryPolicy::FailFast => write!(f, "fail-fast"),
            RetryPolicy::Retry => write!(f, "retry"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Endpoint {
    Tcp { address: String, port: u16 },
    Udp { port: u16 },
    Http { url: String },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { address, port } => write!(f, "tcp://{}:{}", address, port),
            Endpoint::Udp { port } => write!(f, "udp://0.0.0.0:{}", port),
            Endpoint::Http { url } => write!(f, "{}", url),
        }
    }
}
