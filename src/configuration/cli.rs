use super::types::{Encoding, RetryPolicy};
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Command line of the `portread` binary.
///
/// One subcommand per transport, each taking the positional arguments of the
/// corresponding reader. Session tuning options are global so they can be
/// given before or after the subcommand.
#[derive(Parser, Debug)]
#[command(name = "portread")]
#[command(version)]
#[command(about = "Capture raw bytes from a TCP, UDP or HTTP endpoint as timestamped trace lines")]
pub struct Cli {
    #[command(flatten)]
    pub options: SessionOptions,

    #[command(subcommand)]
    pub transport: TransportCommand,
}

#[derive(Subcommand, Debug)]
pub enum TransportCommand {
    /// Connect to a TCP peer and trace everything it sends
    Tcp {
        address: String,
        port: u16,
        buffer_size: NonZeroUsize,
        #[arg(value_enum, ignore_case = true)]
        encoding: Encoding,
        /// Printed in front of every trace line
        #[arg(allow_hyphen_values = true)]
        delimiter: Option<String>,
    },
    /// Bind a local UDP port and trace every datagram
    Udp {
        port: u16,
        buffer_size: NonZeroUsize,
        #[arg(value_enum, ignore_case = true)]
        encoding: Encoding,
        #[arg(allow_hyphen_values = true)]
        delimiter: Option<String>,
    },
    /// Stream an HTTP response body as hex trace lines
    Http {
        url: String,
        buffer_size: NonZeroUsize,
        /// Printed in front of every trace line (default: DATADATADATA)
        #[arg(long, allow_hyphen_values = true)]
        delimiter: Option<String>,
    },
}

/// Options overriding the settings file and the per-transport defaults.
#[derive(Args, Debug, Default)]
pub struct SessionOptions {
    /// TOML file with default session settings
    #[arg(long, global = true, env = "PORTREAD_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Behaviour on connection failure
    #[arg(long, global = true, value_enum)]
    pub policy: Option<RetryPolicy>,

    #[arg(long, global = true)]
    pub connect_timeout_ms: Option<u64>,

    #[arg(long, global = true)]
    pub read_timeout_ms: Option<u64>,

    /// Fixed delay between reconnection attempts
    #[arg(long, global = true)]
    pub reconnect_delay_ms: Option<u64>,

    /// Append trace lines to this file instead of standard output
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_tcp_positional_arguments() {
        let cli = Cli::try_parse_from([
            "portread", "tcp", "10.0.0.5", "4001", "256", "hex", "TCP>",
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        match cli.transport {
            TransportCommand::Tcp {
                address,
                port,
                buffer_size,
                encoding,
                delimiter,
            } => {
                assert_eq!(address, "10.0.0.5");
                assert_eq!(port, 4001);
                assert_eq!(buffer_size.get(), 256);
                assert_eq!(encoding, Encoding::Hex);
                assert_eq!(delimiter.as_deref(), Some("TCP>"));
            }
            other => panic!("unexpected transport {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_encoding_is_case_insensitive() {
        let cli = Cli::try_parse_from(["portread", "udp", "5000", "64", "ASCII"]).unwrap();
        match cli.transport {
            TransportCommand::Udp {
                encoding, delimiter, ..
            } => {
                assert_eq!(encoding, Encoding::Ascii);
                assert!(delimiter.is_none());
            }
            other => panic!("unexpected transport {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_unknown_encoding_is_rejected() {
        let err = Cli::try_parse_from(["portread", "tcp", "localhost", "80", "64", "base64"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    #[serial]
    fn test_zero_buffer_size_is_rejected() {
        let err = Cli::try_parse_from(["portread", "udp", "5000", "0", "hex"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    #[serial]
    fn test_missing_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["portread", "tcp", "localhost", "80"]).is_err());
        assert!(Cli::try_parse_from(["portread", "http"]).is_err());
    }

    #[test]
    #[serial]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "portread",
            "http",
            "http://127.0.0.1:8000/feed",
            "1024",
            "--policy",
            "fail-fast",
            "--read-timeout-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(cli.options.policy, Some(RetryPolicy::FailFast));
        assert_eq!(cli.options.read_timeout_ms, Some(250));
        assert!(matches!(cli.transport, TransportCommand::Http { .. }));
    }
}
