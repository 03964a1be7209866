use log::{error, info};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::configuration::{CaptureConfig, Endpoint};
use crate::data_capture::{CaptureLoop, CaptureSummary};
use crate::error_handling::types::*;
use crate::network::connector::Connector;
use crate::network::{HttpConnector, TcpConnector, UdpConnector};

pub type TraceSink = Box<dyn Write + Send>;

/// Wires one validated configuration to its transport and runs the capture.
pub struct Controller {
    pub config: CaptureConfig,
}

impl Controller {
    pub fn new(config: CaptureConfig) -> Self {
        info!(
            "Controller ready for {} ({:?} encoding, policy {})",
            config.endpoint, config.encoding, config.policy
        );
        Self { config }
    }

    /// Opens the trace sink: the given file in append mode, stdout otherwise.
    pub fn open_sink(output: Option<&Path>) -> Result<TraceSink, ConfigError> {
        match output {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                info!("Appending trace lines to {}", path.display());
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }

    /// Runs the capture until it is cancelled or fails.
    pub async fn run(&self, cancel: CancellationToken) -> Result<CaptureSummary, ControllerError> {
        let sink = Self::open_sink(self.config.output.as_deref())?;
        self.run_with_sink(sink, cancel).await
    }

    pub async fn run_with_sink<W: Write>(
        &self,
        sink: W,
        cancel: CancellationToken,
    ) -> Result<CaptureSummary, ControllerError> {
        match &self.config.endpoint {
            Endpoint::Tcp { address, port } => {
                let connector = TcpConnector::new(
                    address.clone(),
                    *port,
                    self.config.connect_timeout,
                    self.config.read_timeout,
                );
                self.capture(connector, sink, cancel).await
            }
            Endpoint::Udp { port } => {
                self.capture(UdpConnector::new(*port), sink, cancel).await
            }
            Endpoint::Http { url } => {
                let connector = HttpConnector::new(
                    url.clone(),
                    self.config.connect_timeout,
                    self.config.read_timeout,
                )?;
                self.capture(connector, sink, cancel).await
            }
        }
    }

    async fn capture<C: Connector, W: Write>(
        &self,
        connector: C,
        sink: W,
        cancel: CancellationToken,
    ) -> Result<CaptureSummary, ControllerError> {
        let mut capture = CaptureLoop::new(connector, &self.config, sink, cancel);
        capture.run().await.map_err(|e| {
            error!("Capture of {} ended: {}", self.config.endpoint, e);
            ControllerError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{Encoding, RetryPolicy};
    use std::num::NonZeroUsize;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, UdpSocket};

    fn config(endpoint: Endpoint, policy: RetryPolicy) -> CaptureConfig {
        CaptureConfig {
            endpoint,
            buffer_size: NonZeroUsize::new(16).unwrap(),
            encoding: Encoding::Ascii,
            delimiter: "#".to_string(),
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(500),
            reconnect_delay: Duration::from_millis(50),
            policy,
            output: None,
        }
    }

    #[test]
    fn test_open_sink_appends_to_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "existing\n").unwrap();

        let mut sink = Controller::open_sink(Some(file.path())).unwrap();
        sink.write_all(b"#1 new\n").unwrap();
        sink.flush().unwrap();
        drop(sink);

        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "existing\n#1 new\n");
    }

    #[test]
    fn test_open_sink_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.log");

        assert!(matches!(
            Controller::open_sink(Some(&path)),
            Err(ConfigError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_tcp_capture_writes_to_output_file() {
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();
            peer.write_all(b"ping").await.unwrap();
        });

        let output = NamedTempFile::new().unwrap();
        let mut settings = config(
            Endpoint::Tcp {
                address: "127.0.0.1".to_string(),
                port,
            },
            RetryPolicy::FailFast,
        );
        settings.output = Some(output.path().to_path_buf());

        let err = Controller::new(settings)
            .run(CancellationToken::new())
            .await
            .unwrap_err();

        assert!(!err.is_setup());
        let written = std::fs::read_to_string(output.path()).unwrap();
        let encoded: String = written
            .lines()
            .map(|line| line.split_once(' ').unwrap().1.to_string())
            .collect();
        assert!(written.starts_with('#'));
        assert_eq!(encoded, "ping");
    }

    #[tokio::test]
    async fn test_udp_bind_conflict_is_a_capture_failure() {
        let taken = UdpSocket::bind((std::net::Ipv4Addr::UNSPECIFIED, 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let controller = Controller::new(config(Endpoint::Udp { port }, RetryPolicy::Retry));

        let err = controller
            .run_with_sink(Vec::new(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ControllerError::Capture(CaptureError::BindError(_))));
        assert!(!err.is_setup());
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_summary() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let controller = Controller::new(config(
            Endpoint::Http {
                url: "http://127.0.0.1:9/feed".to_string(),
            },
            RetryPolicy::Retry,
        ));

        let summary = controller.run_with_sink(Vec::new(), cancel).await.unwrap();

        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.lines_emitted, 0);
    }
}
