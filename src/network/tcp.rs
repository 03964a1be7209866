use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;

use crate::error_handling::types::CaptureError;

use super::connector::{Connector, StreamSource};

pub type TcpSource = StreamSource<TcpStream>;

/// Opens a stream socket to a remote peer, bounding the connect by
/// `connect_timeout` and every later read by `read_timeout`.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    address: String,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpConnector {
    pub fn new(
        address: impl Into<String>,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            address: address.into(),
            port,
            connect_timeout,
            read_timeout,
        }
    }

    fn target(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Connector for TcpConnector {
    type Source = TcpSource;

    async fn acquire(&mut self) -> Result<TcpSource, CaptureError> {
        let target = self.target();
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&target))
            .await
            .map_err(|_| {
                CaptureError::ConnectError(format!(
                    "{}: no answer within {:?}",
                    target, self.connect_timeout
                ))
            })?
            .map_err(|e| CaptureError::ConnectError(format!("{}: {}", target, e)))?;

        // Trace data should reach us as soon as the peer writes it.
        if let Err(e) = stream.set_nodelay(true) {
            debug!("{}: could not disable Nagle: {}", target, e);
        }
        debug!("Connected to {} from {:?}", target, stream.local_addr().ok());
        Ok(StreamSource::new(stream, self.read_timeout, target))
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.target())
    }
}
