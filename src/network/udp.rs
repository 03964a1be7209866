use std::net::{Ipv4Addr, SocketAddr};

use log::{debug, trace};
use tokio::net::UdpSocket;

use crate::data_capture::types::ReadOutcome;
use crate::error_handling::types::CaptureError;

use super::connector::{ByteSource, Connector};

/// Binds a datagram socket on a local port. There is no connection to
/// establish, so acquisition either succeeds at once or fails for good.
#[derive(Debug, Clone)]
pub struct UdpConnector {
    port: u16,
}

impl UdpConnector {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Connector for UdpConnector {
    type Source = UdpSource;

    async fn acquire(&mut self) -> Result<UdpSource, CaptureError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, self.port))
            .await
            .map_err(CaptureError::BindError)?;
        debug!("Bound datagram socket on {:?}", socket.local_addr().ok());
        Ok(UdpSource { socket })
    }

    fn describe(&self) -> String {
        format!("udp://0.0.0.0:{}", self.port)
    }
}

pub struct UdpSource {
    socket: UdpSocket,
}

impl UdpSource {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl ByteSource for UdpSource {
    /// Blocks until a datagram arrives. The whole buffer is offered to every
    /// receive, so a short datagram never caps the next one; an empty
    /// datagram is reported as `Filled(0)`.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, CaptureError> {
        let (n, from) = self
            .socket
            .recv_from(buf)
            .await
            .map_err(CaptureError::StreamError)?;
        trace!("datagram of {} bytes from {}", n, from);
        Ok(ReadOutcome::Filled(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn bound_source() -> (UdpSource, SocketAddr) {
        let mut connector = UdpConnector::new(0);
        let source = connector.acquire().await.expect("bind ephemeral port");
        let port = source.local_addr().unwrap().port();
        (source, SocketAddr::from((Ipv4Addr::LOCALHOST, port)))
    }

    #[tokio::test]
    async fn receives_datagrams_of_varying_length() {
        let (mut source, target) = bound_source().await;
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let mut buf = [0u8; 16];

        sender.send_to(b"a longer datagram", target).await.unwrap();
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), ReadOutcome::Filled(16));

        sender.send_to(b"ab", target).await.unwrap();
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), ReadOutcome::Filled(2));
        assert_eq!(&buf[..2], b"ab");

        sender.send_to(b"abcdefgh", target).await.unwrap();
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), ReadOutcome::Filled(8));
        assert_eq!(&buf[..8], b"abcdefgh");
    }

    #[tokio::test]
    async fn zero_length_datagram_is_valid_data() {
        let (mut source, target) = bound_source().await;
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let mut buf = [0xEEu8; 8];

        sender.send_to(&[], target).await.unwrap();

        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), ReadOutcome::Filled(0));
    }

    #[tokio::test]
    async fn port_in_use_is_a_fatal_bind_error() {
        let (held, _) = bound_source().await;
        let port = held.local_addr().unwrap().port();

        let err = UdpConnector::new(port).acquire().await.err().unwrap();

        assert!(matches!(err, CaptureError::BindError(_)));
        assert!(!err.is_recoverable());
    }
}
