//! Endpoint acquisition seam shared by the TCP, UDP and HTTP transports.
//!
//! A [`Connector`] knows how to open one transport-specific session and hands
//! back a [`ByteSource`], the live connection the capture loop reads from.
//! The source is exclusively owned by the loop for the duration of one
//! session attempt; dropping it closes the underlying socket or connection.

use std::future::Future;
use std::time::Duration;

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::data_capture::types::ReadOutcome;
use crate::error_handling::types::CaptureError;

pub trait Connector: Send {
    type Source: ByteSource + Send;

    /// Opens one session. Called again after every recoverable failure when
    /// the loop runs in retry mode.
    fn acquire(&mut self) -> impl Future<Output = Result<Self::Source, CaptureError>> + Send;

    /// Human readable target used in log records.
    fn describe(&self) -> String;
}

pub trait ByteSource {
    /// Reads whatever is available into the front of `buf`.
    ///
    /// # Errors
    /// - [`CaptureError::StreamClosed`] once the peer has closed the stream
    /// - [`CaptureError::StreamError`] for any other transport failure
    fn read_chunk(
        &mut self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<ReadOutcome, CaptureError>> + Send;
}

/// Byte stream whose every read is bounded by a deadline.
///
/// Backs both the TCP socket and the HTTP response body.
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
    read_timeout: Duration,
    peer: String,
}

impl<R> StreamSource<R> {
    pub fn new(reader: R, read_timeout: Duration, peer: impl Into<String>) -> Self {
        Self {
            reader,
            read_timeout,
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

impl<R: AsyncRead + Unpin + Send> ByteSource for StreamSource<R> {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, CaptureError> {
        match tokio::time::timeout(self.read_timeout, self.reader.read(buf)).await {
            Err(_) => {
                trace!("{}: no data within {:?}", self.peer, self.read_timeout);
                Ok(ReadOutcome::TimedOut)
            }
            Ok(Ok(0)) => Err(CaptureError::StreamClosed),
            Ok(Ok(n)) => Ok(ReadOutcome::Filled(n)),
            Ok(Err(e)) => Err(CaptureError::StreamError(e)),
        }
    }
}
