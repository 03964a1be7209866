use std::io;
use std::time::Duration;

use futures_util::{StreamExt, TryStreamExt};
use log::debug;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::error_handling::types::CaptureError;

use super::connector::{Connector, StreamSource};

pub type HttpBody = Box<dyn AsyncRead + Unpin + Send>;
pub type HttpSource = StreamSource<HttpBody>;

/// Issues a GET request and exposes the response body as a byte stream.
///
/// Error statuses are not told apart from network failures: both surface as
/// [`CaptureError::ConnectError`] so the retry policy treats them alike.
pub struct HttpConnector {
    url: String,
    client: reqwest::Client,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl HttpConnector {
    pub fn new(
        url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, CaptureError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .no_proxy()
            .build()
            .map_err(|e| CaptureError::SetupFailed(format!("HTTP client: {}", e)))?;
        Ok(Self {
            url: url.into(),
            client,
            connect_timeout,
            read_timeout,
        })
    }
}

impl Connector for HttpConnector {
    type Source = HttpSource;

    async fn acquire(&mut self) -> Result<HttpSource, CaptureError> {
        let deadline = self.connect_timeout + self.read_timeout;
        let response = tokio::time::timeout(deadline, self.client.get(&self.url).send())
            .await
            .map_err(|_| {
                CaptureError::ConnectError(format!("{}: no response within {:?}", self.url, deadline))
            })?
            .and_then(|response| response.error_for_status())
            .map_err(|e| CaptureError::ConnectError(format!("{}: {}", self.url, e)))?;

        debug!(
            "{} answered {} ({:?})",
            self.url,
            response.status(),
            response.headers().get(reqwest::header::CONTENT_TYPE)
        );

        let body = response.bytes_stream().map_err(io::Error::other).boxed();
        let reader: HttpBody = Box::new(StreamReader::new(body));
        Ok(StreamSource::new(reader, self.read_timeout, self.url.clone()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
