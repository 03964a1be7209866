use std::io::Write;

use chrono::Utc;
use log::trace;

use crate::configuration::types::Encoding;
use crate::error_handling::types::CaptureError;

use super::codec;
use super::types::{Payload, TraceLine};

/// Writes one trace line for `payload` to `sink` and flushes it.
///
/// The timestamp is taken here, at emission time, not when the bytes were
/// read.
pub fn emit<W: Write>(
    delimiter: &str,
    payload: &Payload,
    encoding: Encoding,
    sink: &mut W,
) -> Result<TraceLine, CaptureError> {
    let line = TraceLine {
        delimiter: delimiter.to_string(),
        timestamp_millis: Utc::now().timestamp_millis(),
        encoded: codec::encode(payload.as_bytes(), encoding),
    };
    writeln!(sink, "{}", line).map_err(CaptureError::SinkError)?;
    sink.flush().map_err(CaptureError::SinkError)?;
    Ok(line)
}

/// Line sink bound to a delimiter and an encoding for the duration of a run.
pub struct TraceEmitter<W: Write> {
    delimiter: String,
    encoding: Encoding,
    sink: W,
}

impl<W: Write> TraceEmitter<W> {
    pub fn new(delimiter: impl Into<String>, encoding: Encoding, sink: W) -> Self {
        Self {
            delimiter: delimiter.into(),
            encoding,
            sink,
        }
    }

    pub fn emit(&mut self, payload: &Payload) -> Result<TraceLine, CaptureError> {
        let line = emit(&self.delimiter, payload, self.encoding, &mut self.sink)?;
        let preview = &payload.as_bytes()[..std::cmp::min(payload.len(), 64)];
        trace!(
            "emitted {} bytes: {}{}",
            payload.len(),
            String::from_utf8_lossy(preview),
            if payload.len() > 64 { " ..." } else { "" }
        );
        Ok(line)
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
