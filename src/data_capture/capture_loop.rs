//! Read-and-emit engine shared by every transport.
//!
//! `CaptureLoop` drives one endpoint through an explicit state machine:
//!
//! ```text
//!              acquired               payload / no data
//! Acquiring ───────────▶ Reading ◀──────────────┐
//!    ▲  │                  │  └─────────────────┘
//!    │  │ failure          │ failure
//!    │  ▼                  ▼
//!    │ (retry + recoverable) ──▶ Reconnecting ──delay──▶ Acquiring
//!    │ (otherwise)           ──▶ Terminated
//! ```
//!
//! - A read that yields a payload is reduced, formatted and flushed to the
//!   sink before the next read starts.
//! - `None` from the reducer (no data before the deadline) is a silent
//!   continuation, except in fail-fast mode where the missed deadline ends
//!   the run.
//! - The reconnect delay is fixed; there is no backoff growth and no retry cap.
//! - The cancellation token is checked before every transition and raced
//!   against acquisition, reads and the reconnect delay. Cancelling moves the
//!   loop to `Stopped` and `run` returns the summary.
//!
//! The live source is owned by the loop only, and is dropped (closing the
//! socket or connection) on every path out of a session.

use std::io::Write;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::configuration::{CaptureConfig, RetryPolicy};
use crate::error_handling::types::CaptureError;
use crate::network::connector::{ByteSource, Connector};

use super::emitter::TraceEmitter;
use super::reducer::reduce;
use super::types::{RawChunk, ReadOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Acquiring,
    Reading,
    Reconnecting,
    /// A fatal failure ended the run.
    Terminated,
    /// Shutdown was requested through the cancellation token.
    Stopped,
}

/// Counters describing one run of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Acquisition attempts, successful or not.
    pub attempts: u32,
    /// Reconnect delays served before trying again.
    pub retries: u32,
    /// Sessions that reached `Reading`.
    pub sessions: u32,
    pub lines_emitted: u64,
    pub bytes_captured: u64,
    pub started_at: DateTime<Utc>,
}

impl CaptureSummary {
    fn new() -> Self {
        Self {
            attempts: 0,
            retries: 0,
            sessions: 0,
            lines_emitted: 0,
            bytes_captured: 0,
            started_at: Utc::now(),
        }
    }
}

pub struct CaptureLoop<C: Connector, W: Write> {
    connector: C,
    emitter: TraceEmitter<W>,
    buffer_size: NonZeroUsize,
    policy: RetryPolicy,
    reconnect_delay: Duration,
    cancel: CancellationToken,
    state: CaptureState,
    /// Correlates the log records of one session attempt.
    session_id: Uuid,
    summary: CaptureSummary,
}

impl<C: Connector, W: Write> CaptureLoop<C, W> {
    pub fn new(connector: C, config: &CaptureConfig, sink: W, cancel: CancellationToken) -> Self {
        Self {
            connector,
            emitter: TraceEmitter::new(config.delimiter.clone(), config.encoding, sink),
            buffer_size: config.buffer_size,
            policy: config.policy,
            reconnect_delay: config.reconnect_delay,
            cancel,
            state: CaptureState::Acquiring,
            session_id: Uuid::nil(),
            summary: CaptureSummary::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn summary(&self) -> &CaptureSummary {
        &self.summary
    }

    /// Runs until cancelled or until a failure the policy does not absorb.
    ///
    /// # Returns
    /// - `Ok(summary)` after a requested shutdown
    /// - `Err(e)` with the failure that moved the loop to `Terminated`
    pub async fn run(&mut self) -> Result<CaptureSummary, CaptureError> {
        info!(
            "Starting capture of {} (policy={}, buffer={})",
            self.connector.describe(),
            self.policy,
            self.buffer_size
        );
        let mut buffer = vec![0u8; self.buffer_size.get()];
        let mut source: Option<C::Source> = None;

        let result = loop {
            if self.cancel.is_cancelled() && self.state != CaptureState::Terminated {
                self.transition(CaptureState::Stopped);
            }

            match self.state {
                CaptureState::Acquiring => {
                    self.summary.attempts += 1;
                    self.session_id = Uuid::new_v4();
                    debug!(
                        "[{}] acquiring {} (attempt {})",
                        self.session_id,
                        self.connector.describe(),
                        self.summary.attempts
                    );

                    let acquired = tokio::select! {
                        _ = self.cancel.cancelled() => continue,
                        acquired = self.connector.acquire() => acquired,
                    };
                    match acquired {
                        Ok(live) => {
                            self.summary.sessions += 1;
                            info!("[{}] connected to {}", self.session_id, self.connector.describe());
                            source = Some(live);
                            self.transition(CaptureState::Reading);
                        }
                        Err(e) => {
                            if let Err(e) = self.on_failure(e) {
                                break Err(e);
                            }
                        }
                    }
                }
                CaptureState::Reading => {
                    let Some(live) = source.as_mut() else {
                        self.transition(CaptureState::Acquiring);
                        continue;
                    };

                    let outcome = tokio::select! {
                        _ = self.cancel.cancelled() => continue,
                        outcome = live.read_chunk(&mut buffer) => outcome,
                    };
                    let step = match outcome {
                        Ok(ReadOutcome::TimedOut) if self.policy == RetryPolicy::FailFast => {
                            Err(CaptureError::ReadTimeout)
                        }
                        Ok(outcome) => self.handle_chunk(RawChunk::from_outcome(&buffer, outcome)),
                        Err(e) => Err(e),
                    };
                    if let Err(e) = step {
                        source = None;
                        debug!("[{}] connection closed", self.session_id);
                        if let Err(e) = self.on_failure(e) {
                            break Err(e);
                        }
                    }
                }
                CaptureState::Reconnecting => {
                    tokio::select! {
                        _ = self.cancel.cancelled() => continue,
                        _ = tokio::time::sleep(self.reconnect_delay) => {}
                    }
                    self.summary.retries += 1;
                    self.transition(CaptureState::Acquiring);
                }
                CaptureState::Stopped => break Ok(self.summary.clone()),
                CaptureState::Terminated => break Err(CaptureError::AlreadyTerminated),
            }
        };

        drop(source);
        self.finalize();
        result
    }

    fn handle_chunk(&mut self, chunk: RawChunk<'_>) -> Result<(), CaptureError> {
        match reduce(chunk) {
            Some(payload) => {
                self.emitter.emit(&payload)?;
                self.summary.lines_emitted += 1;
                self.summary.bytes_captured += payload.len() as u64;
            }
            None => trace!("[{}] no data this iteration", self.session_id),
        }
        Ok(())
    }

    /// Decides between reconnecting and terminating.
    fn on_failure(&mut self, err: CaptureError) -> Result<(), CaptureError> {
        if self.policy == RetryPolicy::Retry && err.is_recoverable() {
            warn!(
                "[{}] {}; retrying in {:?}",
                self.session_id, err, self.reconnect_delay
            );
            self.transition(CaptureState::Reconnecting);
            Ok(())
        } else {
            error!("[{}] {}", self.session_id, err);
            self.transition(CaptureState::Terminated);
            Err(err)
        }
    }

    fn transition(&mut self, next: CaptureState) {
        if self.state != next {
            debug!("[{}] {:?} -> {:?}", self.session_id, self.state, next);
            self.state = next;
        }
    }

    fn finalize(&self) {
        let duration = Utc::now() - self.summary.started_at;
        info!(
            "Capture finished in state {:?}: attempts={}, retries={}, sessions={}, lines={}, bytes={}, duration={:?}",
            self.state,
            self.summary.attempts,
            self.summary.retries,
            self.summary.sessions,
            self.summary.lines_emitted,
            self.summary.bytes_captured,
            duration
        );
    }
}
