use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    Usage(clap::Error),
    IoError(std::io::Error),
    TomlError(String),
    InvalidUrl(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Usage(e) => write!(f, "Invalid invocation: {}", e.kind()),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidUrl(e) => write!(f, "URL error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<clap::Error> for ConfigError {
    fn from(err: clap::Error) -> Self {
        ConfigError::Usage(err)
    }
}

/// Failures raised while acquiring an endpoint, reading from it or writing
/// trace lines.
///
/// Whether a failure ends the run or sends the capture loop back to
/// acquisition is decided by [`CaptureError::is_recoverable`] together with
/// the configured retry policy.
#[derive(Debug)]
pub enum CaptureError {
    /// Local datagram socket could not be bound.
    BindError(std::io::Error),
    /// Session could not be established (refused, timed out, DNS, HTTP status).
    ConnectError(String),
    /// No data arrived within the read deadline.
    ReadTimeout,
    /// Peer closed the stream.
    StreamClosed,
    StreamError(std::io::Error),
    /// Trace lines could not be written to the output sink.
    SinkError(std::io::Error),
    SetupFailed(String),
    /// `run` was called again after a fatal failure.
    AlreadyTerminated,
}

impl CaptureError {
    /// Recoverable failures lead to a reconnect when the loop runs in retry mode.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CaptureError::ConnectError(_)
                | CaptureError::ReadTimeout
                | CaptureError::StreamClosed
                | CaptureError::StreamError(_)
        )
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::BindError(e) => write!(f, "Socket bind error: {}", e),
            CaptureError::ConnectError(e) => write!(f, "Connection failed: {}", e),
            CaptureError::ReadTimeout => write!(f, "Read timed out without data"),
            CaptureError::StreamClosed => write!(f, "Stream closed by peer"),
            CaptureError::StreamError(e) => write!(f, "Stream read error: {}", e),
            CaptureError::SinkError(e) => write!(f, "Trace sink write error: {}", e),
            CaptureError::SetupFailed(e) => write!(f, "Capture setup failed: {}", e),
            CaptureError::AlreadyTerminated => write!(f, "Capture already terminated"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Top-level failure of one capture run, split by the phase that failed.
#[derive(Debug)]
pub enum ControllerError {
    /// Invocation, settings or sink could not be set up.
    Config(ConfigError),
    /// The transport client could not be built.
    Setup(String),
    /// The capture loop terminated.
    Capture(CaptureError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Config(e) => write!(f, "Configuration error: {}", e),
            ControllerError::Setup(e) => write!(f, "Setup error: {}", e),
            ControllerError::Capture(e) => write!(f, "Capture error: {}", e),
        }
    }
}

impl ControllerError {
    /// Failures that happened before any capture was attempted.
    pub fn is_setup(&self) -> bool {
        matches!(self, ControllerError::Config(_) | ControllerError::Setup(_))
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::Config(err)
    }
}

impl From<CaptureError> for ControllerError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::SetupFailed(reason) => ControllerError::Setup(reason),
            other => ControllerError::Capture(other),
        }
    }
}
