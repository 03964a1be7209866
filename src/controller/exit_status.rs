//! Mapping from the outcome of an invocation to the process exit status and
//! the one-line diagnostic printed on stderr.

use std::process::ExitCode;

use crate::data_capture::CaptureSummary;
use crate::error_handling::types::{ConfigError, ControllerError};

pub const SETUP_FAILURE: &str = "Error.";
pub const CAPTURE_FAILURE: &str = "Connection not available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: u8,
    /// Printed on stderr before exiting.
    pub diagnostic: Option<&'static str>,
}

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus {
        code: 0,
        diagnostic: None,
    };

    fn failure(diagnostic: Option<&'static str>) -> Self {
        Self {
            code: 1,
            diagnostic,
        }
    }

    /// Configuration never got built. Usage errors carry their own clap
    /// message, and `--help`/`--version` count as success.
    pub fn from_config_error(err: &ConfigError) -> Self {
        match err {
            ConfigError::Usage(usage) if !usage.use_stderr() => Self::SUCCESS,
            ConfigError::Usage(_) => Self::failure(None),
            _ => Self::failure(Some(SETUP_FAILURE)),
        }
    }

    pub fn from_run(result: &Result<CaptureSummary, ControllerError>) -> Self {
        match result {
            Ok(_) => Self::SUCCESS,
            Err(e) if e.is_setup() => Self::failure(Some(SETUP_FAILURE)),
            Err(_) => Self::failure(Some(CAPTURE_FAILURE)),
        }
    }

    pub fn report(self) -> ExitCode {
        if let Some(diagnostic) = self.diagnostic {
            eprintln!("{}", diagnostic);
        }
        ExitCode::from(self.code)
    }
}
