pub mod types;

pub use types::{CaptureError, ConfigError, ControllerError};
