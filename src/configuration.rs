pub mod cli;
pub mod config;
pub mod types;

pub use config::{CaptureConfig, CaptureSettings};
pub use types::{Encoding, Endpoint, RetryPolicy};
