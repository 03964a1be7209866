pub mod configuration;
pub use configuration::*;

pub mod controller;
pub use controller::*;

pub mod data_capture;

pub mod error_handling;

pub mod network;
