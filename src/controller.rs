pub mod controller_handler;
pub mod exit_status;

pub use controller_handler::Controller;
pub use exit_status::ExitStatus;
