use log::{error, info, warn};
use portread::configuration::config::CaptureConfig;
use portread::controller::controller_handler::Controller;
use portread::controller::exit_status::ExitStatus;
use portread::error_handling::types::ConfigError;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default level; all records go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = match CaptureConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            match &e {
                ConfigError::Usage(usage) => {
                    let _ = usage.print();
                }
                other => error!("Unable to build the capture configuration: {}", other),
            }
            return ExitStatus::from_config_error(&e).report();
        }
    };

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping capture");
                watcher.cancel();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    });

    let controller = Controller::new(config);
    let result = controller.run(cancel).await;
    match &result {
        Ok(summary) => info!(
            "Captured {} lines ({} bytes) over {} sessions",
            summary.lines_emitted, summary.bytes_captured, summary.sessions
        ),
        Err(e) => error!("{}", e),
    }
    ExitStatus::from_run(&result).report()
}
