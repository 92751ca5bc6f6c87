use dotenvy::dotenv;
use gpu_stock_watcher::errors::startup_error::StartupError;
use gpu_stock_watcher::{app, config::AppConfig, signals, telemetry};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let config = match AppConfig::from_env().map_err(StartupError::from) {
        Ok(config) => config,
        Err(e) => {
            telemetry::init("info");
            error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(&config.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "gpu_stock_watcher starting");

    let shutdown = CancellationToken::new();
    let listener = signals::spawn_signal_listener(shutdown.clone());

    let outcome = app::run(config, shutdown.clone()).await;
    shutdown.cancel();
    let _ = listener.await;

    match outcome {
        Ok(report) if report.is_graceful() => {
            info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            error!(error = ?report.fatal, "Watcher stopped after a fatal error");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}
