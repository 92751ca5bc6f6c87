use crate::notifiers::Notifier;
use crate::sources::{StockCheckResult, StockSource};
use crate::state::{LoopReport, Phase, RunState};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Drives the check → notify → wait cycle until cancelled.
///
/// The loop owns the stock source exclusively and releases it exactly once
/// when it stops, whatever the reason.
pub struct PollLoop {
    source: Box<dyn StockSource>,
    notifier: Notifier,
    interval: Duration,
    phase: Phase,
    run_state: RunState,
}

impl PollLoop {
    pub fn new(source: Box<dyn StockSource>, notifier: Notifier, interval: Duration) -> Self {
        Self {
            source,
            notifier,
            interval,
            phase: Phase::Idle,
            run_state: RunState::Running,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn run(mut self, shutdown: CancellationToken) -> LoopReport {
        info!(
            source = self.source.name(),
            channel = self.notifier.channel_name(),
            interval_secs = self.interval.as_secs(),
            "Starting stock watcher"
        );
        let mut report = LoopReport::default();

        while self.run_state == RunState::Running {
            if shutdown.is_cancelled() {
                break;
            }
            self.enter(Phase::Checking);
            let outcome = AssertUnwindSafe(self.source.check_stock())
                .catch_unwind()
                .await
                .map_err(panic_message);

            let result = match outcome {
                Ok(result) => result,
                Err(message) => {
                    error!(error = %message, "Stock check crashed, shutting down");
                    self.notifier
                        .notify_error(&format!("Watcher stopped after an unrecoverable error: {message}"))
                        .await;
                    report.fatal = Some(message);
                    break;
                }
            };
            report.cycles += 1;

            self.handle(&result, &mut report).await;

            self.enter(Phase::Waiting);
            if !wait(self.interval, &shutdown).await {
                break;
            }
        }

        self.stop().await;
        report.run_state = self.run_state;
        info!(
            cycles = report.cycles,
            available = report.available,
            errors = report.errors,
            "Stock watcher stopped"
        );
        report
    }

    async fn handle(&mut self, result: &StockCheckResult, report: &mut LoopReport) {
        if let Some(raw_error) = &result.raw_error {
            report.errors += 1;
            self.enter(Phase::Notifying);
            self.notifier
                .notify_error(&format!("Stock check failed: {raw_error}"))
                .await;
        } else if result.available {
            report.available += 1;
            info!(
                product = ?result.display_name,
                price = ?result.price,
                "Stock found! Sending notification"
            );
            self.enter(Phase::Notifying);
            self.notifier.notify_available(result).await;
        } else {
            info!(
                next_check_secs = self.interval.as_secs(),
                "No stock available, checking again later"
            );
        }
    }

    async fn stop(&mut self) {
        self.run_state = RunState::Stopping;
        self.source.close().await;
        self.enter(Phase::Stopped);
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "Phase transition");
        self.phase = phase;
    }
}

/// Sleep for `interval` unless cancelled first. Returns `false` on cancellation.
async fn wait(interval: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            info!("Cancellation received, stopping");
            false
        }
        _ = tokio::time::sleep(interval) => true,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
