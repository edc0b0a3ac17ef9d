use std::time::Duration;

use attendance_app::AppState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Runs reconciliation immediately, then every `every`, until `shutdown`
/// flips to true or its sender is dropped.
pub fn spawn(
    state: AppState,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = every.as_secs(), "reconciliation scheduler started");
        loop {
            tokio::select! {
                _ = ticker.tick() => run_once(&state).await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("reconciliation scheduler stopped");
    })
}

/// One pass on the blocking pool. Failures are logged and the next tick retries.
pub async fn run_once(state: &AppState) {
    let state = state.clone();
    match tokio::task::spawn_blocking(move || state.services.reconcile.run()).await {
        Ok(Ok(report)) if report.closed.is_empty() && report.failed == 0 => {
            debug!(scanned = report.scanned, "reconciliation found nothing to close");
        }
        Ok(Ok(report)) => {
            for day in &report.closed {
                info!(user_id = day.user_id, date = %day.date, "closed forgotten session");
            }
            if report.failed > 0 {
                warn!(
                    failed = report.failed,
                    scanned = report.scanned,
                    "reconciliation skipped some users"
                );
            }
        }
        Ok(Err(err)) => warn!(error = %err, "reconciliation failed"),
        Err(err) => error!(error = %err, "reconciliation task panicked"),
    }
}
