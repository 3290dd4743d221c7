use super::RefreshCoordinator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to the proactive refresh task. Stopping (or dropping) the handle
/// halts the timer; an in-flight refresh always runs to completion because
/// the shutdown signal only interrupts the idle wait between checks.
pub struct RefreshLoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshLoopHandle {
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Stop the timer and wait for the task to wind down.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}

/// Spawn the timer-driven refresh check: once immediately, then on every
/// tick of `check_interval`.
pub fn spawn_refresh_loop(
    coordinator: Arc<RefreshCoordinator>,
    check_interval: Duration,
) -> RefreshLoopHandle {
    let (tx, mut rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        run_check(&coordinator).await;
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() || *rx.borrow() {
                        break;
                    }
                }
                () = tokio::time::sleep(check_interval) => {
                    run_check(&coordinator).await;
                }
            }
        }
        debug!("proactive refresh loop stopped");
    });
    RefreshLoopHandle { shutdown: tx, task }
}

async fn run_check(coordinator: &RefreshCoordinator) {
    match coordinator.refresh_if_near_expiry().await {
        Ok(true) => debug!("proactive refresh completed"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "proactive refresh failed"),
    }
}
