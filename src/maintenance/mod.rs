use std::time::Duration;

use tokio::{sync::broadcast::error::RecvError, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::auth::monitor::{SessionMonitor, SweepReport};

/// Drive the session monitor: react to storage writes and sweep on every tick.
pub fn spawn(monitor: SessionMonitor, poll: Duration) {
    tokio::spawn(async move {
        let mut changes = monitor.storage_changes();
        let mut ticker = tokio::time::interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => log_sweep(&monitor.sweep()),
                change = changes.recv() => match change {
                    Ok(change) => {
                        if let Some(event) = monitor.handle_change(&change) {
                            debug!(token = %event.token, kind = ?event.kind, "session changed");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "storage change feed lagged, sweeping all sessions");
                        log_sweep(&monitor.sweep());
                    }
                    Err(RecvError::Closed) => {
                        warn!("storage change feed closed, session monitor stopping");
                        break;
                    }
                },
            }
        }
    });
}

fn log_sweep(report: &SweepReport) {
    if report.expired > 0 || report.signed_out > 0 {
        info!(
            checked = report.checked,
            expired = report.expired,
            signed_out = report.signed_out,
            "session sweep completed"
        );
    }
}
