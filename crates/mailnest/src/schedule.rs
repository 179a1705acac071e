//! Repeated organize runs.

use std::future::Future;
use std::time::Duration;

use mailnest_core::RunOutcome;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, warn};

/// A receiver that turns true on the first Ctrl-C.
pub fn ctrl_c_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested, no new run will start");
            let _ = tx.send(true);
        }
    });
    rx
}

/// Starts a run every `every`, measured from the previous start, until
/// `stop` turns true. A stop never interrupts a run in progress.
///
/// Returns the number of runs started.
pub async fn watch<F, Fut>(every: Duration, mut stop: watch::Receiver<bool>, mut run: F) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = mailnest_core::Result<RunOutcome>>,
{
    let mut runs = 0;
    loop {
        if *stop.borrow() {
            break;
        }
        let started = Instant::now();
        runs += 1;
        info!(run = runs, "scheduled run starting");
        match run().await {
            Ok(outcome) => info!(
                moved = outcome.moved,
                duplicates = outcome.duplicates,
                "scheduled run finished"
            ),
            Err(e) => warn!(?e, "scheduled run failed"),
        }

        let next = started + every;
        let wait = next.saturating_duration_since(Instant::now());
        if let Ok(delta) = chrono::TimeDelta::from_std(wait) {
            let now = chrono::Local::now();
            println!(
                "[{}] ⏰ Next run at {}",
                now.format("%H:%M:%S"),
                (now + delta).format("%H:%M:%S")
            );
        }
        tokio::select! {
            () = tokio::time::sleep_until(next) => {}
            stopped = stop_requested(&mut stop) => {
                if stopped {
                    break;
                }
                // Sender gone: nobody can stop us any more, keep the schedule.
                tokio::time::sleep_until(next).await;
            }
        }
    }
    info!(runs, "scheduler stopped");
    runs
}

/// True once a stop is requested; false if the sender is gone.
async fn stop_requested(stop: &mut watch::Receiver<bool>) -> bool {
    stop.wait_for(|stopped| *stopped).await.is_ok()
}
