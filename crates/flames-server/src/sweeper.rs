use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use flames_db::NoteStore;

/// Background task that purges expired notes.
///
/// Reads already hide expired notes, so this only reclaims space. A failed
/// pass is logged and the next tick tries again.
pub async fn run_sweep_loop(store: NoteStore, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // The boot-time pass already ran
    interval.tick().await;

    loop {
        interval.tick().await;
        run_once(&store, Utc::now()).await;
    }
}

/// One sweep pass. Never fails; returns how many notes were removed.
pub async fn run_once(store: &NoteStore, now: DateTime<Utc>) -> u64 {
    let store = store.clone();
    match tokio::task::spawn_blocking(move || store.sweep(now)).await {
        Ok(Ok(count)) => {
            if count > 0 {
                info!("Sweep: purged {} expired notes", count);
            }
            count
        }
        Ok(Err(e)) => {
            warn!("Sweep error: {}", e);
            0
        }
        Err(e) => {
            warn!("Sweep task failed: {}", e);
            0
        }
    }
}
