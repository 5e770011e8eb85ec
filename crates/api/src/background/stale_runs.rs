//! Periodic sweep failing runs stranded on silent nodes.
//!
//! A node that crashes mid-run never reports completion, leaving its run
//! `running` and its concurrency slot occupied forever. This task fails any
//! running run whose node has been silent longer than the configured timeout,
//! going through the normal completion path so the slot and request are
//! released atomically. Disabled when the timeout is `0`.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use seezee_db::repositories::RunRepo;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Error message recorded on runs failed by the sweep.
const STALE_RUN_ERROR: &str = "Run failed: node stopped heartbeating";

/// Run the stale-run sweep loop.
///
/// Fails runs on nodes silent longer than `timeout_secs`. Runs until
/// `cancel` is triggered. Callers should not spawn this when
/// `timeout_secs == 0`; if they do, the task exits immediately.
pub async fn run(pool: PgPool, timeout_secs: i64, cancel: CancellationToken) {
    if timeout_secs <= 0 {
        tracing::info!("Stale-run sweep disabled (timeout is 0)");
        return;
    }

    tracing::info!(
        timeout_secs,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Stale-run sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stale-run sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match RunRepo::fail_stale(&pool, timeout_secs, STALE_RUN_ERROR).await {
                    Ok(failed) => {
                        if !failed.is_empty() {
                            tracing::warn!(
                                count = failed.len(),
                                run_ids = ?failed,
                                "Stale-run sweep: failed stranded runs"
                            );
                        } else {
                            tracing::debug!("Stale-run sweep: nothing to fail");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Stale-run sweep: sweep failed");
                    }
                }
            }
        }
    }
}
