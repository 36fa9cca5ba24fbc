use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db;
use crate::models::token::FORGOT_PASSWORD;
use crate::state::SharedState;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Periodically purge expired reset tokens and closed throttle windows.
/// Stops when `shutdown` flips to true or its sender is dropped.
pub fn spawn_sweeper(
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        tracing::debug!("Token sweeper started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match sweep(&state).await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!("Purged {n} expired tokens"),
                        Err(e) => tracing::error!("Token sweep failed: {e}"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Token sweeper stopped");
    })
}

/// One sweep pass. Returns how many reset tokens were deleted; tokens of
/// other types have their own lifetimes and are left alone.
pub async fn sweep(state: &SharedState) -> Result<u64, sqlx::Error> {
    state.forgot_limiter.cleanup();

    let cutoff = Utc::now() - state.config.token_ttl();
    db::tokens::delete_created_before(&state.pool, FORGOT_PASSWORD, cutoff).await
}
