//! Stale connection sweeper
//!
//! Evicts registry entries whose socket is gone without a clean disconnect,
//! or that have been silent past the idle timeout. Eviction does not fan out
//! presence; a released user is only marked offline in the store.

use buddylink_core::entities::PresenceStatus;
use buddylink_service::PresenceService;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::GatewayState;

pub fn spawn_sweeper(state: GatewayState) -> JoinHandle<()> {
    let period = state.config().presence.sweep_interval();

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep_once(&state).await;
        }
    })
}

/// One sweep pass; returns the number of evicted connections
pub async fn sweep_once(state: &GatewayState) -> usize {
    let outcome = state
        .registry()
        .sweep_stale(state.config().presence.idle_timeout());

    for user_id in &outcome.released {
        match PresenceService::new(state.service_context())
            .set_status(*user_id, PresenceStatus::Offline)
            .await
        {
            Ok(()) => tracing::info!(user_id = %user_id, "Stale session marked offline"),
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Failed to mark stale session offline"),
        }
    }

    outcome.evicted
}
