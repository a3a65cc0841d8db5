//! Background job: expire old notifications.
//!
//! Runs hourly and deletes every notification past the configured TTL.
//! The read queries carry the same TTL filter, so an expired row is never
//! observable between sweeps.

use std::time::Duration;

use tokio::time;

use crate::store::postgres::PgStore;

/// Spawn the background sweep task. Call this once at startup.
pub fn spawn(store: PgStore, ttl_days: i64) {
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match store.purge_expired_notifications(ttl_days).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(rows = n, "purged expired notifications"),
                Err(e) => tracing::error!("notification sweep failed: {}", e),
            }
        }
    });
}
