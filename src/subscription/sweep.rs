//! Daily expiry sweep.
//!
//! Runs once when started, then every day at the configured UTC hour until
//! shutdown is triggered.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};
use crate::lifecycle::ShutdownListener;
use crate::subscription::service::SubscriptionService;

pub struct ExpirySweeper {
    service: Arc<SubscriptionService>,
    hour_utc: u32,
}

impl ExpirySweeper {
    pub fn new(service: Arc<SubscriptionService>, hour_utc: u32) -> Self {
        Self { service, hour_utc }
    }

    pub async fn run(self, mut shutdown: ShutdownListener) {
        tracing::info!(hour_utc = self.hour_utc, "Subscription expiry sweeper starting");
        self.sweep_once().await;

        loop {
            let wait = until_next_run(Utc::now(), self.hour_utc);
            tracing::debug!(wait_secs = wait.as_secs(), "Next expiry sweep scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => self.sweep_once().await,
                _ = shutdown.recv() => {
                    tracing::info!("Expiry sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn sweep_once(&self) {
        match self.service.sweep_expired(Utc::now()).await {
            Ok(0) => tracing::debug!("No expired subscriptions"),
            Ok(count) => tracing::info!(count, "Expired subscriptions cleared"),
            Err(e) => tracing::error!(error = %e, "Expiry sweep failed"),
        }
    }
}

/// Time from `now` until the next `hour:00:00` UTC, strictly in the future.
pub fn until_next_run(now: DateTime<Utc>, hour_utc: u32) -> Duration {
    let at = NaiveTime::from_hms_opt(hour_utc.min(23), 0, 0).unwrap_or_default();
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(today)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, DefaultPlanConfig};
    use crate::lifecycle::Shutdown;
    use crate::subscription::{MemoryCache, MemoryStore, Role, User};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_run_sweeps_on_start_and_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let mut lapsed = User::new(3, "lapsed", Role::User);
        lapsed.subscription = true;
        lapsed.sub_buy_time = Some(Utc::now() - chrono::Duration::days(31));
        lapsed.sub_end_time = Some(Utc::now() - chrono::Duration::days(1));
        store.insert_user(lapsed, None);

        let mut current = User::new(4, "current", Role::User);
        current.subscription = true;
        current.sub_end_time = Some(Utc::now() + chrono::Duration::days(10));
        store.insert_user(current, None);

        let service = Arc::new(SubscriptionService::new(
            store.clone(),
            store.clone(),
            Arc::new(MemoryCache::new()),
            &CacheConfig::default(),
        ));
        service
            .ensure_default_subscription(&DefaultPlanConfig::default())
            .await
            .unwrap();

        let shutdown = Shutdown::new();
        let task = tokio::spawn(ExpirySweeper::new(service, 0).run(shutdown.subscribe()));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while store.user(3).unwrap().subscription {
            assert!(tokio::time::Instant::now() < deadline, "startup sweep did not run");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let lapsed = store.user(3).unwrap();
        assert_eq!(lapsed.sub_buy_time, None);
        assert_eq!(lapsed.sub_end_time, None);
        assert!(store.user(4).unwrap().subscription);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_until_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 23, 30, 0).unwrap();
        assert_eq!(until_next_run(now, 0), Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_exactly_on_the_hour_waits_a_day() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 0, 0, 0).unwrap();
        assert_eq!(until_next_run(now, 0), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 1, 0, 0).unwrap();
        assert_eq!(until_next_run(now, 3), Duration::from_secs(2 * 3600));
    }
}
