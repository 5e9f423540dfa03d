//! Subscription use cases.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::{CacheConfig, DefaultPlanConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::observability::metrics;
use crate::subscription::cache::KeyValueCache;
use crate::subscription::store::{SubscriptionStore, TokenDirectory};
use crate::subscription::types::{NewSubscription, Role, Subscription, SubscriptionPatch, User};

pub fn subscription_key(id: i64) -> String {
    format!("subscription:{id}")
}

pub fn user_key(token: &str) -> String {
    format!("user:{token}")
}

pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    directory: Arc<dyn TokenDirectory>,
    cache: Arc<dyn KeyValueCache>,
    cache_ttl: Duration,
}

impl SubscriptionService {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        directory: Arc<dyn TokenDirectory>,
        cache: Arc<dyn KeyValueCache>,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            store,
            directory,
            cache,
            cache_ttl: Duration::from_secs(cache_config.subscription_ttl_secs),
        }
    }

    /// Create the default plan unless a plan with its name already exists.
    ///
    /// Returns the plan if one was created.
    pub async fn ensure_default_subscription(
        &self,
        plan: &DefaultPlanConfig,
    ) -> ServiceResult<Option<Subscription>> {
        if self.store.find_subscription_by_name(&plan.name).await?.is_some() {
            return Ok(None);
        }

        let created = self
            .store
            .create_subscription(NewSubscription {
                name: plan.name.clone(),
                description: plan.description.clone(),
                price: plan.price.clone(),
                days_period: plan.days_period,
            })
            .await?;
        tracing::info!(id = created.id, name = %created.name, "Default subscription created");
        Ok(Some(created))
    }

    /// Look up a plan, reading through the cache.
    ///
    /// Cache errors are logged and bypassed; the store stays authoritative.
    pub async fn get_subscription(&self, id: i64) -> ServiceResult<Subscription> {
        let key = subscription_key(id);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str::<Subscription>(&cached) {
                Ok(plan) => {
                    metrics::record_cache_lookup(true);
                    return Ok(plan);
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache read failed"),
        }
        metrics::record_cache_lookup(false);

        let plan = self
            .store
            .find_subscription(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("subscription {id}")))?;

        match serde_json::to_string(&plan) {
            Ok(json) => {
                if let Err(e) = self.cache.set(&key, json, Some(self.cache_ttl)).await {
                    tracing::warn!(key = %key, error = %e, "Cache write failed");
                }
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to serialize subscription"),
        }

        Ok(plan)
    }

    pub async fn list_subscriptions(&self) -> ServiceResult<Vec<Subscription>> {
        self.store.list_subscriptions().await
    }

    /// Change a plan. Only admins may do this.
    pub async fn update_subscription(
        &self,
        id: i64,
        patch: &SubscriptionPatch,
        token: Option<&str>,
    ) -> ServiceResult<Subscription> {
        let caller = self.authenticate(token).await?;
        if caller.role != Role::Admin {
            tracing::warn!(user_id = caller.id, subscription_id = id, "Non-admin tried to update subscription");
            return Err(ServiceError::Forbidden);
        }

        let updated = self
            .store
            .update_subscription(id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("subscription {id}")))?;

        self.invalidate(&subscription_key(id)).await;
        tracing::info!(subscription_id = id, admin_id = caller.id, "Subscription updated");
        Ok(updated)
    }

    /// Activate plan `id` for the token's owner, starting at `now`.
    pub async fn purchase_subscription(
        &self,
        id: i64,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> ServiceResult<User> {
        let mut user = self.authenticate(token).await?;
        let plan = self
            .store
            .find_subscription(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("subscription {id}")))?;

        user.subscription = true;
        user.sub_buy_time = Some(now);
        user.sub_end_time = Some(now + chrono::Duration::days(i64::from(plan.days_period)));

        if let Some(token) = token {
            self.invalidate(&user_key(token)).await;
        }
        let saved = self.store.save_user(user).await?;

        tracing::info!(
            user_id = saved.id,
            subscription_id = id,
            ends = ?saved.sub_end_time,
            "Subscription purchased"
        );
        Ok(saved)
    }

    /// Clear every subscription whose end time is before `now`.
    ///
    /// Returns how many users were affected.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> ServiceResult<usize> {
        let expired = self.store.users_with_expired_subscription(now).await?;
        let count = expired.len();

        for mut user in expired {
            user.clear_subscription();
            let user = self.store.save_user(user).await?;
            tracing::info!(user_id = user.id, user = %user.name, "Subscription expired and was disabled");
        }

        metrics::record_subscriptions_expired(count);
        Ok(count)
    }

    async fn authenticate(&self, token: Option<&str>) -> ServiceResult<User> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Unauthorized("token not provided".into()))?;
        self.directory
            .user_for_token(token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user".into()))
    }

    async fn invalidate(&self, key: &str) {
        if let Err(e) = self.cache.del(key).await {
            tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::cache::MemoryCache;
    use crate::subscription::store::MemoryStore;
    use chrono::TimeZone;

    struct Fixture {
        store: Arc<MemoryStore>,
        cache: Arc<MemoryCache>,
        service: SubscriptionService,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        store.insert_user(User::new(1, "admin", Role::Admin), Some("admin-token"));
        store.insert_user(User::new(2, "reader", Role::User), Some("reader-token"));

        let service = SubscriptionService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
            &CacheConfig::default(),
        );
        service
            .ensure_default_subscription(&DefaultPlanConfig::default())
            .await
            .unwrap();

        Fixture { store, cache, service }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_default_plan_created_once() {
        let f = fixture().await;
        let again = f
            .service
            .ensure_default_subscription(&DefaultPlanConfig::default())
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(f.service.list_subscriptions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_reads_through_cache() {
        let f = fixture().await;
        assert!(f.cache.get("subscription:1").await.unwrap().is_none());

        let plan = f.service.get_subscription(1).await.unwrap();
        assert_eq!(plan.name, "Well-Read");

        let cached = f.cache.get("subscription:1").await.unwrap().unwrap();
        let from_cache: Subscription = serde_json::from_str(&cached).unwrap();
        assert_eq!(from_cache, plan);
    }

    #[tokio::test]
    async fn test_get_prefers_cached_copy() {
        let f = fixture().await;
        let mut stale = f.service.get_subscription(1).await.unwrap();
        stale.price = "999".into();
        f.cache
            .set("subscription:1", serde_json::to_string(&stale).unwrap(), None)
            .await
            .unwrap();

        assert_eq!(f.service.get_subscription(1).await.unwrap().price, "999");
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let f = fixture().await;
        assert!(matches!(
            f.service.get_subscription(99).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_requires_admin() {
        let f = fixture().await;
        let patch = SubscriptionPatch {
            price: Some("150".into()),
            ..SubscriptionPatch::default()
        };

        let err = f
            .service
            .update_subscription(1, &patch, Some("reader-token"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Forbidden);

        let err = f.service.update_subscription(1, &patch, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        f.service.get_subscription(1).await.unwrap();
        let updated = f
            .service
            .update_subscription(1, &patch, Some("admin-token"))
            .await
            .unwrap();
        assert_eq!(updated.price, "150");
        // Cached copy was dropped, so the next read sees the change.
        assert_eq!(f.service.get_subscription(1).await.unwrap().price, "150");
    }

    #[tokio::test]
    async fn test_purchase() {
        let f = fixture().await;
        f.cache.set("user:reader-token", "cached user".into(), None).await.unwrap();

        let user = f
            .service
            .purchase_subscription(1, Some("reader-token"), at(1))
            .await
            .unwrap();

        assert!(user.subscription);
        assert_eq!(user.sub_buy_time, Some(at(1)));
        assert_eq!(user.sub_end_time, Some(at(31)));
        assert_eq!(f.store.user(2), Some(user));
        assert!(f.cache.get("user:reader-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purchase_errors() {
        let f = fixture().await;
        assert!(matches!(
            f.service.purchase_subscription(1, Some(""), at(1)).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert_eq!(
            f.service.purchase_subscription(1, Some("stranger"), at(1)).await,
            Err(ServiceError::NotFound("user".into()))
        );
        assert_eq!(
            f.service.purchase_subscription(7, Some("reader-token"), at(1)).await,
            Err(ServiceError::NotFound("subscription 7".into()))
        );
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let f = fixture().await;
        f.service
            .purchase_subscription(1, Some("reader-token"), at(1))
            .await
            .unwrap();
        f.service
            .purchase_subscription(1, Some("admin-token"), at(20))
            .await
            .unwrap();

        assert_eq!(f.service.sweep_expired(at(31)).await.unwrap(), 0);

        let cleared = f
            .service
            .sweep_expired(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(cleared, 1);

        let reader = f.store.user(2).unwrap();
        assert!(!reader.subscription);
        assert_eq!(reader.sub_buy_time, None);
        assert_eq!(reader.sub_end_time, None);
        assert!(f.store.user(1).unwrap().subscription);
    }
}
