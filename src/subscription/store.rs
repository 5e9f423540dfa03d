//! Relational store and token directory collaborators.
//!
//! The service only needs simple get/list/update calls, so the store is a
//! trait. [`MemoryStore`] backs both traits in-process; a database-backed
//! implementation plugs in behind the same seams.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::ServiceResult;
use crate::subscription::types::{NewSubscription, Subscription, SubscriptionPatch, User};

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_subscription(&self, id: i64) -> ServiceResult<Option<Subscription>>;

    async fn find_subscription_by_name(&self, name: &str) -> ServiceResult<Option<Subscription>>;

    /// All plans ordered by id.
    async fn list_subscriptions(&self) -> ServiceResult<Vec<Subscription>>;

    async fn create_subscription(&self, plan: NewSubscription) -> ServiceResult<Subscription>;

    /// Returns `None` when no plan has this id.
    async fn update_subscription(
        &self,
        id: i64,
        patch: &SubscriptionPatch,
    ) -> ServiceResult<Option<Subscription>>;

    /// Replace a user record, returning what was stored.
    async fn save_user(&self, user: User) -> ServiceResult<User>;

    /// Users whose subscription flag is set but whose end time is before `now`.
    async fn users_with_expired_subscription(&self, now: DateTime<Utc>) -> ServiceResult<Vec<User>>;
}

/// Resolves bearer tokens to users. Token issuance lives elsewhere.
#[async_trait]
pub trait TokenDirectory: Send + Sync {
    async fn user_for_token(&self, token: &str) -> ServiceResult<Option<User>>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    subscriptions: DashMap<i64, Subscription>,
    users: DashMap<i64, User>,
    tokens: DashMap<String, i64>,
    next_subscription_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user together with a token that resolves to it.
    pub fn insert_user(&self, user: User, token: Option<&str>) {
        if let Some(token) = token {
            self.tokens.insert(token.to_string(), user.id);
        }
        self.users.insert(user.id, user);
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.users.get(&id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_subscription(&self, id: i64) -> ServiceResult<Option<Subscription>> {
        Ok(self.subscriptions.get(&id).map(|r| r.value().clone()))
    }

    async fn find_subscription_by_name(&self, name: &str) -> ServiceResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .iter()
            .find(|r| r.value().name == name)
            .map(|r| r.value().clone()))
    }

    async fn list_subscriptions(&self) -> ServiceResult<Vec<Subscription>> {
        let mut plans: Vec<_> = self.subscriptions.iter().map(|r| r.value().clone()).collect();
        plans.sort_by_key(|p| p.id);
        Ok(plans)
    }

    async fn create_subscription(&self, plan: NewSubscription) -> ServiceResult<Subscription> {
        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Subscription {
            id,
            name: plan.name,
            description: plan.description,
            price: plan.price,
            days_period: plan.days_period,
        };
        self.subscriptions.insert(id, created.clone());
        Ok(created)
    }

    async fn update_subscription(
        &self,
        id: i64,
        patch: &SubscriptionPatch,
    ) -> ServiceResult<Option<Subscription>> {
        Ok(self.subscriptions.get_mut(&id).map(|mut entry| {
            patch.apply(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn save_user(&self, user: User) -> ServiceResult<User> {
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn users_with_expired_subscription(&self, now: DateTime<Utc>) -> ServiceResult<Vec<User>> {
        let mut expired: Vec<_> = self
            .users
            .iter()
            .filter(|r| r.value().subscription_expired(now))
            .map(|r| r.value().clone())
            .collect();
        expired.sort_by_key(|u| u.id);
        Ok(expired)
    }
}

#[async_trait]
impl TokenDirectory for MemoryStore {
    async fn user_for_token(&self, token: &str) -> ServiceResult<Option<User>> {
        let id = match self.tokens.get(token) {
            Some(id) => *id.value(),
            None => return Ok(None),
        };
        Ok(self.user(id))
    }
}
