//! Subscription and user records.
//!
//! Field names serialize in camelCase, which is what the web client reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchasable subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Decimal price as text, e.g. `"300"`.
    pub price: String,
    /// Length of the subscription in days.
    pub days_period: u32,
}

/// Fields for a plan that does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub name: String,
    pub description: String,
    pub price: String,
    pub days_period: u32,
}

/// Partial update of a plan. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_period: Option<u32>,
}

impl SubscriptionPatch {
    pub fn apply(&self, plan: &mut Subscription) {
        if let Some(name) = &self.name {
            plan.name = name.clone();
        }
        if let Some(description) = &self.description {
            plan.description = description.clone();
        }
        if let Some(price) = &self.price {
            plan.price = price.clone();
        }
        if let Some(days) = self.days_period {
            plan.days_period = days;
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A player account, as far as subscriptions are concerned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    /// Whether a paid subscription is currently active.
    pub subscription: bool,
    pub sub_buy_time: Option<DateTime<Utc>>,
    pub sub_end_time: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            subscription: false,
            sub_buy_time: None,
            sub_end_time: None,
        }
    }

    /// Active flag still set but the end time has passed.
    pub fn subscription_expired(&self, now: DateTime<Utc>) -> bool {
        self.subscription && self.sub_end_time.is_some_and(|end| end < now)
    }

    /// Drop the subscription and its timestamps.
    pub fn clear_subscription(&mut self) {
        self.subscription = false;
        self.sub_buy_time = None;
        self.sub_end_time = None;
    }
}
