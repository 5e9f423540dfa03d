//! Subscription subsystem.
//!
//! # Data Flow
//! ```text
//! GET /subscription/{id}
//!     → service.rs → cache.rs (subscription:{id}, 1h TTL) → store.rs on miss
//!
//! POST /subscription/purchase/{id}
//!     → store.rs TokenDirectory (token → user)
//!     → store.rs (plan lookup, user update)
//!     → cache.rs (drop user:{token})
//!
//! Daily at the configured hour:
//!     sweep.rs → service.rs sweep_expired → store.rs
//! ```

pub mod cache;
pub mod service;
pub mod store;
pub mod sweep;
pub mod types;

pub use cache::{KeyValueCache, MemoryCache};
pub use service::SubscriptionService;
pub use store::{MemoryStore, SubscriptionStore, TokenDirectory};
pub use sweep::ExpirySweeper;
pub use types::{NewSubscription, Role, Subscription, SubscriptionPatch, User};
