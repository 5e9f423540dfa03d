//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build services → Seed plan and users → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Latch flag → Stop accepting → Drain connections → Stop sweeper
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownListener};
pub use startup::{build, build_with_backend, Application, StartupError};
