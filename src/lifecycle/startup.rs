//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize all subsystems in dependency order
//! - Seed the default plan and configured users
//! - Start background tasks (expiry sweep, metrics)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener starts last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::ai::{CompletionBackend, HttpCompletionClient};
use crate::config::ServerConfig;
use crate::error::ServiceError;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::resilience::RetryExecutor;
use crate::story::StoryService;
use crate::subscription::{ExpirySweeper, MemoryCache, MemoryStore, SubscriptionService, User};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize services: {0}")]
    Service(#[from] ServiceError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Everything a running server needs, assembled but not yet serving.
pub struct Application {
    pub config: ServerConfig,
    pub state: AppState,
}

/// Build services against the real completion client.
pub async fn build(config: ServerConfig) -> Result<Application, StartupError> {
    let backend: Arc<dyn CompletionBackend> = Arc::new(HttpCompletionClient::new(&config.ai)?);
    build_with_backend(config, backend).await
}

/// Build services around an arbitrary completion backend.
pub async fn build_with_backend(
    config: ServerConfig,
    backend: Arc<dyn CompletionBackend>,
) -> Result<Application, StartupError> {
    let executor = RetryExecutor::new(config.retries.into());
    let stories = StoryService::new(backend, executor);

    let store = Arc::new(MemoryStore::new());
    for seed in &config.subscriptions.users {
        store.insert_user(User::new(seed.id, seed.name.clone(), seed.role), Some(&seed.token));
    }
    tracing::debug!(users = config.subscriptions.users.len(), "User directory seeded");

    let subscriptions = Arc::new(SubscriptionService::new(
        store.clone(),
        store,
        Arc::new(MemoryCache::new()),
        &config.cache,
    ));
    subscriptions
        .ensure_default_subscription(&config.subscriptions.default_plan)
        .await?;

    Ok(Application {
        state: AppState::new(stories, subscriptions),
        config,
    })
}

impl Application {
    /// Serve until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), StartupError> {
        let address = self.config.listener.bind_address.clone();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind { address, source })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `signal` completes, then drain.
    pub async fn serve(
        self,
        listener: TcpListener,
        signal: impl std::future::Future<Output = ()>,
    ) -> Result<(), StartupError> {
        let Application { config, state } = self;

        if config.observability.metrics_enabled {
            match config.observability.metrics_address.parse() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(_) => tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                ),
            }
        }

        let shutdown = Shutdown::new();

        let sweeper = config.subscriptions.sweep_enabled.then(|| {
            let sweeper =
                ExpirySweeper::new(state.subscriptions.clone(), config.subscriptions.sweep_hour_utc);
            tokio::spawn(sweeper.run(shutdown.subscribe()))
        });

        let server = HttpServer::new(&config, state);
        let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

        signal.await;
        tracing::info!("Shutdown signal received, draining");
        shutdown.trigger();

        if let Some(sweeper) = sweeper {
            if let Err(e) = sweeper.await {
                tracing::warn!(error = %e, "Expiry sweeper task ended abnormally");
            }
        }

        match server_task.await {
            Ok(result) => result?,
            Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
