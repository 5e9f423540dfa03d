//! Story game backend
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ story handlers ────────▶ story service
//!                    (request id,                                   │
//!                     trace, timeout,                               ▼
//!                     body limit)                           retry executor
//!                         │                                 (classify, backoff)
//!                         │                                         │
//!                         ▼                                         ▼
//!                  subscription handlers ──▶ subscription    completion client ──▶ AI API
//!                                            service
//!                                            ├── cache (TTL)
//!                                            ├── store
//!                                            └── expiry sweeper (daily)
//! ```

use std::path::PathBuf;

use clap::Parser;

use story_server::config::{finalize, load_config, ServerConfig};
use story_server::lifecycle;
use story_server::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "story-server")]
#[command(about = "Interactive story backend", long_about = None)]
struct Args {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "STORY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => finalize(ServerConfig::default())?,
    };

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "story-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        ai_base_url = %config.ai.base_url,
        max_retries = config.retries.max_retries,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.ai.api_token.is_empty() {
        tracing::warn!("No AI token configured; completion requests will be rejected upstream");
    }

    let app = lifecycle::build(config).await?;
    app.run().await?;

    Ok(())
}
