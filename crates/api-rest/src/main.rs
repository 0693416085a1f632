//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the CareNav REST API server on its own.
//!
//! ## Intended use
//! Development and debugging with OpenAPI/Swagger UI at `/swagger-ui`. The workspace's main
//! `carenav-run` binary starts the same router.

use api_rest::AppState;
use carenav_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the REST API server
///
/// # Environment Variables
/// - `CARENAV_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CARENAV_CATALOG_FILE`: YAML navigation catalog (default: built-in catalog)
/// - `CARENAV_ORGANIZATIONS_FILE`: YAML organization directory (default: empty directory)
/// - `CARENAV_SESSION_KEY`: Session key for the selected organization
/// - `CARENAV_SESSION_TTL_SECS`: Idle session lifetime in seconds (default: 28800)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("carenav_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(
        std::env::var("CARENAV_CATALOG_FILE").ok(),
        std::env::var("CARENAV_ORGANIZATIONS_FILE").ok(),
        std::env::var("CARENAV_SESSION_KEY").ok(),
        std::env::var("CARENAV_SESSION_TTL_SECS").ok(),
    )?;
    let state = AppState::from_config(&cfg)?;

    let addr = std::env::var("CARENAV_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting CareNav REST on {}", addr);

    api_rest::serve(&addr, state).await
}
