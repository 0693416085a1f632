use api_rest::AppState;
use carenav_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the CareNav application
///
/// Resolves configuration once, loads the navigation catalog and organization directory, and
/// serves the REST API.
///
/// # Environment Variables
/// - `CARENAV_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CARENAV_CATALOG_FILE`: YAML navigation catalog (default: built-in catalog)
/// - `CARENAV_ORGANIZATIONS_FILE`: YAML organization directory
/// - `CARENAV_SESSION_KEY`: Session key under which the selected organization is stored
/// - `CARENAV_SESSION_TTL_SECS`: Idle session lifetime in seconds (default: 28800)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carenav=info".parse()?)
                .add_directive("api_rest=info".parse()?),
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

    let rest_addr = std::env::var("CARENAV_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting CareNav REST on {}", rest_addr);

    api_rest::serve(&rest_addr, state).await
}
