//! # API REST
//!
//! REST API implementation for CareNav.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, bearer tokens, status codes)
//!
//! Uses `api-shared` for request/response types and `carenav-core` for every policy decision.

#![warn(rust_2018_idioms)]

pub mod handlers;

use api_shared::auth::AuthError;
use axum::{
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use carenav_core::{
    CoreConfig, ModuleFetchFence, NavError, NavResult, NavigationService, SessionContext,
    SessionKeys,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

/// Error half of every handler result.
pub type ApiError = (StatusCode, &'static str);

/// Upper bound on the time between sweeps for idle sessions.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) type SessionMap = HashMap<Uuid, SessionEntry>;

/// One logged-in operator.
#[derive(Debug)]
pub(crate) struct SessionEntry {
    pub(crate) context: SessionContext,
    pub(crate) fence: ModuleFetchFence,
    pub(crate) started_at: DateTime<Utc>,
    last_seen: Instant,
}

impl SessionEntry {
    pub(crate) fn new(context: SessionContext) -> Self {
        Self {
            context,
            fence: ModuleFetchFence::new(),
            started_at: Utc::now(),
            last_seen: Instant::now(),
        }
    }

    /// Restarts the idle timer.
    pub(crate) fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub(crate) fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

/// Application state for the REST API server
///
/// Holds the catalog and organization directory loaded at startup, and the live sessions.
#[derive(Clone)]
pub struct AppState {
    service: NavigationService,
    session_keys: SessionKeys,
    session_ttl: Duration,
    sessions: Arc<RwLock<SessionMap>>,
}

impl AppState {
    /// Sessions idle for `session_ttl` are forgotten.
    pub fn new(
        service: NavigationService,
        session_keys: SessionKeys,
        session_ttl: Duration,
    ) -> Self {
        Self {
            service,
            session_keys,
            session_ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads everything `cfg` points at.
    ///
    /// # Errors
    ///
    /// Returns any error from [`NavigationService::from_config`].
    pub fn from_config(cfg: &CoreConfig) -> NavResult<Self> {
        Ok(Self::new(
            NavigationService::from_config(cfg)?,
            cfg.session_keys().clone(),
            cfg.session_ttl(),
        ))
    }

    /// Drops every session that has been idle for the TTL. Returns how many were dropped.
    pub async fn evict_expired_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.session_ttl));
        before - sessions.len()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::start_session,
        handlers::session_context,
        handlers::switch_organization,
        handlers::logout,
        handlers::session_navigation,
        handlers::list_organizations,
        handlers::preview_navigation,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::StartSessionReq,
        api_shared::StartSessionRes,
        api_shared::SessionContextRes,
        api_shared::SwitchOrganizationReq,
        api_shared::NavigationRes,
        api_shared::NavGroupDto,
        api_shared::NavItemDto,
        api_shared::PreviewNavigationReq,
        api_shared::OrganizationDto,
        api_shared::ListOrganizationsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS for the browser shell.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/:id", delete(handlers::logout))
        .route("/sessions/:id/context", get(handlers::session_context))
        .route("/sessions/:id/organization", put(handlers::switch_organization))
        .route("/sessions/:id/navigation", get(handlers::session_navigation))
        .route("/organizations", get(handlers::list_organizations))
        .route("/navigation/preview", post(handlers::preview_navigation))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the router until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ CareNav REST listening on {}", listener.local_addr()?);

    let sweeper = tokio::spawn(sweep_expired_sessions(state.clone()));
    let result = axum::serve(listener, router(state)).await;
    sweeper.abort();
    result?;
    Ok(())
}

async fn sweep_expired_sessions(state: AppState) {
    let period = state
        .session_ttl
        .min(SESSION_SWEEP_INTERVAL)
        .max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let evicted = state.evict_expired_sessions().await;
        if evicted > 0 {
            tracing::info!(evicted, "expired idle sessions");
        }
    }
}

pub(crate) fn nav_error_status(err: &NavError) -> ApiError {
    match err {
        NavError::InvalidInput(_) | NavError::Text(_) | NavError::Schema { .. } => {
            (StatusCode::BAD_REQUEST, "Bad request")
        }
        NavError::UnknownOrganization(_) => (StatusCode::NOT_FOUND, "Unknown organization"),
        NavError::SelectionNotPermitted { .. }
        | NavError::SelectionOverridesBoundOrganization(_) => {
            (StatusCode::FORBIDDEN, "Organization switch not permitted")
        }
        _ => {
            tracing::error!("request failed: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

pub(crate) fn auth_error_status(err: &AuthError) -> ApiError {
    tracing::debug!("rejected session token: {err}");
    (StatusCode::UNAUTHORIZED, "Unauthorized")
}
