//! Route handlers.
//!
//! Session-scoped routes authenticate with the token the session was started with. All role,
//! tenant and visibility decisions are delegated to `carenav-core`.

use crate::{auth_error_status, nav_error_status, ApiError, AppState, SessionEntry, SessionMap};
use api_shared::auth::{bearer_token, validate_session_token};
use api_shared::{
    HealthRes, HealthService, ListOrganizationsRes, NavigationQuery, NavigationRes,
    OrganizationDto, PreviewNavigationReq, SessionContextRes, StartSessionReq, StartSessionRes,
    SwitchOrganizationReq,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use carenav_core::{
    normalize, EnabledModules, Identity, MemorySessionStore, ModuleSource, NavError,
    OrganizationId, SessionContext,
};
use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

const SESSION_NOT_FOUND: ApiError = (StatusCode::NOT_FOUND, "Session not found");

fn authorize(headers: &HeaderMap, entry: &SessionEntry) -> Result<(), ApiError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);
    let expected = entry.context.auth_token();
    validate_session_token(provided, expected.as_deref()).map_err(|e| auth_error_status(&e))
}

/// Looks up session `id` for an authenticated request and restarts its idle timer.
///
/// A session idle for `ttl` is removed and reported as not found.
fn open_session<'a>(
    sessions: &'a mut SessionMap,
    id: &Uuid,
    ttl: Duration,
    headers: &HeaderMap,
) -> Result<&'a mut SessionEntry, ApiError> {
    let expired = sessions.get(id).ok_or(SESSION_NOT_FOUND)?.is_expired(ttl);
    if expired {
        sessions.remove(id);
        tracing::info!(session = %id, "session expired");
        return Err(SESSION_NOT_FOUND);
    }

    let entry = sessions.get_mut(id).ok_or(SESSION_NOT_FOUND)?;
    authorize(headers, entry)?;
    entry.touch();
    Ok(entry)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check", body = HealthRes)
    )
)]
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/sessions",
    request_body = StartSessionReq,
    responses(
        (status = 201, description = "Session started", body = StartSessionRes),
        (status = 400, description = "Bad request")
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionReq>,
) -> Result<(StatusCode, Json<StartSessionRes>), ApiError> {
    let token = req.token.trim();
    if token.is_empty() {
        return Err(nav_error_status(&NavError::InvalidInput(
            "session token is empty".into(),
        )));
    }

    let identity = Identity::new(req.role, req.organization_id.as_deref());
    let role = identity.role();
    let context = SessionContext::login(
        identity,
        token,
        MemorySessionStore::new(),
        state.session_keys.clone(),
    );
    let entry = SessionEntry::new(context);
    let started_at = entry.started_at;
    let session_id = Uuid::new_v4();

    state.sessions.write().await.insert(session_id, entry);
    tracing::info!(session = %session_id, role = %role, "session started");

    Ok((
        StatusCode::CREATED,
        Json(StartSessionRes {
            session_id: session_id.to_string(),
            role: role.to_string(),
            role_label: role.display_name().to_string(),
            started_at: started_at.to_rfc3339(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/context",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Resolved tenant context", body = SessionContextRes),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn session_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SessionContextRes>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let entry = open_session(&mut sessions, &id, state.session_ttl, &headers)?;

    Ok(Json(SessionContextRes::new(
        id.to_string(),
        &entry.context.identity().role(),
        &entry.context.tenant(),
    )))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/organization",
    params(("id" = String, Path, description = "Session id")),
    request_body = SwitchOrganizationReq,
    responses(
        (status = 200, description = "Organization selected", body = SessionContextRes),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Organization switch not permitted"),
        (status = 404, description = "Session or organization not found")
    )
)]
pub async fn switch_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<SwitchOrganizationReq>,
) -> Result<Json<SessionContextRes>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let entry = open_session(&mut sessions, &id, state.session_ttl, &headers)?;

    let organization_id =
        OrganizationId::new(&req.organization_id).map_err(|e| nav_error_status(&e.into()))?;
    state
        .service
        .directory()
        .require(&organization_id)
        .map_err(|e| nav_error_status(&e))?;
    entry
        .context
        .select_organization(organization_id)
        .map_err(|e| nav_error_status(&e))?;

    Ok(Json(SessionContextRes::new(
        id.to_string(),
        &entry.context.identity().role(),
        &entry.context.tenant(),
    )))
}

#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions.write().await;
    open_session(&mut sessions, &id, state.session_ttl, &headers)?;

    if let Some(entry) = sessions.remove(&id) {
        entry.context.logout();
        let duration = Utc::now() - entry.started_at;
        tracing::info!(
            session = %id,
            seconds = duration.num_seconds(),
            "session ended"
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Resolves the tenant, fetches its modules, and builds the sidebar.
///
/// The session lock is released while modules are fetched. A result that arrives after the
/// tenant changed, or after a newer fetch started, is discarded by the session's fence.
#[utoipa::path(
    get,
    path = "/sessions/{id}/navigation",
    params(("id" = String, Path, description = "Session id"), NavigationQuery),
    responses(
        (status = 200, description = "Navigation for the session", body = NavigationRes),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn session_navigation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<NavigationQuery>,
    headers: HeaderMap,
) -> Result<Json<NavigationRes>, ApiError> {
    let directory = state.service.directory();

    let ticket = {
        let mut sessions = state.sessions.write().await;
        let entry = open_session(&mut sessions, &id, state.session_ttl, &headers)?;

        entry.context.retain_valid_selection(directory.ids());
        let tenant = entry.context.tenant();
        tenant
            .organization_id()
            .cloned()
            .map(|organization_id| entry.fence.begin(organization_id))
    };

    let fetched = match ticket {
        Some(ticket) => {
            let result = directory
                .fetch_enabled_modules(ticket.organization_id())
                .await;
            Some((ticket, result))
        }
        None => None,
    };

    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or(SESSION_NOT_FOUND)?;
    let tenant = entry.context.tenant();
    if let Some((ticket, result)) = fetched {
        entry.fence.accept(ticket, tenant.organization_id(), result);
    }

    let role = entry.context.identity().role();
    let modules = entry.fence.enabled_modules(tenant.organization_id());
    let navigation = state.service.catalog().build_navigation(&role, &modules);

    Ok(Json(NavigationRes::new(
        &role,
        tenant.organization_id(),
        modules.is_known(),
        &navigation,
        query.location.as_deref(),
    )))
}

#[utoipa::path(
    get,
    path = "/organizations",
    responses(
        (status = 200, description = "Organizations an operator can act on", body = ListOrganizationsRes)
    )
)]
pub async fn list_organizations(State(state): State<AppState>) -> Json<ListOrganizationsRes> {
    Json(ListOrganizationsRes {
        organizations: state
            .service
            .directory()
            .organizations()
            .iter()
            .map(OrganizationDto::from)
            .collect(),
    })
}

#[utoipa::path(
    post,
    path = "/navigation/preview",
    request_body = PreviewNavigationReq,
    responses(
        (status = 200, description = "Navigation for a role and module set", body = NavigationRes)
    )
)]
pub async fn preview_navigation(
    State(state): State<AppState>,
    Json(req): Json<PreviewNavigationReq>,
) -> Json<NavigationRes> {
    let role = normalize(&req.role);
    let modules = match req.modules {
        Some(names) => EnabledModules::from_names(names),
        None => EnabledModules::Unknown,
    };
    let navigation = state.service.catalog().build_navigation(&role, &modules);

    Json(NavigationRes::new(
        &role,
        None,
        modules.is_known(),
        &navigation,
        req.location.as_deref(),
    ))
}
