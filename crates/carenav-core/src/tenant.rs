//! Tenant context resolution and module-list fencing.
//!
//! The effective organization is resolved in strict precedence order:
//! 1. the organization the identity is bound to;
//! 2. the organization chosen in the session;
//! 3. nothing, in which case the caller must prompt for a selection.
//!
//! Resolution is pure and cheap, and callers re-run it on every render because the session
//! selection can change between renders. Whether a selected organization still exists is the
//! session's concern (see [`crate::session::SessionContext::retain_valid_selection`]).
//!
//! Enabled-module lists arrive asynchronously and are keyed to the tenant they were fetched for.
//! [`ModuleFetchFence`] applies "last request wins": a response is only accepted when it answers
//! the most recent request and that request's tenant is still the effective one.

use crate::capability::EnabledModules;
use crate::error::NavResult;
use crate::session::{Identity, SessionSelection};
use carenav_types::{ModuleName, OrganizationId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::future::Future;

/// Which rule produced the effective organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantSource {
    Bound,
    Selected,
    Unresolved,
}

/// The tenant in effect for the current render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantContext {
    organization_id: Option<OrganizationId>,
    source: TenantSource,
}

impl TenantContext {
    pub fn resolve(identity: &Identity, selection: &SessionSelection) -> Self {
        if let Some(bound) = identity.organization_id() {
            return Self {
                organization_id: Some(bound.clone()),
                source: TenantSource::Bound,
            };
        }

        if let Some(selected) = selection.selected_organization_id() {
            return Self {
                organization_id: Some(selected.clone()),
                source: TenantSource::Selected,
            };
        }

        Self {
            organization_id: None,
            source: TenantSource::Unresolved,
        }
    }

    pub fn organization_id(&self) -> Option<&OrganizationId> {
        self.organization_id.as_ref()
    }

    pub fn source(&self) -> TenantSource {
        self.source
    }

    /// No tenant is in effect and the UI should ask the operator to pick one.
    pub fn needs_selection(&self) -> bool {
        self.source == TenantSource::Unresolved
    }
}

/// Effective organization for an identity and session selection.
pub fn effective_organization(
    identity: &Identity,
    selection: &SessionSelection,
) -> Option<OrganizationId> {
    TenantContext::resolve(identity, selection).organization_id
}

/// Source of a tenant's enabled modules, usually a tenant-configuration endpoint.
pub trait ModuleSource {
    fn fetch_enabled_modules(
        &self,
        organization_id: &OrganizationId,
    ) -> impl Future<Output = NavResult<BTreeSet<ModuleName>>> + Send;
}

/// Receipt for one module fetch. Hand it back to [`ModuleFetchFence::accept`] with the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    request_id: u64,
    organization_id: OrganizationId,
}

impl FetchTicket {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

/// Tracks module fetches for one session and discards stale responses.
#[derive(Debug, Default)]
pub struct ModuleFetchFence {
    latest_request: u64,
    loaded: Option<(OrganizationId, EnabledModules)>,
}

impl ModuleFetchFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new fetch for `organization_id`, superseding any fetch still in flight.
    pub fn begin(&mut self, organization_id: OrganizationId) -> FetchTicket {
        self.latest_request += 1;
        FetchTicket {
            request_id: self.latest_request,
            organization_id,
        }
    }

    /// Offers a fetch result. It is stored only if `ticket` is the latest one issued and its
    /// organization is still `current`. A failed fetch is stored as [`EnabledModules::Unknown`].
    ///
    /// Returns whether the result was accepted.
    pub fn accept(
        &mut self,
        ticket: FetchTicket,
        current: Option<&OrganizationId>,
        result: NavResult<BTreeSet<ModuleName>>,
    ) -> bool {
        if ticket.request_id != self.latest_request {
            tracing::debug!(
                request_id = ticket.request_id,
                latest = self.latest_request,
                "discarding superseded module list"
            );
            return false;
        }

        if current != Some(&ticket.organization_id) {
            tracing::debug!(
                organization = %ticket.organization_id,
                "discarding module list for a tenant no longer in effect"
            );
            return false;
        }

        let modules = match result {
            Ok(modules) => EnabledModules::Known(modules),
            Err(err) => {
                tracing::warn!(organization = %ticket.organization_id, "module fetch failed: {err}");
                EnabledModules::Unknown
            }
        };

        self.loaded = Some((ticket.organization_id, modules));
        true
    }

    /// Modules for `current`, or [`EnabledModules::Unknown`] if none were loaded for it.
    pub fn enabled_modules(&self, current: Option<&OrganizationId>) -> EnabledModules {
        match (&self.loaded, current) {
            (Some((loaded_for, modules)), Some(current)) if loaded_for == current => {
                modules.clone()
            }
            _ => EnabledModules::Unknown,
        }
    }

    /// Forgets any loaded modules; in-flight tickets become stale.
    pub fn reset(&mut self) {
        self.latest_request += 1;
        self.loaded = None;
    }
}
