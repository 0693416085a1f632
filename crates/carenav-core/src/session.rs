//! Session state for one logged-in operator.
//!
//! The operator's [`Identity`] is fixed at login. The only mutable piece is the selected
//! organization, which lives in a session-scoped key-value store next to the auth token. Both
//! keys are owned by a [`SessionContext`] that callers pass by reference into the resolver, so
//! nothing reads session state through globals.
//!
//! Logout consumes the context and clears the token and the selection together; the store that
//! comes back is safe to hand to the next login without leaking a stale tenant.

use crate::constants::{AUTH_TOKEN_KEY, SELECTED_ORGANIZATION_KEY};
use crate::error::{NavError, NavResult};
use crate::role::{normalize, CanonicalRole};
use crate::tenant::TenantContext;
use carenav_types::OrganizationId;
use std::collections::BTreeMap;

/// The authenticated operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    role: String,
    organization_id: Option<OrganizationId>,
}

impl Identity {
    /// Builds an identity from login data. A blank organization id means the operator is not
    /// bound to a tenant.
    pub fn new(role: impl Into<String>, organization_id: Option<&str>) -> Self {
        Self {
            role: role.into(),
            organization_id: OrganizationId::from_optional(organization_id),
        }
    }

    /// The role string exactly as the authentication result supplied it.
    pub fn raw_role(&self) -> &str {
        &self.role
    }

    pub fn role(&self) -> CanonicalRole {
        normalize(&self.role)
    }

    pub fn organization_id(&self) -> Option<&OrganizationId> {
        self.organization_id.as_ref()
    }
}

/// Snapshot of the operator's organization choice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSelection {
    selected_organization_id: Option<OrganizationId>,
}

impl SessionSelection {
    pub fn new(selected_organization_id: Option<OrganizationId>) -> Self {
        Self {
            selected_organization_id,
        }
    }

    /// Builds a selection from a stored value; blank values are no selection.
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self::new(OrganizationId::from_optional(raw))
    }

    pub fn selected_organization_id(&self) -> Option<&OrganizationId> {
        self.selected_organization_id.as_ref()
    }
}

/// Session-scoped key-value storage. Only get, set and remove are used.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process session storage.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    entries: BTreeMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Storage keys used by a [`SessionContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionKeys {
    pub selected_organization: String,
    pub auth_token: String,
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self {
            selected_organization: SELECTED_ORGANIZATION_KEY.to_owned(),
            auth_token: AUTH_TOKEN_KEY.to_owned(),
        }
    }
}

/// Identity plus session storage for one login.
#[derive(Debug)]
pub struct SessionContext<S = MemorySessionStore> {
    identity: Identity,
    store: S,
    keys: SessionKeys,
}

impl<S: SessionStore> SessionContext<S> {
    /// Starts a session. The selection starts empty, even if `store` still holds one from an
    /// earlier login.
    pub fn login(identity: Identity, auth_token: &str, mut store: S, keys: SessionKeys) -> Self {
        store.remove(&keys.selected_organization);
        store.set(&keys.auth_token, auth_token.to_owned());
        tracing::debug!(role = %identity.role(), "session started");
        Self {
            identity,
            store,
            keys,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn auth_token(&self) -> Option<String> {
        self.store.get(&self.keys.auth_token)
    }

    pub fn selection(&self) -> SessionSelection {
        SessionSelection::from_raw(self.store.get(&self.keys.selected_organization).as_deref())
    }

    /// Resolves the tenant for this render. Call again after every selection change.
    pub fn tenant(&self) -> TenantContext {
        TenantContext::resolve(&self.identity, &self.selection())
    }

    /// Records the organization a super-administrator wants to operate on.
    ///
    /// # Errors
    ///
    /// - [`NavError::SelectionOverridesBoundOrganization`] if the identity is bound to a tenant.
    /// - [`NavError::SelectionNotPermitted`] if the role cannot act across tenants.
    pub fn select_organization(&mut self, organization_id: OrganizationId) -> NavResult<()> {
        if let Some(bound) = self.identity.organization_id() {
            return Err(NavError::SelectionOverridesBoundOrganization(
                bound.to_string(),
            ));
        }

        let role = self.identity.role();
        if !role.is_super_admin() {
            return Err(NavError::SelectionNotPermitted {
                role: role.to_string(),
            });
        }

        tracing::info!(organization = %organization_id, "organization selected");
        self.store
            .set(&self.keys.selected_organization, organization_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.store.remove(&self.keys.selected_organization);
    }

    /// Clears the selection if it is not among `valid`, typically a freshly fetched organization
    /// list. Returns `true` if a stale selection was removed.
    pub fn retain_valid_selection<'a>(
        &mut self,
        valid: impl IntoIterator<Item = &'a OrganizationId>,
    ) -> bool {
        let Some(selected) = self.selection().selected_organization_id().cloned() else {
            return false;
        };

        if valid.into_iter().any(|id| *id == selected) {
            return false;
        }

        tracing::warn!(organization = %selected, "clearing selection for unknown organization");
        self.clear_selection();
        true
    }

    /// Ends the session, clearing the auth token and the selection in one step.
    pub fn logout(mut self) -> S {
        self.store.remove(&self.keys.auth_token);
        self.store.remove(&self.keys.selected_organization);
        tracing::debug!("session ended");
        self.store
    }
}
