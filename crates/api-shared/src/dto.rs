//! Request and response types for the CareNav API.
//!
//! These mirror the core policy types with plain strings so the UI shell and the OpenAPI
//! document do not depend on `carenav-core` internals.

use carenav_core::{
    CanonicalRole, Navigation, NavGroup, NavItem, Organization, OrganizationId, TenantContext,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Login result handed over by the authentication service.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StartSessionReq {
    pub token: String,
    pub role: String,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StartSessionRes {
    pub session_id: String,
    pub role: String,
    pub role_label: String,
    pub started_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionContextRes {
    pub session_id: String,
    pub role: String,
    pub role_label: String,
    pub organization_id: Option<String>,
    /// `bound`, `selected` or `unresolved`.
    pub tenant_source: String,
    pub needs_selection: bool,
}

impl SessionContextRes {
    pub fn new(session_id: String, role: &CanonicalRole, tenant: &TenantContext) -> Self {
        let tenant_source = match tenant.source() {
            carenav_core::TenantSource::Bound => "bound",
            carenav_core::TenantSource::Selected => "selected",
            carenav_core::TenantSource::Unresolved => "unresolved",
        };
        Self {
            session_id,
            role: role.to_string(),
            role_label: role.display_name().to_string(),
            organization_id: tenant.organization_id().map(OrganizationId::to_string),
            tenant_source: tenant_source.into(),
            needs_selection: tenant.needs_selection(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SwitchOrganizationReq {
    pub organization_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavItemDto {
    pub path: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub required_modules: Vec<String>,
    pub allowed_roles: Vec<String>,
}

impl From<&NavItem> for NavItemDto {
    fn from(item: &NavItem) -> Self {
        Self {
            path: item.path.clone(),
            label: item.label.clone(),
            icon: item.icon.clone(),
            required_modules: item
                .required_modules
                .iter()
                .map(ToString::to_string)
                .collect(),
            allowed_roles: item.allowed_roles.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavGroupDto {
    pub label: String,
    pub items: Vec<NavItemDto>,
}

impl From<&NavGroup> for NavGroupDto {
    fn from(group: &NavGroup) -> Self {
        Self {
            label: group.label.clone(),
            items: group.items.iter().map(NavItemDto::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavigationRes {
    pub role: String,
    pub organization_id: Option<String>,
    /// `false` while the tenant's modules are unknown and module gating is failing open.
    pub modules_known: bool,
    pub groups: Vec<NavGroupDto>,
    /// Path of the item to highlight for the requested location.
    pub active_path: Option<String>,
}

impl NavigationRes {
    pub fn new(
        role: &CanonicalRole,
        organization_id: Option<&OrganizationId>,
        modules_known: bool,
        navigation: &Navigation,
        location: Option<&str>,
    ) -> Self {
        let active_path = location.and_then(|raw| {
            navigation
                .active_item(&carenav_core::Location::parse(raw))
                .map(|item| item.path.clone())
        });

        Self {
            role: role.to_string(),
            organization_id: organization_id.map(OrganizationId::to_string),
            modules_known,
            groups: navigation.groups.iter().map(NavGroupDto::from).collect(),
            active_path,
        }
    }
}

/// Stateless navigation preview, for admin tooling and tests.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PreviewNavigationReq {
    pub role: String,
    /// Omit to preview with unknown modules (fail-open).
    #[serde(default)]
    pub modules: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigationQuery {
    /// Current browser location, used to pick the active item.
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrganizationDto {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub modules: Vec<String>,
}

impl From<&Organization> for OrganizationDto {
    fn from(organization: &Organization) -> Self {
        let kind = match organization.kind {
            carenav_core::OrganizationKind::Hospital => "hospital",
            carenav_core::OrganizationKind::Clinic => "clinic",
            carenav_core::OrganizationKind::Pharmacy => "pharmacy",
        };
        Self {
            id: organization.id.to_string(),
            name: organization.name.to_string(),
            kind: kind.into(),
            modules: organization.modules.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrganizationsRes {
    pub organizations: Vec<OrganizationDto>,
}
