//! # CareNav Core
//!
//! Navigation and tenant-context policy for the hospital/clinic/pharmacy management UI.
//!
//! This crate decides what an operator sees in the sidebar:
//! - role normalisation ([`role`])
//! - session state and organization selection ([`session`])
//! - effective-tenant resolution and module-list fencing ([`tenant`])
//! - the capability gate ([`capability`])
//! - the navigation catalog and policy engine ([`navigation`])
//!
//! The policy functions are pure and total. Errors only come from the plumbing around them:
//! loading configuration, catalogs and the organization directory, and mutating a session.
//!
//! **No API concerns**: HTTP servers and request/response shapes belong in `api-rest` and
//! `api-shared`.

pub mod capability;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod navigation;
pub mod role;
pub mod session;
pub mod tenant;

pub use capability::{can_access, is_visible, EnabledModules};
pub use carenav_types::{ModuleName, NonEmptyText, OrganizationId, TextError};
pub use config::{CatalogSource, CoreConfig};
pub use directory::{Organization, OrganizationDirectory, OrganizationKind};
pub use error::{NavError, NavResult};
pub use navigation::{build_navigation, Location, NavGroup, NavItem, Navigation, NavigationCatalog};
pub use role::{normalize, CanonicalRole};
pub use session::{Identity, MemorySessionStore, SessionContext, SessionKeys, SessionSelection, SessionStore};
pub use tenant::{
    effective_organization, FetchTicket, ModuleFetchFence, ModuleSource, TenantContext, TenantSource,
};

use std::sync::Arc;

/// Catalog and organization directory loaded at startup, shared by request handlers.
#[derive(Clone, Debug, Default)]
pub struct NavigationService {
    catalog: Arc<NavigationCatalog>,
    directory: Arc<OrganizationDirectory>,
}

impl NavigationService {
    pub fn new(catalog: NavigationCatalog, directory: OrganizationDirectory) -> Self {
        Self {
            catalog: Arc::new(catalog),
            directory: Arc::new(directory),
        }
    }

    /// Loads the catalog and directory named by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`CoreConfig::load_catalog`] or [`CoreConfig::load_directory`].
    pub fn from_config(cfg: &CoreConfig) -> NavResult<Self> {
        Ok(Self::new(cfg.load_catalog()?, cfg.load_directory()?))
    }

    pub fn catalog(&self) -> &NavigationCatalog {
        &self.catalog
    }

    pub fn directory(&self) -> &OrganizationDirectory {
        &self.directory
    }

    /// Navigation for a raw role string and a tenant's modules.
    pub fn navigation_for(&self, raw_role: &str, modules: &EnabledModules) -> Navigation {
        self.catalog.build_navigation(&normalize(raw_role), modules)
    }
}
