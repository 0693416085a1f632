//! Organization directory.
//!
//! The directory is the list of tenants an operator can act on, with each tenant's enabled
//! modules. It stands in for the backend's organization and tenant-configuration endpoints: the
//! REST surface lists it, super-administrator selections are validated against it, and it
//! implements [`ModuleSource`] for module fetches.
//!
//! Directory files are YAML:
//!
//! ```yaml
//! organizations:
//!   - id: org-7
//!     name: St Mary's Hospital
//!     kind: hospital
//!     modules: [clinic, lab, pharmacy, billing, inpatient]
//! ```

use crate::constants::DIRECTORY_KIND;
use crate::error::{NavError, NavResult};
use crate::tenant::ModuleSource;
use carenav_types::{ModuleName, NonEmptyText, OrganizationId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// What kind of site a tenant is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationKind {
    Hospital,
    Clinic,
    Pharmacy,
}

/// One tenant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: NonEmptyText,
    pub kind: OrganizationKind,
    #[serde(default)]
    pub modules: BTreeSet<ModuleName>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryWire {
    #[serde(default)]
    organizations: Vec<Organization>,
}

/// All tenants known to this deployment, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrganizationDirectory {
    organizations: Vec<Organization>,
}

impl OrganizationDirectory {
    /// # Errors
    ///
    /// Returns [`NavError::InvalidDirectory`] if two organizations share an id.
    pub fn new(organizations: Vec<Organization>) -> NavResult<Self> {
        let mut seen = HashSet::new();
        for organization in &organizations {
            if !seen.insert(&organization.id) {
                return Err(NavError::InvalidDirectory(format!(
                    "duplicate organization id '{}'",
                    organization.id
                )));
            }
        }
        Ok(Self { organizations })
    }

    /// Parses a directory from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Schema`] with the failing field path if the YAML does not match the
    /// directory schema, or [`NavError::InvalidDirectory`] for duplicate ids.
    pub fn from_yaml_str(yaml_text: &str) -> NavResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire = serde_path_to_error::deserialize::<_, DirectoryWire>(deserializer).map_err(
            |err| {
                let path = err.path().to_string();
                NavError::Schema {
                    kind: DIRECTORY_KIND,
                    path: if path.is_empty() { "<root>".into() } else { path },
                    message: err.into_inner().to_string(),
                }
            },
        )?;
        Self::new(wire.organizations)
    }

    /// # Errors
    ///
    /// Returns [`NavError::FileRead`] if the file cannot be read, or any error from
    /// [`OrganizationDirectory::from_yaml_str`].
    pub fn load(path: &Path) -> NavResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| NavError::FileRead {
            kind: DIRECTORY_KIND,
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_yaml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            organizations = directory.organizations.len(),
            "loaded organization directory"
        );
        Ok(directory)
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn ids(&self) -> impl Iterator<Item = &OrganizationId> {
        self.organizations.iter().map(|organization| &organization.id)
    }

    pub fn get(&self, id: &OrganizationId) -> Option<&Organization> {
        self.organizations
            .iter()
            .find(|organization| organization.id == *id)
    }

    /// # Errors
    ///
    /// Returns [`NavError::UnknownOrganization`] if `id` is not in the directory.
    pub fn require(&self, id: &OrganizationId) -> NavResult<&Organization> {
        self.get(id)
            .ok_or_else(|| NavError::UnknownOrganization(id.to_string()))
    }
}

impl ModuleSource for OrganizationDirectory {
    async fn fetch_enabled_modules(
        &self,
        organization_id: &OrganizationId,
    ) -> NavResult<BTreeSet<ModuleName>> {
        self.require(organization_id)
            .map(|organization| organization.modules.clone())
            .map_err(|err| NavError::ModuleFetch {
                organization: organization_id.to_string(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"organizations:
  - id: org-7
    name: St Mary's Hospital
    kind: hospital
    modules: [clinic, Lab, pharmacy]
  - id: org-9
    name: Riverside Pharmacy
    kind: pharmacy
    modules: [pharmacy]
"#;

    fn org(id: &str) -> OrganizationId {
        OrganizationId::new(id).unwrap()
    }

    #[test]
    fn parses_directory() {
        let directory = OrganizationDirectory::from_yaml_str(SAMPLE).expect("parse directory");
        assert_eq!(directory.organizations().len(), 2);

        let hospital = directory.require(&org("org-7")).unwrap();
        assert_eq!(hospital.kind, OrganizationKind::Hospital);
        assert!(hospital.modules.contains(&ModuleName::new("lab").unwrap()));
        assert_eq!(
            directory.ids().map(|id| id.as_str()).collect::<Vec<_>>(),
            vec!["org-7", "org-9"]
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let yaml = "organizations:\n  - {id: a, name: A, kind: clinic}\n  - {id: a, name: B, kind: clinic}\n";
        let err = OrganizationDirectory::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, NavError::InvalidDirectory(_)));
    }

    #[test]
    fn rejects_unknown_kind_with_path() {
        let yaml = "organizations:\n  - {id: a, name: A, kind: spa}\n";
        let err = OrganizationDirectory::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, NavError::Schema { ref path, .. } if path.starts_with("organizations[0]")));
    }

    #[test]
    fn unknown_organization_is_an_error() {
        let directory = OrganizationDirectory::default();
        assert!(matches!(
            directory.require(&org("org-1")),
            Err(NavError::UnknownOrganization(_))
        ));
    }

    #[tokio::test]
    async fn module_source_returns_enabled_modules() {
        let directory = OrganizationDirectory::from_yaml_str(SAMPLE).unwrap();
        let modules = directory
            .fetch_enabled_modules(&org("org-9"))
            .await
            .expect("known organization");
        assert_eq!(
            modules.iter().map(ModuleName::as_str).collect::<Vec<_>>(),
            vec!["pharmacy"]
        );

        let err = directory
            .fetch_enabled_modules(&org("org-0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NavError::ModuleFetch { ref organization, .. } if organization == "org-0"
        ));
    }

    #[test]
    fn shipped_example_directory_is_valid() {
        let yaml = include_str!("../../../config/organizations.example.yaml");
        let directory = OrganizationDirectory::from_yaml_str(yaml).expect("example directory");
        assert_eq!(directory.organizations().len(), 3);
        assert_eq!(directory.require(&org("org-21")).unwrap().kind, OrganizationKind::Pharmacy);
    }
}
