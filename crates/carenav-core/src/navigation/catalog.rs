//! Navigation catalog: the full tree plus role portals.
//!
//! The built-in catalog covers every product area. Deployments can replace it with a YAML file
//! of the same shape:
//!
//! ```yaml
//! full:
//!   - label: Overview
//!     items:
//!       - path: /dashboard
//!         label: Dashboard
//!         icon: home
//! portals:
//!   doctor:
//!     - label: Clinical
//!       items:
//!         - path: /encounters
//!           label: Encounters
//!           required_modules: [clinic]
//! ```
//!
//! Unknown keys are rejected. Portal keys and allow-list entries go through role normalisation,
//! so `Doctor` and `doctor` name the same portal.

use super::{NavGroup, NavItem};
use crate::constants::CATALOG_KIND;
use crate::error::{NavError, NavResult};
use crate::role::{normalize, CanonicalRole};
use carenav_types::ModuleName;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Full navigation tree and per-role portals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationCatalog {
    full: Vec<NavGroup>,
    portals: BTreeMap<CanonicalRole, Vec<NavGroup>>,
}

impl NavigationCatalog {
    /// Creates a validated catalog.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidCatalog`] if:
    /// - a group label or item label is blank,
    /// - an item path does not start with `/`,
    /// - a path appears twice within one tree,
    /// - a portal is registered for a tenant-admin role or the unassigned role.
    pub fn new(
        full: Vec<NavGroup>,
        portals: BTreeMap<CanonicalRole, Vec<NavGroup>>,
    ) -> NavResult<Self> {
        validate_tree("full tree", &full)?;
        for (role, tree) in &portals {
            if role.is_tenant_admin_class() || *role == CanonicalRole::Unassigned {
                return Err(NavError::InvalidCatalog(format!(
                    "portal registered for role '{role}', which always uses the full tree"
                )));
            }
            validate_tree(&format!("portal '{role}'"), tree)?;
        }

        Ok(Self { full, portals })
    }

    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Schema`] with the failing field path if the YAML does not match the
    /// catalog schema, or any error from [`NavigationCatalog::new`].
    pub fn from_yaml_str(yaml_text: &str) -> NavResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire = match serde_path_to_error::deserialize::<_, CatalogWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>".to_owned()
                } else {
                    path
                };
                return Err(NavError::Schema {
                    kind: CATALOG_KIND,
                    path,
                    message: source.to_string(),
                });
            }
        };

        wire_to_domain(wire)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::FileRead`] if the file cannot be read, or any error from
    /// [`NavigationCatalog::from_yaml_str`].
    pub fn load(path: &Path) -> NavResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| NavError::FileRead {
            kind: CATALOG_KIND,
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            portals = catalog.portals.len(),
            "loaded navigation catalog"
        );
        Ok(catalog)
    }

    pub fn full_tree(&self) -> &[NavGroup] {
        &self.full
    }

    pub fn portal(&self, role: &CanonicalRole) -> Option<&[NavGroup]> {
        self.portals.get(role).map(Vec::as_slice)
    }

    pub fn portal_roles(&self) -> impl Iterator<Item = &CanonicalRole> {
        self.portals.keys()
    }

    /// The unfiltered tree for `role`.
    pub fn base_tree(&self, role: &CanonicalRole) -> &[NavGroup] {
        if *role == CanonicalRole::Unassigned {
            return &[];
        }
        if role.is_tenant_admin_class() {
            return &self.full;
        }
        match self.portal(role) {
            Some(portal) => portal,
            None => {
                tracing::debug!(%role, "no portal registered; using full navigation tree");
                &self.full
            }
        }
    }

    /// Whether any tree in the catalog links to exactly `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        std::iter::once(&self.full)
            .chain(self.portals.values())
            .flat_map(|tree| tree.iter())
            .flat_map(|group| group.items.iter())
            .any(|item| item.path == path)
    }

    /// The catalog shipped with CareNav.
    pub fn builtin() -> Self {
        use CanonicalRole::*;

        let dashboard = || NavItem::new("/dashboard", "Dashboard").with_icon("home");
        let super_admins = [SuperAdmin, RoleSuperAdmin];

        let full = vec![
            NavGroup::new("Overview", vec![dashboard()]),
            NavGroup::new(
                "Patients",
                vec![
                    NavItem::new("/patients", "Patients").with_icon("users"),
                    NavItem::new("/encounters", "Encounters")
                        .with_icon("stethoscope")
                        .with_modules(&["clinic"]),
                    NavItem::new("/appointments", "Appointments")
                        .with_icon("calendar")
                        .with_modules(&["clinic", "scheduling"]),
                ],
            ),
            NavGroup::new(
                "Clinical Services",
                vec![
                    NavItem::new("/lab/orders", "Lab Orders")
                        .with_icon("flask")
                        .with_modules(&["lab"]),
                    NavItem::new("/lab/results", "Lab Results")
                        .with_icon("clipboard")
                        .with_modules(&["lab"]),
                    NavItem::new("/pharmacy/inventory", "Pharmacy Inventory")
                        .with_icon("pill")
                        .with_modules(&["pharmacy"]),
                    NavItem::new("/pharmacy/dispense", "Dispensing")
                        .with_icon("package")
                        .with_modules(&["pharmacy"]),
                ],
            ),
            NavGroup::new(
                "Inpatient",
                vec![
                    NavItem::new("/beds", "Bed Management")
                        .with_icon("bed")
                        .with_modules(&["inpatient"]),
                    NavItem::new("/admissions", "Admissions")
                        .with_icon("log-in")
                        .with_modules(&["inpatient"]),
                ],
            ),
            NavGroup::new(
                "Finance",
                vec![
                    NavItem::new("/billing", "Billing")
                        .with_icon("receipt")
                        .with_modules(&["billing"]),
                    NavItem::new("/billing?tab=invoices", "Invoices")
                        .with_icon("file-text")
                        .with_modules(&["billing"]),
                    NavItem::new("/payments", "Payments")
                        .with_icon("credit-card")
                        .with_modules(&["billing"])
                        .with_roles(&[Accountant]),
                    NavItem::new("/reports/financial", "Financial Reports")
                        .with_icon("bar-chart")
                        .with_roles(&[Accountant]),
                ],
            ),
            NavGroup::new(
                "Administration",
                vec![
                    NavItem::new("/staff", "Staff")
                        .with_icon("id-card")
                        .with_roles(&super_admins),
                    NavItem::new("/organizations", "Organizations")
                        .with_icon("building")
                        .with_roles(&super_admins),
                    NavItem::new("/settings/modules", "Modules")
                        .with_icon("puzzle")
                        .with_roles(&super_admins),
                    NavItem::new("/settings", "Settings").with_icon("settings"),
                ],
            ),
        ];

        let mut portals = BTreeMap::new();
        portals.insert(
            Doctor,
            vec![
                NavGroup::new(
                    "Clinical",
                    vec![
                        dashboard(),
                        NavItem::new("/patients", "My Patients").with_icon("users"),
                        NavItem::new("/encounters", "Encounters")
                            .with_icon("stethoscope")
                            .with_modules(&["clinic"]),
                        NavItem::new("/appointments", "Appointments")
                            .with_icon("calendar")
                            .with_modules(&["clinic", "scheduling"]),
                    ],
                ),
                NavGroup::new(
                    "Orders",
                    vec![
                        NavItem::new("/lab/orders", "Lab Orders")
                            .with_icon("flask")
                            .with_modules(&["lab"]),
                        NavItem::new("/prescriptions", "Prescriptions")
                            .with_icon("pill")
                            .with_modules(&["pharmacy"]),
                    ],
                ),
            ],
        );
        portals.insert(
            Nurse,
            vec![
                NavGroup::new(
                    "Ward",
                    vec![
                        dashboard(),
                        NavItem::new("/patients", "Patients").with_icon("users"),
                        NavItem::new("/vitals", "Vitals")
                            .with_icon("activity")
                            .with_modules(&["clinic"]),
                        NavItem::new("/beds", "Bed Management")
                            .with_icon("bed")
                            .with_modules(&["inpatient"]),
                    ],
                ),
                NavGroup::new(
                    "Orders",
                    vec![
                        NavItem::new("/lab/results", "Lab Results")
                            .with_icon("clipboard")
                            .with_modules(&["lab"]),
                        NavItem::new("/pharmacy/administration", "Medication Administration")
                            .with_icon("pill")
                            .with_modules(&["pharmacy"]),
                    ],
                ),
            ],
        );
        portals.insert(
            Accountant,
            vec![NavGroup::new(
                "Finance",
                vec![
                    dashboard(),
                    NavItem::new("/billing", "Billing")
                        .with_icon("receipt")
                        .with_modules(&["billing"]),
                    NavItem::new("/billing?tab=invoices", "Invoices")
                        .with_icon("file-text")
                        .with_modules(&["billing"]),
                    NavItem::new("/payments", "Payments")
                        .with_icon("credit-card")
                        .with_modules(&["billing"])
                        .with_roles(&[Accountant]),
                    NavItem::new("/reports/financial", "Financial Reports")
                        .with_icon("bar-chart")
                        .with_roles(&[Accountant]),
                ],
            )],
        );
        portals.insert(
            Receptionist,
            vec![NavGroup::new(
                "Front Desk",
                vec![
                    dashboard(),
                    NavItem::new("/patients/register", "Patient Registration")
                        .with_icon("user-plus"),
                    NavItem::new("/appointments", "Appointments")
                        .with_icon("calendar")
                        .with_modules(&["clinic", "scheduling"]),
                    NavItem::new("/beds", "Bed Availability")
                        .with_icon("bed")
                        .with_modules(&["inpatient"]),
                    NavItem::new("/billing", "Billing")
                        .with_icon("receipt")
                        .with_modules(&["billing"]),
                ],
            )],
        );
        portals.insert(
            Pharmacist,
            vec![NavGroup::new(
                "Pharmacy",
                vec![
                    dashboard(),
                    NavItem::new("/pharmacy/inventory", "Inventory")
                        .with_icon("pill")
                        .with_modules(&["pharmacy"]),
                    NavItem::new("/pharmacy/dispense", "Dispensing")
                        .with_icon("package")
                        .with_modules(&["pharmacy"]),
                    NavItem::new("/prescriptions", "Prescriptions")
                        .with_icon("file-text")
                        .with_modules(&["pharmacy"]),
                ],
            )],
        );
        portals.insert(
            Representative,
            vec![NavGroup::new(
                "Sales",
                vec![
                    dashboard(),
                    NavItem::new("/pharmacy/catalogue", "Product Catalogue")
                        .with_icon("book")
                        .with_modules(&["pharmacy"]),
                    NavItem::new("/pharmacy/orders", "Orders")
                        .with_icon("shopping-cart")
                        .with_modules(&["pharmacy"]),
                ],
            )],
        );
        portals.insert(
            Lab,
            vec![NavGroup::new(
                "Laboratory",
                vec![
                    dashboard(),
                    NavItem::new("/lab/orders", "Lab Orders")
                        .with_icon("flask")
                        .with_modules(&["lab"]),
                    NavItem::new("/lab/samples", "Samples")
                        .with_icon("droplet")
                        .with_modules(&["lab"]),
                    NavItem::new("/lab/results", "Lab Results")
                        .with_icon("clipboard")
                        .with_modules(&["lab"]),
                ],
            )],
        );
        portals.insert(
            Patient,
            vec![NavGroup::new(
                "My Health",
                vec![
                    NavItem::new("/portal/appointments", "My Appointments").with_icon("calendar"),
                    NavItem::new("/portal/results", "My Results")
                        .with_icon("clipboard")
                        .with_modules(&["lab"]),
                    NavItem::new("/portal/bills", "My Bills")
                        .with_icon("receipt")
                        .with_modules(&["billing"]),
                    NavItem::new("/portal/profile", "Profile").with_icon("user"),
                ],
            )],
        );

        Self { full, portals }
    }
}

impl Default for NavigationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_tree(name: &str, tree: &[NavGroup]) -> NavResult<()> {
    let mut seen = HashSet::new();
    for group in tree {
        if group.label.trim().is_empty() {
            return Err(NavError::InvalidCatalog(format!(
                "{name}: group label cannot be empty"
            )));
        }
        for item in &group.items {
            if !item.path.starts_with('/') {
                return Err(NavError::InvalidCatalog(format!(
                    "{name}: path '{}' must start with '/'",
                    item.path
                )));
            }
            if item.label.trim().is_empty() {
                return Err(NavError::InvalidCatalog(format!(
                    "{name}: item '{}' has an empty label",
                    item.path
                )));
            }
            if !seen.insert(item.path.as_str()) {
                return Err(NavError::InvalidCatalog(format!(
                    "{name}: duplicate path '{}'",
                    item.path
                )));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogWire {
    full: Vec<GroupWire>,
    #[serde(default)]
    portals: BTreeMap<String, Vec<GroupWire>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupWire {
    label: String,
    #[serde(default)]
    items: Vec<ItemWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemWire {
    path: String,
    label: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    required_modules: Vec<ModuleName>,
    #[serde(default)]
    allowed_roles: Vec<String>,
}

fn wire_to_domain(wire: CatalogWire) -> NavResult<NavigationCatalog> {
    let full = wire.full.into_iter().map(group_from_wire).collect();

    let mut portals = BTreeMap::new();
    for (raw_role, groups) in wire.portals {
        let role = normalize(&raw_role);
        let tree = groups.into_iter().map(group_from_wire).collect();
        if portals.insert(role.clone(), tree).is_some() {
            return Err(NavError::InvalidCatalog(format!(
                "portal key '{raw_role}' duplicates an earlier portal for role '{role}'"
            )));
        }
    }

    NavigationCatalog::new(full, portals)
}

fn group_from_wire(wire: GroupWire) -> NavGroup {
    NavGroup {
        label: wire.label,
        items: wire
            .items
            .into_iter()
            .map(|item| NavItem {
                path: item.path,
                label: item.label,
                icon: item.icon,
                required_modules: item.required_modules,
                allowed_roles: item.allowed_roles.iter().map(|raw| normalize(raw)).collect(),
            })
            .collect(),
    }
}
