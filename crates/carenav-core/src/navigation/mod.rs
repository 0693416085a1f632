//! Navigation policy engine.
//!
//! [`NavigationCatalog::build_navigation`] turns a canonical role and the tenant's enabled
//! modules into the grouped sidebar:
//!
//! 1. pick the base tree: the full tree for tenant-admin roles, otherwise the role's portal,
//!    otherwise the full tree; an unassigned role gets no tree;
//! 2. keep the items that pass [`crate::capability::is_visible`] and drop groups left empty;
//! 3. keep catalog order for groups and items.
//!
//! The result depends only on its inputs, so identical inputs always give equal output.

pub mod catalog;
pub mod location;

pub use catalog::NavigationCatalog;
pub use location::Location;

use crate::capability::{is_visible, EnabledModules};
use crate::role::CanonicalRole;
use carenav_types::ModuleName;
use serde::Serialize;
use std::sync::OnceLock;

/// One link in the sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Destination, optionally with `?query` and `#hash`.
    pub path: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Visible only if at least one of these is enabled. Empty means no module constraint.
    pub required_modules: Vec<ModuleName>,
    /// Visible only to these roles (admins excepted). Empty means no role constraint.
    pub allowed_roles: Vec<CanonicalRole>,
}

impl NavItem {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            icon: None,
            required_modules: Vec::new(),
            allowed_roles: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Blank module names are ignored.
    pub fn with_modules(mut self, modules: &[&str]) -> Self {
        self.required_modules = modules
            .iter()
            .filter_map(|module| ModuleName::new(module).ok())
            .collect();
        self
    }

    pub fn with_roles(mut self, roles: &[CanonicalRole]) -> Self {
        self.allowed_roles = roles.to_vec();
        self
    }

    /// Whether this item is the link for `location`.
    pub fn is_active(&self, location: &Location) -> bool {
        Location::parse(&self.path).matches_target(location)
    }
}

/// A titled section of the sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    pub label: String,
    pub items: Vec<NavItem>,
}

impl NavGroup {
    pub fn new(label: impl Into<String>, items: Vec<NavItem>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }
}

/// The filtered sidebar for one role and tenant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub groups: Vec<NavGroup>,
}

impl Navigation {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.groups.iter().flat_map(|group| group.items.iter())
    }

    /// The item to highlight for `location`.
    ///
    /// When several items match (for example `/billing` and `/billing?tab=invoices`) the one
    /// that constrains more of the location wins; ties go to the first in display order.
    pub fn active_item(&self, location: &Location) -> Option<&NavItem> {
        let mut best: Option<(&NavItem, usize)> = None;
        for item in self.items() {
            let target = Location::parse(&item.path);
            if !target.matches_target(location) {
                continue;
            }
            let specificity = target.specificity();
            if best.map_or(true, |(_, current)| specificity > current) {
                best = Some((item, specificity));
            }
        }
        best.map(|(item, _)| item)
    }
}

impl NavigationCatalog {
    /// Builds the navigation `role` sees when the tenant has `modules` enabled.
    pub fn build_navigation(&self, role: &CanonicalRole, modules: &EnabledModules) -> Navigation {
        let groups = self
            .base_tree(role)
            .iter()
            .filter_map(|group| {
                let items: Vec<NavItem> = group
                    .items
                    .iter()
                    .filter(|item| is_visible(item, role, modules))
                    .cloned()
                    .collect();
                if items.is_empty() {
                    None
                } else {
                    Some(NavGroup {
                        label: group.label.clone(),
                        items,
                    })
                }
            })
            .collect();

        Navigation { groups }
    }
}

/// Builds navigation against the built-in catalog.
pub fn build_navigation(role: &CanonicalRole, modules: &EnabledModules) -> Navigation {
    static BUILTIN: OnceLock<NavigationCatalog> = OnceLock::new();
    BUILTIN
        .get_or_init(NavigationCatalog::builtin)
        .build_navigation(role, modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn paths(nav: &Navigation) -> Vec<&str> {
        nav.items().map(|item| item.path.as_str()).collect()
    }

    fn labels(nav: &Navigation) -> Vec<&str> {
        nav.groups.iter().map(|group| group.label.as_str()).collect()
    }

    #[test]
    fn group_whose_only_item_fails_is_dropped() {
        let catalog = NavigationCatalog::new(
            vec![
                NavGroup::new("Overview", vec![NavItem::new("/dashboard", "Dashboard")]),
                NavGroup::new(
                    "Laboratory",
                    vec![NavItem::new("/lab/orders", "Lab Orders").with_modules(&["lab"])],
                ),
            ],
            BTreeMap::new(),
        )
        .unwrap();

        let nav = catalog.build_navigation(
            &CanonicalRole::Administrator,
            &EnabledModules::from_names(["pharmacy"]),
        );
        assert_eq!(labels(&nav), vec!["Overview"]);
    }

    #[test]
    fn build_is_deterministic() {
        let modules = EnabledModules::from_names(["clinic"]);
        let first = build_navigation(&CanonicalRole::Doctor, &modules);
        let second = build_navigation(&CanonicalRole::Doctor, &modules);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn administrator_without_modules_keeps_role_gated_items() {
        let nav = build_navigation(
            &CanonicalRole::Administrator,
            &EnabledModules::from_names(Vec::<&str>::new()),
        );

        let visible = paths(&nav);
        // Role-gated, module-free items stay thanks to the admin bypass.
        assert!(visible.contains(&"/reports/financial"));
        assert!(visible.contains(&"/organizations"));
        assert!(visible.contains(&"/staff"));
        // Module-gated items disappear.
        assert!(!visible.contains(&"/lab/orders"));
        assert!(!visible.contains(&"/pharmacy/inventory"));
        assert!(!visible.contains(&"/billing"));
        assert!(!labels(&nav).contains(&"Clinical Services"));
        assert!(!labels(&nav).contains(&"Inpatient"));
    }

    #[test]
    fn administrator_with_unknown_modules_sees_full_tree() {
        let catalog = NavigationCatalog::builtin();
        let nav = catalog.build_navigation(&CanonicalRole::Administrator, &EnabledModules::Unknown);
        assert_eq!(nav.groups, catalog.full_tree());
    }

    #[test]
    fn doctor_gets_portal_without_pharmacy_only_items() {
        let catalog = NavigationCatalog::builtin();
        let nav = build_navigation(&CanonicalRole::Doctor, &EnabledModules::from_names(["clinic"]));

        let visible = paths(&nav);
        assert!(visible.contains(&"/dashboard"));
        assert!(visible.contains(&"/patients"));
        assert!(visible.contains(&"/encounters"));
        assert!(!visible.contains(&"/prescriptions"));
        assert!(!visible.contains(&"/lab/orders"));
        assert!(!visible.contains(&"/staff"));

        let portal_paths: Vec<&str> = catalog
            .base_tree(&CanonicalRole::Doctor)
            .iter()
            .flat_map(|group| group.items.iter().map(|item| item.path.as_str()))
            .collect();
        assert!(visible.iter().all(|path| portal_paths.contains(path)));
    }

    #[test]
    fn filtering_preserves_catalog_order() {
        let nav = build_navigation(&CanonicalRole::Nurse, &EnabledModules::Unknown);
        let catalog = NavigationCatalog::builtin();
        let expected: Vec<&str> = catalog
            .base_tree(&CanonicalRole::Nurse)
            .iter()
            .flat_map(|group| group.items.iter().map(|item| item.path.as_str()))
            .collect();
        assert_eq!(paths(&nav), expected);
    }

    #[test]
    fn unassigned_role_gets_no_navigation() {
        let nav = build_navigation(&CanonicalRole::Unassigned, &EnabledModules::Unknown);
        assert!(nav.is_empty());
    }

    #[test]
    fn unknown_role_falls_back_to_full_tree() {
        let catalog = NavigationCatalog::builtin();
        let role = CanonicalRole::Other("janitor".into());
        assert_eq!(catalog.base_tree(&role), catalog.full_tree());

        let nav = catalog.build_navigation(&role, &EnabledModules::Unknown);
        // Allow-listed items are still filtered for a non-admin role.
        assert!(!paths(&nav).contains(&"/organizations"));
        assert!(paths(&nav).contains(&"/dashboard"));
    }

    #[test]
    fn empty_portal_renders_no_sidebar() {
        let mut portals = BTreeMap::new();
        portals.insert(CanonicalRole::Patient, Vec::new());
        let catalog = NavigationCatalog::new(
            vec![NavGroup::new("Overview", vec![NavItem::new("/dashboard", "Dashboard")])],
            portals,
        )
        .unwrap();

        let nav = catalog.build_navigation(&CanonicalRole::Patient, &EnabledModules::Unknown);
        assert!(nav.is_empty());
    }

    #[test]
    fn active_item_prefers_more_specific_match() {
        let nav = build_navigation(&CanonicalRole::Accountant, &EnabledModules::Unknown);

        let active = nav
            .active_item(&Location::parse("/billing?tab=invoices"))
            .expect("invoices link");
        assert_eq!(active.path, "/billing?tab=invoices");

        let active = nav
            .active_item(&Location::parse("/billing/"))
            .expect("billing link");
        assert_eq!(active.path, "/billing");

        assert!(nav.active_item(&Location::parse("/nowhere")).is_none());
    }

    #[test]
    fn item_is_active_for_matching_location() {
        let item = NavItem::new("/settings#modules", "Modules");
        assert!(item.is_active(&Location::parse("/settings/#modules")));
        assert!(!item.is_active(&Location::parse("/settings")));
    }

    #[test]
    fn serialises_with_canonical_keys() {
        let item = NavItem::new("/lab/orders", "Lab Orders")
            .with_icon("flask")
            .with_modules(&["lab"])
            .with_roles(&[CanonicalRole::Doctor]);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["required_modules"][0], "lab");
        assert_eq!(json["allowed_roles"][0], "doctor");
        assert_eq!(json["icon"], "flask");
    }
}
