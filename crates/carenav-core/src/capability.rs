//! Capability gate: can a role see a navigation item given the tenant's enabled modules?
//!
//! Two independent checks, both of which must pass:
//! - **module**: an item with required modules needs at least one of them enabled. If the
//!   tenant's modules are [`EnabledModules::Unknown`] the check passes, so core navigation does
//!   not disappear while module data is loading.
//! - **role**: an item with an allow-list needs the role to be listed, unless the role is
//!   `org_admin` or `administrator`.
//!
//! The gate never fails. Visibility here is a UI concern; the backend authorizes every call.

use crate::navigation::{NavItem, NavigationCatalog};
use crate::role::CanonicalRole;
use carenav_types::ModuleName;
use std::collections::BTreeSet;

/// A tenant's enabled modules, as far as the UI knows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EnabledModules {
    /// Not loaded yet, or the fetch failed.
    #[default]
    Unknown,
    Known(BTreeSet<ModuleName>),
}

impl EnabledModules {
    /// Builds a known set from raw names, skipping blank entries.
    pub fn from_names<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::Known(
            names
                .into_iter()
                .filter_map(|name| ModuleName::new(name).ok())
                .collect(),
        )
    }

    /// `true` if any of `required` is enabled, or if the module set is unknown.
    pub fn permits_any(&self, required: &[ModuleName]) -> bool {
        match self {
            Self::Unknown => true,
            Self::Known(enabled) => required.iter().any(|module| enabled.contains(module)),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// Whether `role` can see `item` given `modules`.
pub fn is_visible(item: &NavItem, role: &CanonicalRole, modules: &EnabledModules) -> bool {
    let module_eligible = item.required_modules.is_empty() || modules.permits_any(&item.required_modules);

    let role_eligible = item.allowed_roles.is_empty()
        || role.bypasses_allow_lists()
        || item.allowed_roles.contains(role);

    module_eligible && role_eligible
}

/// Page-level guard built on the same gate.
///
/// A path is accessible when some item with that path in the role's navigation passes the gate.
/// Paths that do not appear anywhere in the catalog are not navigation-controlled and are
/// accessible.
pub fn can_access(
    path: &str,
    role: &CanonicalRole,
    modules: &EnabledModules,
    catalog: &NavigationCatalog,
) -> bool {
    let mut candidates = catalog
        .base_tree(role)
        .iter()
        .flat_map(|group| group.items.iter())
        .filter(|item| item.path == path)
        .peekable();

    if candidates.peek().is_none() {
        return !catalog.contains_path(path);
    }

    candidates.any(|item| is_visible(item, role, modules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavItem;

    fn item_requiring(modules: &[&str]) -> NavItem {
        NavItem::new("/x", "X").with_modules(modules)
    }

    fn item_allowing(roles: &[CanonicalRole]) -> NavItem {
        NavItem::new("/x", "X").with_roles(roles)
    }

    #[test]
    fn unconstrained_item_is_visible_to_everyone() {
        let item = NavItem::new("/dashboard", "Dashboard");
        for role in [CanonicalRole::Patient, CanonicalRole::Other("janitor".into())] {
            assert!(is_visible(&item, &role, &EnabledModules::from_names(Vec::<&str>::new())));
        }
    }

    #[test]
    fn org_admin_bypasses_allow_list() {
        let item = item_allowing(&[CanonicalRole::SuperAdmin]);
        assert!(is_visible(&item, &CanonicalRole::OrgAdmin, &EnabledModules::Unknown));
        assert!(is_visible(&item, &CanonicalRole::Administrator, &EnabledModules::Unknown));
    }

    #[test]
    fn unlisted_role_is_rejected() {
        let item = item_allowing(&[CanonicalRole::Accountant]);
        assert!(!is_visible(&item, &CanonicalRole::Doctor, &EnabledModules::Unknown));
        assert!(is_visible(&item, &CanonicalRole::Accountant, &EnabledModules::Unknown));
    }

    #[test]
    fn super_admin_does_not_bypass_allow_lists() {
        let item = item_allowing(&[CanonicalRole::Accountant]);
        assert!(!is_visible(&item, &CanonicalRole::SuperAdmin, &EnabledModules::Unknown));
    }

    #[test]
    fn unknown_modules_fail_open() {
        let item = item_requiring(&["pharmacy"]);
        assert!(is_visible(&item, &CanonicalRole::Doctor, &EnabledModules::Unknown));
    }

    #[test]
    fn module_gate_requires_intersection() {
        let item = item_requiring(&["lab"]);
        let modules = EnabledModules::from_names(["pharmacy"]);
        assert!(!is_visible(&item, &CanonicalRole::Doctor, &modules));

        let item = item_requiring(&["lab", "pharmacy"]);
        assert!(is_visible(&item, &CanonicalRole::Doctor, &modules));
    }

    #[test]
    fn module_gate_applies_to_admins_too() {
        let item = item_requiring(&["lab"]);
        let modules = EnabledModules::from_names(Vec::<&str>::new());
        assert!(!is_visible(&item, &CanonicalRole::Administrator, &modules));
    }

    #[test]
    fn both_checks_must_pass() {
        let item = NavItem::new("/payments", "Payments")
            .with_modules(&["billing"])
            .with_roles(&[CanonicalRole::Accountant]);
        let billing = EnabledModules::from_names(["billing"]);
        let none = EnabledModules::from_names(["lab"]);

        assert!(is_visible(&item, &CanonicalRole::Accountant, &billing));
        assert!(!is_visible(&item, &CanonicalRole::Accountant, &none));
        assert!(!is_visible(&item, &CanonicalRole::Nurse, &billing));
    }

    #[test]
    fn module_names_compare_case_insensitively() {
        let item = item_requiring(&["Pharmacy"]);
        assert!(is_visible(
            &item,
            &CanonicalRole::Pharmacist,
            &EnabledModules::from_names(["PHARMACY"])
        ));
    }

    #[test]
    fn can_access_uses_role_tree() {
        let catalog = NavigationCatalog::builtin();
        let clinic = EnabledModules::from_names(["clinic", "pharmacy", "billing"]);

        assert!(can_access("/encounters", &CanonicalRole::Doctor, &clinic, &catalog));
        assert!(!can_access("/payments", &CanonicalRole::Doctor, &clinic, &catalog));
        assert!(can_access("/payments", &CanonicalRole::Accountant, &clinic, &catalog));
        assert!(can_access("/help", &CanonicalRole::Patient, &clinic, &catalog));
    }
}
