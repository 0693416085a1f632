//! Role normalisation.
//!
//! Operators arrive with free-form role strings ("Senior Doctor", "lab_technician", "ROLE_SUPER_ADMIN").
//! Every navigation and capability decision is made on a [`CanonicalRole`] instead, derived by
//! [`normalize`]:
//!
//! 1. empty input is [`CanonicalRole::Unassigned`];
//! 2. the lower-cased role is matched exactly against the tenant-admin keys;
//! 3. otherwise the lower-cased role is tested for containment of each stem, in the fixed order
//!    doctor, nurse, accountant, receptionist, pharmacist, representative, lab, patient;
//! 4. otherwise the lower-cased role passes through as [`CanonicalRole::Other`].
//!
//! The function is total and idempotent over its own output: normalising a canonical key returns
//! the same role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalised role key used for all navigation and authorization decisions.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalRole {
    SuperAdmin,
    RoleSuperAdmin,
    OrgAdmin,
    Administrator,
    Doctor,
    Nurse,
    Accountant,
    Receptionist,
    Pharmacist,
    Representative,
    Lab,
    Patient,
    /// A lower-cased role that matched neither an admin key nor a stem.
    Other(String),
    /// No role at all. Resolves to no navigation.
    Unassigned,
}

use CanonicalRole::*;

/// Exact-match keys, checked before any stem.
const TENANT_ADMIN_ROLES: [CanonicalRole; 4] = [SuperAdmin, RoleSuperAdmin, OrgAdmin, Administrator];

/// Stem roles in check order.
const STEM_ORDER: [CanonicalRole; 8] = [
    Doctor,
    Nurse,
    Accountant,
    Receptionist,
    Pharmacist,
    Representative,
    Lab,
    Patient,
];

/// Maps a raw role string to its canonical role.
pub fn normalize(raw: &str) -> CanonicalRole {
    if raw.is_empty() {
        return Unassigned;
    }

    let lowered = raw.to_lowercase();

    if let Some(admin) = TENANT_ADMIN_ROLES
        .into_iter()
        .find(|role| role.as_str() == lowered)
    {
        return admin;
    }

    STEM_ORDER
        .into_iter()
        .find(|role| lowered.contains(role.as_str()))
        .unwrap_or(Other(lowered))
}

impl CanonicalRole {
    /// Stable key for this role. `normalize(role.as_str())` returns `role`.
    pub fn as_str(&self) -> &str {
        match self {
            SuperAdmin => "super_admin",
            RoleSuperAdmin => "role_super_admin",
            OrgAdmin => "org_admin",
            Administrator => "administrator",
            Doctor => "doctor",
            Nurse => "nurse",
            Accountant => "accountant",
            Receptionist => "receptionist",
            Pharmacist => "pharmacist",
            Representative => "representative",
            Lab => "lab",
            Patient => "patient",
            Other(key) => key,
            Unassigned => "",
        }
    }

    /// Human-readable label for role pickers and session banners.
    pub fn display_name(&self) -> &str {
        match self {
            SuperAdmin | RoleSuperAdmin => "Super Administrator",
            OrgAdmin => "Organization Administrator",
            Administrator => "Administrator",
            Doctor => "Doctor",
            Nurse => "Nurse",
            Accountant => "Accountant",
            Receptionist => "Receptionist",
            Pharmacist => "Pharmacist",
            Representative => "Representative",
            Lab => "Laboratory",
            Patient => "Patient",
            Other(key) => key,
            Unassigned => "Unassigned",
        }
    }

    /// Roles that always see the full navigation tree.
    pub fn is_tenant_admin_class(&self) -> bool {
        matches!(self, SuperAdmin | RoleSuperAdmin | OrgAdmin | Administrator)
    }

    /// Roles that bypass explicit item allow-lists.
    pub fn bypasses_allow_lists(&self) -> bool {
        matches!(self, OrgAdmin | Administrator)
    }

    /// Roles that act across tenants and may switch the selected organization.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, SuperAdmin | RoleSuperAdmin)
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CanonicalRole {
    fn from(raw: &str) -> Self {
        normalize(raw)
    }
}

impl Serialize for CanonicalRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ROLES: &[&str] = &[
        "",
        "administrator",
        "Administrator",
        "ORG_ADMIN",
        "super_admin",
        "role_super_admin",
        "Senior Doctor",
        "staff_nurse",
        "chief accountant",
        "receptionist",
        "Pharmacist",
        "medical_representative",
        "laboratory",
        "lab_technician_patient_liaison",
        "patient",
        "janitor",
        "Visiting Consultant",
    ];

    #[test]
    fn empty_role_is_unassigned() {
        assert_eq!(normalize(""), Unassigned);
        assert_eq!(Unassigned.as_str(), "");
    }

    #[test]
    fn tenant_admin_keys_match_exactly_after_lowercasing() {
        assert_eq!(normalize("Administrator"), Administrator);
        assert_eq!(normalize("ORG_ADMIN"), OrgAdmin);
        assert_eq!(normalize("super_admin"), SuperAdmin);
        assert_eq!(normalize("role_super_admin"), RoleSuperAdmin);
    }

    #[test]
    fn admin_substring_is_not_an_admin() {
        assert_eq!(
            normalize("administrator_assistant"),
            Other("administrator_assistant".into())
        );
    }

    #[test]
    fn stems_match_by_containment() {
        assert_eq!(normalize("Senior Doctor"), Doctor);
        assert_eq!(normalize("staff_nurse"), Nurse);
        assert_eq!(normalize("laboratory"), Lab);
        assert_eq!(normalize("lab_assistant"), Lab);
        assert_eq!(normalize("medical_representative"), Representative);
    }

    #[test]
    fn stem_order_breaks_ties() {
        assert_eq!(normalize("patient_representative"), Representative);
        assert_eq!(normalize("lab_technician_patient_liaison"), Lab);
        assert_eq!(normalize("nurse_doctor"), Doctor);
    }

    #[test]
    fn unknown_roles_pass_through_lowercased() {
        assert_eq!(normalize("Janitor"), Other("janitor".into()));
        assert_eq!(normalize("Janitor").as_str(), "janitor");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in SAMPLE_ROLES {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {raw:?}");
        }
    }

    #[test]
    fn only_org_admin_and_administrator_bypass_allow_lists() {
        assert!(OrgAdmin.bypasses_allow_lists());
        assert!(Administrator.bypasses_allow_lists());
        assert!(!SuperAdmin.bypasses_allow_lists());
        assert!(!Doctor.bypasses_allow_lists());
    }

    #[test]
    fn serde_uses_canonical_key() {
        let json = serde_json::to_string(&Pharmacist).unwrap();
        assert_eq!(json, "\"pharmacist\"");
        let parsed: CanonicalRole = serde_json::from_str("\"Head Pharmacist\"").unwrap();
        assert_eq!(parsed, Pharmacist);
    }
}
