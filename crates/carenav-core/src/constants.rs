//! Constants used throughout the CareNav core crate.

/// Session storage key holding the organization a super-administrator chose to operate on.
pub const SELECTED_ORGANIZATION_KEY: &str = "selectedOrganizationId";

/// Session storage key holding the bearer token issued at login.
pub const AUTH_TOKEN_KEY: &str = "token";

/// Label used for catalog errors and log fields.
pub const CATALOG_KIND: &str = "navigation catalog";

/// Label used for organization directory errors and log fields.
pub const DIRECTORY_KIND: &str = "organization directory";

/// Idle lifetime of a server-side session when none is configured: eight hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
