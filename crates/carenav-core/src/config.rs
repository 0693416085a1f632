//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the services that need it.
//! Binaries read environment variables and hand the raw values to
//! [`CoreConfig::from_env_values`]; nothing in this crate reads the environment while serving a
//! request.

use crate::constants::DEFAULT_SESSION_TTL_SECS;
use crate::directory::OrganizationDirectory;
use crate::error::{NavError, NavResult};
use crate::navigation::NavigationCatalog;
use crate::session::SessionKeys;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the navigation catalog comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    catalog_source: CatalogSource,
    organizations_file: Option<PathBuf>,
    session_keys: SessionKeys,
    session_ttl: Duration,
}

impl CoreConfig {
    /// # Errors
    ///
    /// Returns [`NavError::InvalidInput`] if either session key is blank or both keys are the
    /// same, since logout relies on them being distinct entries.
    pub fn new(
        catalog_source: CatalogSource,
        organizations_file: Option<PathBuf>,
        session_keys: SessionKeys,
    ) -> NavResult<Self> {
        if session_keys.selected_organization.trim().is_empty()
            || session_keys.auth_token.trim().is_empty()
        {
            return Err(NavError::InvalidInput(
                "session storage keys cannot be empty".into(),
            ));
        }
        if session_keys.selected_organization == session_keys.auth_token {
            return Err(NavError::InvalidInput(
                "selection and auth token must use different session keys".into(),
            ));
        }

        Ok(Self {
            catalog_source,
            organizations_file,
            session_keys,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        })
    }

    /// Sets how long a session may sit idle before the server forgets it.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidInput`] if `ttl` is zero.
    pub fn with_session_ttl(mut self, ttl: Duration) -> NavResult<Self> {
        if ttl.is_zero() {
            return Err(NavError::InvalidInput(
                "session TTL must be greater than zero".into(),
            ));
        }
        self.session_ttl = ttl;
        Ok(self)
    }

    /// Builds configuration from raw environment values. Missing or blank values fall back to
    /// defaults: the built-in catalog, an empty directory, the default session keys and an
    /// eight-hour session TTL.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidInput`] if the TTL is not a positive whole number of seconds,
    /// or any error from [`CoreConfig::new`].
    pub fn from_env_values(
        catalog_file: Option<String>,
        organizations_file: Option<String>,
        selection_key: Option<String>,
        session_ttl_secs: Option<String>,
    ) -> NavResult<Self> {
        let catalog_source = non_blank(catalog_file)
            .map(|path| CatalogSource::File(PathBuf::from(path)))
            .unwrap_or(CatalogSource::Builtin);
        let organizations_file = non_blank(organizations_file).map(PathBuf::from);

        let mut session_keys = SessionKeys::default();
        if let Some(key) = non_blank(selection_key) {
            session_keys.selected_organization = key;
        }

        let cfg = Self::new(catalog_source, organizations_file, session_keys)?;
        match non_blank(session_ttl_secs) {
            Some(raw) => cfg.with_session_ttl(session_ttl_from_env_value(&raw)?),
            None => Ok(cfg),
        }
    }

    pub fn catalog_source(&self) -> &CatalogSource {
        &self.catalog_source
    }

    pub fn organizations_file(&self) -> Option<&Path> {
        self.organizations_file.as_deref()
    }

    pub fn session_keys(&self) -> &SessionKeys {
        &self.session_keys
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// # Errors
    ///
    /// Returns any error from [`NavigationCatalog::load`].
    pub fn load_catalog(&self) -> NavResult<NavigationCatalog> {
        match &self.catalog_source {
            CatalogSource::Builtin => Ok(NavigationCatalog::builtin()),
            CatalogSource::File(path) => NavigationCatalog::load(path),
        }
    }

    /// Loads the directory, or an empty one if no file is configured.
    ///
    /// # Errors
    ///
    /// Returns any error from [`OrganizationDirectory::load`].
    pub fn load_directory(&self) -> NavResult<OrganizationDirectory> {
        match &self.organizations_file {
            Some(path) => OrganizationDirectory::load(path),
            None => {
                tracing::warn!("no organization directory configured; tenant list is empty");
                Ok(OrganizationDirectory::default())
            }
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            catalog_source: CatalogSource::Builtin,
            organizations_file: None,
            session_keys: SessionKeys::default(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

/// Parses a session TTL given in whole seconds.
fn session_ttl_from_env_value(raw: &str) -> NavResult<Duration> {
    raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
        NavError::InvalidInput(format!(
            "session TTL must be a whole number of seconds, got '{raw}'"
        ))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SELECTED_ORGANIZATION_KEY;
    use std::io::Write;

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = CoreConfig::from_env_values(None, Some("  ".into()), None, None).unwrap();
        assert_eq!(cfg.catalog_source(), &CatalogSource::Builtin);
        assert_eq!(cfg.organizations_file(), None);
        assert_eq!(
            cfg.session_keys().selected_organization,
            SELECTED_ORGANIZATION_KEY
        );
        assert_eq!(
            cfg.session_ttl(),
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS)
        );
    }

    #[test]
    fn session_ttl_is_read_in_seconds() {
        let cfg = CoreConfig::from_env_values(None, None, None, Some(" 900 ".into())).unwrap();
        assert_eq!(cfg.session_ttl(), Duration::from_secs(900));
    }

    #[test]
    fn rejects_zero_or_malformed_session_ttl() {
        for raw in ["0", "-5", "15m"] {
            let err = CoreConfig::from_env_values(None, None, None, Some(raw.into())).unwrap_err();
            assert!(matches!(err, NavError::InvalidInput(_)), "{raw}");
        }
    }

    #[test]
    fn custom_selection_key_is_used() {
        let cfg = CoreConfig::from_env_values(None, None, Some("tenant".into()), None).unwrap();
        assert_eq!(cfg.session_keys().selected_organization, "tenant");
    }

    #[test]
    fn rejects_selection_key_equal_to_token_key() {
        let err = CoreConfig::from_env_values(None, None, Some("token".into()), None).unwrap_err();
        assert!(matches!(err, NavError::InvalidInput(_)));
    }

    #[test]
    fn loads_catalog_and_directory_from_files() {
        let mut catalog = tempfile::NamedTempFile::new().unwrap();
        catalog
            .write_all(b"full:\n  - label: Overview\n    items:\n      - {path: /dashboard, label: Dashboard}\n")
            .unwrap();
        let mut directory = tempfile::NamedTempFile::new().unwrap();
        directory
            .write_all(b"organizations:\n  - {id: org-1, name: Clinic One, kind: clinic}\n")
            .unwrap();

        let cfg = CoreConfig::from_env_values(
            Some(catalog.path().display().to_string()),
            Some(directory.path().display().to_string()),
            None,
            None,
        )
        .unwrap();

        assert_eq!(cfg.load_catalog().unwrap().full_tree().len(), 1);
        assert_eq!(cfg.load_directory().unwrap().organizations().len(), 1);
    }

    #[test]
    fn missing_directory_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = CoreConfig::new(
            CatalogSource::Builtin,
            Some(dir.path().join("orgs.yaml")),
            SessionKeys::default(),
        )
        .unwrap();
        assert!(matches!(
            cfg.load_directory(),
            Err(NavError::FileRead { .. })
        ));
    }
}
