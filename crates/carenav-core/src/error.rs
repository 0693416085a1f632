//! Errors raised by the plumbing around the navigation policy.
//!
//! The policy functions themselves (role normalisation, tenant resolution, the capability gate
//! and navigation building) are total and never return these. They come from configuration,
//! catalog loading, the organization directory and session mutation.

use carenav_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read {kind} file {path}: {source}", path = path.display())]
    FileRead {
        kind: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} schema mismatch at {path}: {message}")]
    Schema {
        kind: &'static str,
        path: String,
        message: String,
    },
    #[error("invalid navigation catalog: {0}")]
    InvalidCatalog(String),
    #[error("invalid organization directory: {0}")]
    InvalidDirectory(String),
    #[error("unknown organization: {0}")]
    UnknownOrganization(String),
    #[error("role {role} may not switch organization")]
    SelectionNotPermitted { role: String },
    #[error("identity is bound to organization {0}; selection cannot override it")]
    SelectionOverridesBoundOrganization(String),
    #[error("failed to fetch enabled modules for {organization}: {message}")]
    ModuleFetch {
        organization: String,
        message: String,
    },
    #[error("invalid text: {0}")]
    Text(#[from] TextError),
}

pub type NavResult<T> = std::result::Result<T, NavError>;
