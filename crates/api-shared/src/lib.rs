//! # API Shared
//!
//! Shared definitions for the CareNav API surface.
//!
//! Contains:
//! - Request/response types (`dto` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Session token checks

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
