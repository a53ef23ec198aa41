//! # API Shared
//!
//! Shared wire types and utilities for HerbDx APIs.
//!
//! Contains:
//! - JSON DTOs with OpenAPI schemas (`dto` module)
//! - Request-schema validation for diagnosis submissions
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the root binary.

pub mod dto;
pub mod health;
pub mod validation;

pub use dto::*;
pub use health::{HealthRes, HealthService};
pub use validation::{validate_diagnosis_request, FieldError};
