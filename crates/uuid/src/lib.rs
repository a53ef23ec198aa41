//! UUID and session identifier utilities.
//!
//! HerbDx uses a *canonical* UUID representation for storage identifiers: **32 lowercase
//! hexadecimal characters** (no hyphens), the value produced by
//! `Uuid::new_v4().simple().to_string()`.
//!
//! This crate provides:
//! - [`UuidService`], a wrapper that guarantees the canonical format once constructed, plus the
//!   sharding scheme used to lay out diagnosis logs on disk.
//! - [`SessionId`] and [`SessionIdGenerator`], the identifier attached to every diagnosis run.
//!
//! ## Session identifier format
//! `diag-YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
//!
//! Example:
//! `diag-20260111T143522.045Z-550e8400e29b41d4a716446655440000`
//!
//! The timestamp prefix makes identifiers sort by creation time; the UUID suffix makes them
//! unique without coordination between processes.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, data is stored under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`

mod service;

pub use service::{SessionId, SessionIdGenerator, Uuid, UuidService, SESSION_ID_PREFIX};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
