//! Boundary error and warning types
//!
//! The simulation itself never fails; these cover snapshot decoding and
//! configuration corrections surfaced to the host.

use serde::Serialize;
use thiserror::Error;

use crate::sim::EnemyKind;

/// Failure to restore a session snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("snapshot contains a non-finite position")]
    NonFinite,
    #[error("no combat session is running")]
    NoSession,
}

/// A configuration value was auto-corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ConfigWarning {
    #[error("no enemy types enabled, re-enabled {fallback:?}")]
    NoEnemyTypes { fallback: EnemyKind },
}
