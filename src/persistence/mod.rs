//! Session snapshots
//!
//! Features:
//! - Versioned JSON envelope around the full `GameState` (RNG included)
//! - Rejects snapshots from other versions before touching the payload
//! - Non-finite positions are refused on restore

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::sim::GameState;

/// Bump when `GameState` changes shape
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: GameState,
}

/// Just the version field, read before the payload
#[derive(Deserialize)]
struct Header {
    version: u32,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state: state.clone(),
        }
    }

    pub fn encode(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(json: &str) -> Result<Self, SnapshotError> {
        let header: Header = serde_json::from_str(json)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: header.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let snapshot: Snapshot = serde_json::from_str(json)?;
        validate(&snapshot.state)?;
        Ok(snapshot)
    }

    pub fn restore(self) -> GameState {
        log::info!(
            "Restored snapshot at tick {} (score {})",
            self.state.time_ticks,
            self.state.score
        );
        self.state
    }
}

fn validate(state: &GameState) -> Result<(), SnapshotError> {
    let finite = state.player.pos.is_finite()
        && state.player.stamina.is_finite()
        && state.enemies.iter().all(|e| e.pos.is_finite())
        && state
            .bullets
            .iter()
            .chain(&state.enemy_bullets)
            .chain(&state.special_orbs)
            .all(|p| p.is_finite())
        && state.hook.as_ref().is_none_or(|h| h.pos.is_finite());
    if finite {
        Ok(())
    } else {
        Err(SnapshotError::NonFinite)
    }
}
