//! Game settings and preferences
//!
//! Game mode and enemy-type toggles. Where settings are stored is the host's
//! concern; they travel as JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigWarning;
use crate::sim::EnemyKind;

/// Which game the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Ranged combat with the special orb and dash
    #[default]
    Combat,
    /// Invulnerable player, enemies are pulled in with a hook
    Grapple,
    /// Timing minigame, no combat loop
    Precision,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Combat => "combat",
            GameMode::Grapple => "grapple",
            GameMode::Precision => "precision",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "combat" | "normal" => Some(GameMode::Combat),
            "grapple" | "grabber" | "hook" => Some(GameMode::Grapple),
            "precision" | "timing" | "smite" => Some(GameMode::Precision),
            _ => None,
        }
    }
}

/// Which enemy types the spawner may pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyToggles {
    pub fast: bool,
    pub tank: bool,
    pub sniper: bool,
    pub berserker: bool,
    pub mage: bool,
}

impl Default for EnemyToggles {
    fn default() -> Self {
        Self {
            fast: true,
            tank: true,
            sniper: true,
            berserker: true,
            mage: true,
        }
    }
}

impl EnemyToggles {
    /// Toggle state of a kind. Kinds without a toggle are never enabled.
    pub fn is_enabled(&self, kind: EnemyKind) -> bool {
        match kind {
            EnemyKind::Fast => self.fast,
            EnemyKind::Tank => self.tank,
            EnemyKind::Sniper => self.sniper,
            EnemyKind::Berserker => self.berserker,
            EnemyKind::Mage => self.mage,
            EnemyKind::Basic | EnemyKind::Elite => false,
        }
    }

    /// Set a kind's toggle. Returns false for kinds that cannot be toggled.
    pub fn set(&mut self, kind: EnemyKind, enabled: bool) -> bool {
        let slot = match kind {
            EnemyKind::Fast => &mut self.fast,
            EnemyKind::Tank => &mut self.tank,
            EnemyKind::Sniper => &mut self.sniper,
            EnemyKind::Berserker => &mut self.berserker,
            EnemyKind::Mage => &mut self.mage,
            EnemyKind::Basic | EnemyKind::Elite => return false,
        };
        *slot = enabled;
        true
    }

    /// Enabled kinds in spawn-table order
    pub fn enabled_kinds(&self) -> Vec<EnemyKind> {
        crate::tuning::SPAWNABLE_KINDS
            .iter()
            .copied()
            .filter(|&k| self.is_enabled(k))
            .collect()
    }

    /// The enabled set must never be empty; an empty set falls back to `fast`
    pub fn validate(&mut self) -> Option<ConfigWarning> {
        if self.enabled_kinds().is_empty() {
            self.fast = true;
            log::warn!("No enemy types enabled, falling back to fast");
            return Some(ConfigWarning::NoEnemyTypes {
                fallback: EnemyKind::Fast,
            });
        }
        None
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mode the next session starts in
    pub mode: GameMode,
    /// Spawnable enemy types
    pub enemies: EnemyToggles,
}

impl Settings {
    /// Auto-correct invalid combinations
    pub fn validate(&mut self) -> Option<ConfigWarning> {
        self.enemies.validate()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse settings and correct them. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<(Self, Option<ConfigWarning>), serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        let warning = settings.validate();
        Ok((settings, warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toggles_fall_back_to_fast() {
        let mut toggles = EnemyToggles {
            fast: false,
            tank: false,
            sniper: false,
            berserker: false,
            mage: false,
        };
        let warning = toggles.validate();
        assert_eq!(
            warning,
            Some(ConfigWarning::NoEnemyTypes {
                fallback: EnemyKind::Fast
            })
        );
        assert_eq!(toggles.enabled_kinds(), vec![EnemyKind::Fast]);
    }

    #[test]
    fn test_valid_toggles_untouched() {
        let mut toggles = EnemyToggles::default();
        toggles.set(EnemyKind::Fast, false);
        assert!(toggles.validate().is_none());
        assert!(!toggles.fast);
    }

    #[test]
    fn test_untoggleable_kinds() {
        let mut toggles = EnemyToggles::default();
        assert!(!toggles.set(EnemyKind::Elite, true));
        assert!(!toggles.is_enabled(EnemyKind::Elite));
    }

    #[test]
    fn test_settings_json_defaults_and_correction() {
        let (settings, warning) = Settings::from_json(r#"{"mode":"Grapple"}"#).unwrap();
        assert_eq!(settings.mode, GameMode::Grapple);
        assert_eq!(settings.enemies, EnemyToggles::default());
        assert!(warning.is_none());

        let json = r#"{"enemies":{"fast":false,"tank":false,"sniper":false,"berserker":false,"mage":false}}"#;
        let (settings, warning) = Settings::from_json(json).unwrap();
        assert!(warning.is_some());
        assert!(settings.enemies.fast);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(GameMode::from_str("Grabber"), Some(GameMode::Grapple));
        assert_eq!(GameMode::from_str("timing"), Some(GameMode::Precision));
        assert_eq!(GameMode::from_str("chess"), None);
    }
}
