//! Precision timing minigame
//!
//! A bar drains from full at a random rate; the player gets one smite per
//! round and is judged on how close the bar was to a target when pressed.
//! Runs instead of the combat loop, never alongside it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::GameEvent;

pub const TIMING_MAX: f32 = 3500.0;
/// Possible round targets
pub const TIMING_TARGETS: [u32; 3] = [450, 900, 1200];
pub const DRAIN_BASE: f32 = 2.5;
pub const DRAIN_JITTER: f32 = 3.0;
pub const PERFECT_WINDOW: i64 = 50;
pub const GOOD_WINDOW: i64 = 150;
/// Pause between a resolved round and the next one
pub const ROUND_DELAY_TICKS: u32 = 120;

/// Result of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmiteOutcome {
    Perfect,
    Good,
    /// Pressed while the bar was still above the target
    TooEarly,
    /// Pressed more than the good window below the target
    TooLate,
    /// Bar ran out without a press
    Missed,
}

impl SmiteOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, SmiteOutcome::Perfect | SmiteOutcome::Good)
    }
}

/// Judge a press at bar value `value` against `target`
pub fn judge_smite(value: f32, target: u32) -> SmiteOutcome {
    let current = value.ceil() as i64;
    let target = i64::from(target);
    if current > target {
        return SmiteOutcome::TooEarly;
    }
    match target - current {
        diff if diff <= PERFECT_WINDOW => SmiteOutcome::Perfect,
        diff if diff <= GOOD_WINDOW => SmiteOutcome::Good,
        _ => SmiteOutcome::TooLate,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimingPhase {
    /// Bar is draining, a smite is allowed
    Draining,
    /// Round judged, waiting `delay` ticks for the next one
    Resolved { outcome: SmiteOutcome, delay: u32 },
}

/// Minigame session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingState {
    pub seed: u64,
    pub rng: Pcg32,
    pub value: f32,
    pub max_value: f32,
    /// Bar units lost per tick this round
    pub drain_rate: f32,
    pub target: u32,
    pub phase: TimingPhase,
    pub hits: u32,
    pub misses: u32,
    /// Rounds started, including the current one
    pub rounds: u32,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl TimingState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            value: TIMING_MAX,
            max_value: TIMING_MAX,
            drain_rate: DRAIN_BASE,
            target: TIMING_TARGETS[0],
            phase: TimingPhase::Draining,
            hits: 0,
            misses: 0,
            rounds: 0,
            events: Vec::new(),
        };
        state.start_round();
        state
    }

    fn start_round(&mut self) {
        self.value = self.max_value;
        self.drain_rate = DRAIN_BASE + self.rng.random::<f32>() * DRAIN_JITTER;
        self.target = TIMING_TARGETS[self.rng.random_range(0..TIMING_TARGETS.len())];
        self.phase = TimingPhase::Draining;
        self.rounds += 1;
    }

    pub fn can_smite(&self) -> bool {
        self.phase == TimingPhase::Draining
    }

    /// Advance one tick
    pub fn tick(&mut self) {
        match self.phase {
            TimingPhase::Draining => {
                self.value = (self.value - self.drain_rate).max(0.0);
                if self.value <= 0.0 {
                    self.resolve(SmiteOutcome::Missed);
                }
            }
            TimingPhase::Resolved { outcome, delay } => {
                if delay <= 1 {
                    self.start_round();
                } else {
                    self.phase = TimingPhase::Resolved {
                        outcome,
                        delay: delay - 1,
                    };
                }
            }
        }
    }

    /// The one press allowed per round
    pub fn smite(&mut self) -> Option<SmiteOutcome> {
        if !self.can_smite() {
            return None;
        }
        let outcome = judge_smite(self.value, self.target);
        if outcome.is_hit() {
            self.value = 0.0;
        }
        self.resolve(outcome);
        Some(outcome)
    }

    fn resolve(&mut self, outcome: SmiteOutcome) {
        if outcome.is_hit() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        log::info!(
            "Round {}: {outcome:?} at {:.0} (target {})",
            self.rounds,
            self.value,
            self.target
        );
        self.phase = TimingPhase::Resolved {
            outcome,
            delay: ROUND_DELAY_TICKS,
        };
        self.events.push(GameEvent::SmiteResolved { outcome });
    }

    /// Hit percentage over all judged rounds
    pub fn accuracy(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 * 100.0 / total as f32
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judge_windows() {
        assert_eq!(judge_smite(850.0, 900), SmiteOutcome::Perfect);
        assert_eq!(judge_smite(780.0, 900), SmiteOutcome::Good);
        assert_eq!(judge_smite(950.0, 900), SmiteOutcome::TooEarly);
        assert_eq!(judge_smite(700.0, 900), SmiteOutcome::TooLate);
        // Fractional values round up before judging
        assert_eq!(judge_smite(900.2, 900), SmiteOutcome::TooEarly);
        assert_eq!(judge_smite(749.5, 900), SmiteOutcome::Good);
    }

    #[test]
    fn test_drain_to_zero_is_a_miss() {
        let mut timing = TimingState::new(8);
        for _ in 0..2000 {
            timing.tick();
            if !timing.can_smite() {
                break;
            }
        }
        assert_eq!(timing.value, 0.0);
        assert_eq!(timing.misses, 1);
        assert_eq!(timing.hits, 0);
        assert!(matches!(
            timing.phase,
            TimingPhase::Resolved {
                outcome: SmiteOutcome::Missed,
                ..
            }
        ));
    }

    #[test]
    fn test_one_smite_per_round() {
        let mut timing = TimingState::new(8);
        timing.value = 850.0;
        timing.target = 900;
        assert_eq!(timing.smite(), Some(SmiteOutcome::Perfect));
        assert_eq!(timing.value, 0.0);
        assert_eq!(timing.smite(), None);
        assert_eq!(timing.hits, 1);
        assert_eq!(timing.misses, 0);
    }

    #[test]
    fn test_next_round_after_delay() {
        let mut timing = TimingState::new(8);
        timing.value = 2000.0;
        timing.target = 900;
        assert_eq!(timing.smite(), Some(SmiteOutcome::TooEarly));
        for _ in 0..ROUND_DELAY_TICKS - 1 {
            timing.tick();
            assert!(!timing.can_smite());
        }
        timing.tick();
        assert!(timing.can_smite());
        assert_eq!(timing.rounds, 2);
        assert_eq!(timing.value, TIMING_MAX);
        assert!(TIMING_TARGETS.contains(&timing.target));
        assert!(timing.drain_rate >= DRAIN_BASE && timing.drain_rate < DRAIN_BASE + DRAIN_JITTER);
    }

    #[test]
    fn test_accuracy_and_events() {
        let mut timing = TimingState::new(2);
        assert_eq!(timing.accuracy(), 0.0);
        timing.value = 880.0;
        timing.target = 900;
        timing.smite();
        timing.phase = TimingPhase::Draining;
        timing.value = 100.0;
        timing.smite();
        assert_eq!(timing.accuracy(), 50.0);
        let events = timing.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::SmiteResolved {
                    outcome: SmiteOutcome::Perfect
                },
                GameEvent::SmiteResolved {
                    outcome: SmiteOutcome::TooLate
                },
            ]
        );
    }

    #[test]
    fn test_rounds_are_seeded() {
        let a = TimingState::new(77);
        let b = TimingState::new(77);
        assert_eq!(a.drain_rate, b.drain_rate);
        assert_eq!(a.target, b.target);
    }
}
