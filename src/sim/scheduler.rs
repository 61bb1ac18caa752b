//! Fixed-step scheduler
//!
//! Converts host frame timestamps into a number of fixed simulation ticks.
//! Frame deltas are clamped so a long stall (hidden tab, debugger) never
//! turns into a burst of catch-up ticks.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DELTA_MS, MAX_SUBSTEPS, TICK_MS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedStep {
    /// Unsimulated time carried between frames (ms)
    pub accumulator_ms: f64,
    /// Timestamp of the previous frame; `None` before the first one
    pub last_timestamp: Option<f64>,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp (ms). Returns how many ticks to run, at most
    /// [`MAX_SUBSTEPS`].
    ///
    /// The first frame only anchors the clock. A timestamp that is not
    /// finite or runs backwards counts as zero elapsed time.
    pub fn advance(&mut self, timestamp_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) if timestamp_ms.is_finite() => {
                let delta = timestamp_ms - prev;
                if delta > 0.0 { delta.min(MAX_FRAME_DELTA_MS) } else { 0.0 }
            }
            _ => 0.0,
        };
        if timestamp_ms.is_finite() {
            self.last_timestamp = Some(timestamp_ms);
        }

        self.accumulator_ms += delta;
        let mut steps = 0;
        while self.accumulator_ms >= TICK_MS && steps < MAX_SUBSTEPS {
            self.accumulator_ms -= TICK_MS;
            steps += 1;
        }
        steps
    }

    /// Forget timing history (after a pause or restart)
    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
        self.last_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_anchors() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance(1000.0), 0);
        assert_eq!(step.advance(1017.0), 1);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut step = FixedStep::new();
        step.advance(0.0);
        // Ten seconds in the background: still only two ticks of catch-up
        assert_eq!(step.advance(10_000.0), 2);
        assert!(step.accumulator_ms < TICK_MS);
    }

    #[test]
    fn test_backwards_and_nan_are_zero_delta() {
        let mut step = FixedStep::new();
        step.advance(500.0);
        assert_eq!(step.advance(100.0), 0);
        assert_eq!(step.advance(f64::NAN), 0);
        assert_eq!(step.last_timestamp, Some(100.0));
        assert_eq!(step.advance(117.0), 1);
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let mut step = FixedStep::new();
        step.advance(0.0);
        let half = TICK_MS / 2.0;
        assert_eq!(step.advance(half), 0);
        assert_eq!(step.advance(half * 2.0 + 0.001), 1);
    }

    proptest! {
        #[test]
        fn prop_bounded_steps(deltas in prop::collection::vec(-50.0f64..500.0, 1..200)) {
            let mut step = FixedStep::new();
            let mut t = 0.0;
            step.advance(t);
            for d in deltas {
                t += d;
                let n = step.advance(t);
                prop_assert!(n <= MAX_SUBSTEPS);
                prop_assert!(step.accumulator_ms >= 0.0);
                prop_assert!(step.accumulator_ms < MAX_FRAME_DELTA_MS + TICK_MS);
            }
        }
    }
}
