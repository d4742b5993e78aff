//! Tilt majority vote
//!
//! A ball tilt switch chatters when it sits near its threshold. Each cycle
//! reads the line several times a couple of milliseconds apart and only
//! reports "tilted" when a majority of reads agree.

use crate::config::TiltConfig;
use crate::constants::{FLAT_DEGREES, TILTED_DEGREES};
use crate::hal::{read_active, DigitalInput};
use crate::time::{is_due, Timestamp};
use crate::vitals::VitalSlot;

use super::Sampler;

/// Angle published for a vote
pub fn tilt_from_votes(tilted_votes: u8, majority: u8) -> f32 {
    if tilted_votes >= majority {
        TILTED_DEGREES
    } else {
        FLAT_DEGREES
    }
}

/// Tilt task: majority vote every period
pub struct TiltSampler<D> {
    line: D,
    config: TiltConfig,
    taken: u8,
    tilted_votes: u8,
    next_due: Timestamp,
}

impl<D: DigitalInput> TiltSampler<D> {
    /// Sampler that starts its first vote at its first poll
    pub fn new(line: D, config: TiltConfig) -> Self {
        Self {
            line,
            config,
            taken: 0,
            tilted_votes: 0,
            next_due: 0,
        }
    }
}

impl<D: DigitalInput> Sampler for TiltSampler<D> {
    fn poll(&mut self, now: Timestamp, slot: &mut VitalSlot) -> Timestamp {
        if !is_due(now, self.next_due) {
            return self.next_due;
        }

        if read_active(&mut self.line, self.config.active_low) {
            self.tilted_votes += 1;
        }
        self.taken += 1;

        if self.taken < self.config.samples {
            self.next_due = now + self.config.sample_gap_ms;
            return self.next_due;
        }

        slot.publish(tilt_from_votes(self.tilted_votes, self.config.majority));

        self.taken = 0;
        self.tilted_votes = 0;
        self.next_due = now + self.config.period_ms;
        self.next_due
    }

    fn next_wake(&self) -> Timestamp {
        self.next_due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Script {
        levels: Vec<bool>,
        next: usize,
    }

    impl DigitalInput for Script {
        fn is_high(&mut self) -> bool {
            let level = self.levels[self.next % self.levels.len()];
            self.next += 1;
            level
        }
    }

    fn vote(levels: Vec<bool>, active_low: bool) -> f32 {
        let config = TiltConfig {
            active_low,
            ..TiltConfig::default()
        };
        let mut sampler = TiltSampler::new(Script { levels, next: 0 }, config);
        let mut slot = VitalSlot::new();
        let mut now = 0;
        while !slot.is_set() {
            now = sampler.poll(now, &mut slot);
        }
        slot.get().unwrap()
    }

    #[test]
    fn majority_threshold() {
        assert_eq!(tilt_from_votes(3, 3), 90.0);
        assert_eq!(tilt_from_votes(5, 3), 90.0);
        assert_eq!(tilt_from_votes(2, 3), 0.0);
        assert_eq!(tilt_from_votes(0, 3), 0.0);
    }

    #[test]
    fn active_low_switch() {
        // Pulled up: low = tilted
        assert_eq!(vote(vec![false, false, true, false, true], true), 90.0);
        assert_eq!(vote(vec![true, true, false, true, false], true), 0.0);
    }

    #[test]
    fn active_high_switch() {
        assert_eq!(vote(vec![true, true, true, false, false], false), 90.0);
        assert_eq!(vote(vec![true, false, false, false, true], false), 0.0);
    }

    #[test]
    fn single_glitch_rejected() {
        assert_eq!(vote(vec![true, true, false, true, true], true), 0.0);
    }

    #[test]
    fn cycle_timing() {
        let script = Script { levels: vec![true], next: 0 };
        let mut sampler = TiltSampler::new(script, TiltConfig::default());
        let mut slot = VitalSlot::new();

        let wakes: Vec<u64> = (0..5)
            .scan(0, |now, _| {
                *now = sampler.poll(*now, &mut slot);
                Some(*now)
            })
            .collect();

        // Four 2 ms gaps, then the 200 ms pause after the fifth read at t=8
        assert_eq!(wakes, vec![2, 4, 6, 8, 208]);
        assert_eq!(slot.get(), Some(0.0));
    }
}
