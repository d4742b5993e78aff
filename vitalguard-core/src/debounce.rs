//! Debounced Press Detection
//!
//! Mechanical buttons bounce: one press produces a burst of transitions
//! over a few milliseconds. The detector turns a polled, noisy level into
//! exactly one event per press-then-release cycle without ever blocking.
//!
//! ## Algorithm
//!
//! Two stages:
//!
//! 1. **Raw stage**: any change of the polled level from the previous poll
//!    records the new level and restarts a "last change" timer.
//! 2. **Stable stage**: once the raw level has held for *longer than* the
//!    debounce interval, it becomes the stable level.
//!
//! A stable transition to pressed arms a pending flag; the following stable
//! transition to released consumes the flag and reports the press.
//!
//! ```text
//! raw     ‾‾|_|‾|___________________|‾|_|‾‾‾‾‾‾‾‾‾‾‾
//! stable  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_______________________|‾‾‾‾‾
//!                   armed ↑              event ↑
//! ```
//!
//! Reporting on release rather than on press means a long hold still counts
//! once, and a glitch that never settles counts zero times.

use crate::time::{elapsed_ms, Timestamp};

/// Press-and-release edge detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDetector {
    debounce_ms: u64,
    raw_pressed: bool,
    stable_pressed: bool,
    last_change: Timestamp,
    press_pending: bool,
}

impl EdgeDetector {
    /// Detector that starts released
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            raw_pressed: false,
            stable_pressed: false,
            last_change: 0,
            press_pending: false,
        }
    }

    /// Feed one sample of the button level
    ///
    /// `pressed` is the logical level (polarity already applied). Returns
    /// `true` exactly once per validated press-release cycle.
    pub fn poll(&mut self, pressed: bool, now: Timestamp) -> bool {
        if pressed != self.raw_pressed {
            self.raw_pressed = pressed;
            self.last_change = now;
        }

        if elapsed_ms(self.last_change, now) <= self.debounce_ms
            || self.raw_pressed == self.stable_pressed
        {
            return false;
        }

        self.stable_pressed = self.raw_pressed;
        if self.stable_pressed {
            self.press_pending = true;
            false
        } else {
            core::mem::replace(&mut self.press_pending, false)
        }
    }

    /// Debounced level
    pub fn is_pressed(&self) -> bool {
        self.stable_pressed
    }

    /// A press has been accepted and awaits release
    pub fn is_pending(&self) -> bool {
        self.press_pending
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new(crate::constants::DEBOUNCE_MS)
    }
}
