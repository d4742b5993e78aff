//! Periodic Signal Samplers
//!
//! Three independent tasks, each owning one physical sensor and one field
//! of [`VitalsState`](crate::vitals::VitalsState):
//!
//! | Sampler                | Sensor        | Period  | Burst           | Publishes            |
//! |------------------------|---------------|---------|-----------------|----------------------|
//! | [`HeartRateSampler`]   | pulse (ADC)   | 10 ms   | 1 read          | mean of last 5 beats |
//! | [`TemperatureSampler`] | LM35 (ADC)    | 2 s     | 16 reads, 1 ms  | calibrated °C        |
//! | [`TiltSampler`]        | switch (GPIO) | 200 ms  | 5 reads, 2 ms   | 0° or 90°            |
//!
//! ## Cooperative Execution
//!
//! A sampler never sleeps. Each [`Sampler::poll`] runs the task up to its
//! next suspension point (one read of a burst, or the end of a cycle) and
//! returns when it wants to run again. The monitor calls `poll` whenever
//! that time has come, interleaving all three tasks on one thread.
//!
//! ```text
//! t(ms)   0    1    2    3   ...  10   11  ...
//! HR      R                       R
//! TEMP    R    R    R    R   ...  R(16th → publish, sleep 2 s)
//! TILT    R         R        ...  (5th → publish, sleep 200 ms)
//! ```
//!
//! Internal state (baseline, window, partial bursts) survives between polls
//! and is never reset.

mod heart_rate;
mod temperature;
mod tilt;

pub use heart_rate::{BpmWindow, HeartRateDetector, HeartRateSampler};
pub use temperature::{celsius_from_raw, TemperatureSampler};
pub use tilt::{tilt_from_votes, TiltSampler};

use crate::time::Timestamp;
use crate::vitals::VitalSlot;

/// A cooperatively scheduled sampling task
pub trait Sampler {
    /// Run up to the next suspension point if due
    ///
    /// Writes only to `slot`. Returns the timestamp of the next wake-up;
    /// polling earlier is harmless and does nothing.
    fn poll(&mut self, now: Timestamp, slot: &mut VitalSlot) -> Timestamp;

    /// When the sampler next wants to run
    fn next_wake(&self) -> Timestamp;
}
