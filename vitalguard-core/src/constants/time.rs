//! Time-Related Constants
//!
//! Task periods and timing windows for the cooperative monitor loop.
//! All values are milliseconds.

/// Heart-rate sampling period. 100 Hz resolves inter-beat intervals to 10 ms.
pub const HR_SAMPLE_PERIOD_MS: u64 = 10;

/// Pause between temperature samples.
pub const TEMP_PERIOD_MS: u64 = 2000;

/// Suspension between the individual reads of a temperature burst.
pub const TEMP_SAMPLE_GAP_MS: u64 = 1;

/// Pause between tilt votes.
pub const TILT_PERIOD_MS: u64 = 200;

/// Suspension between the individual reads of a tilt vote.
pub const TILT_SAMPLE_GAP_MS: u64 = 2;

/// Scheduler tick: how often the button is polled.
pub const SCHEDULER_TICK_MS: u64 = 20;

/// Status emission period while monitoring is active.
pub const EMIT_PERIOD_MS: u64 = 1000;

/// Minimum stable time before a button level change is accepted.
pub const DEBOUNCE_MS: u64 = 50;

/// How long an emission waits for an external temperature label.
pub const LABEL_TIMEOUT_MS: u64 = 1000;
