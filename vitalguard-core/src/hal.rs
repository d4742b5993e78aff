//! Hardware Abstraction for the Patient Sensors
//!
//! The monitor touches hardware through three tiny traits. Board support
//! code implements them over its GPIO/ADC peripherals; tests implement them
//! over scripted waveforms.
//!
//! Reads are infallible. The sensors are wired directly to the MCU and, once
//! the board is up, a read always returns *something*; implausible values
//! are the samplers' problem, not the HAL's.
//!
//! Polarity is not the HAL's concern either: a pulled-up switch reports
//! `is_high() == true` when open, and the consumer decides what that means
//! through its `active_low` setting.

/// Analog line scaled to 16 bits (0..=65535)
pub trait AnalogInput {
    /// One conversion
    fn read_u16(&mut self) -> u16;
}

/// Digital line level
pub trait DigitalInput {
    /// `true` when the line is electrically high
    fn is_high(&mut self) -> bool;
}

/// Blocking millisecond delay used by [`Monitor::run`](crate::monitor::Monitor::run)
pub trait Delay {
    /// Sleep for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    fn read_u16(&mut self) -> u16 {
        (**self).read_u16()
    }
}

impl<T: DigitalInput + ?Sized> DigitalInput for &mut T {
    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }
}

/// Thread-sleep delay for host builds
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// Reads a digital line honoring its polarity
///
/// Returns `true` when the line is in its *active* state.
#[inline]
pub(crate) fn read_active<D: DigitalInput>(line: &mut D, active_low: bool) -> bool {
    line.is_high() != active_low
}
