//! Magnet output trait

/// A bank of independently controllable PWM magnet outputs
///
/// The bank is the single owner of channel state: every duty change goes
/// through [`set_duty`](MagnetBank::set_duty), and the stored duty always
/// reflects the last value driven to the hardware.
///
/// Callers are expected to validate the channel index; implementations must
/// not corrupt state when handed an out-of-range index, but are free to
/// ignore the call.
pub trait MagnetBank {
    /// Number of channels in the bank
    fn channel_count(&self) -> usize;

    /// Physical pin driving the given channel (for diagnostics)
    fn pin(&self, index: usize) -> u8;

    /// Drive the given channel to the given duty value
    fn set_duty(&mut self, index: usize, duty: u8);

    /// Last duty value applied to the given channel
    fn duty(&self, index: usize) -> u8;
}
