//! PWM magnet bank driver
//!
//! Owns the fixed set of output channels and their duty shadow values. The
//! index-to-pin mapping is decided at construction and never changes.

use embedded_hal::pwm::SetDutyCycle;
use ima_core::traits::MagnetBank;

/// Duty values are 8-bit; a channel's native range is scaled from this
const DUTY_SCALE: u16 = u8::MAX as u16;

/// A bank of PWM-driven electromagnet outputs
///
/// All channels start at duty 0. Range validation is the caller's job (the
/// magnet handler); a misused index is ignored here so a buggy caller can
/// never corrupt a neighboring channel.
pub struct PwmMagnetBank<P, const N: usize> {
    channels: [P; N],
    pins: [u8; N],
    duties: [u8; N],
}

impl<P: SetDutyCycle, const N: usize> PwmMagnetBank<P, N> {
    /// Take ownership of the channels and drive every output to duty 0
    pub fn new(mut channels: [P; N], pins: [u8; N]) -> Self {
        for channel in &mut channels {
            // Hardware writes are assumed to succeed once configured
            let _ = channel.set_duty_cycle_fully_off();
        }
        Self {
            channels,
            pins,
            duties: [0; N],
        }
    }
}

impl<P: SetDutyCycle, const N: usize> MagnetBank for PwmMagnetBank<P, N> {
    fn channel_count(&self) -> usize {
        N
    }

    fn pin(&self, index: usize) -> u8 {
        self.pins.get(index).copied().unwrap_or(0)
    }

    fn set_duty(&mut self, index: usize, duty: u8) {
        let Some(channel) = self.channels.get_mut(index) else {
            // Caller bug; leave all channel state untouched
            return;
        };
        let _ = channel.set_duty_cycle_fraction(duty as u16, DUTY_SCALE);
        self.duties[index] = duty;
    }

    fn duty(&self, index: usize) -> u8 {
        self.duties.get(index).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    /// Records the last native duty written
    struct MockPwm {
        max: u16,
        written: u16,
        writes: u32,
    }

    impl MockPwm {
        fn new(max: u16) -> Self {
            Self {
                max,
                written: 0xFFFF,
                writes: 0,
            }
        }
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.written = duty;
            self.writes += 1;
            Ok(())
        }
    }

    fn bank() -> PwmMagnetBank<MockPwm, 4> {
        let channels = [
            MockPwm::new(255),
            MockPwm::new(255),
            MockPwm::new(255),
            MockPwm::new(1023),
        ];
        PwmMagnetBank::new(channels, [13, 14, 15, 16])
    }

    #[test]
    fn test_all_channels_start_at_zero() {
        let bank = bank();
        for index in 0..4 {
            assert_eq!(bank.duty(index), 0);
            assert_eq!(bank.channels[index].written, 0);
        }
    }

    #[test]
    fn test_set_duty_updates_hardware_and_shadow() {
        let mut bank = bank();
        bank.set_duty(1, 200);

        assert_eq!(bank.duty(1), 200);
        assert_eq!(bank.channels[1].written, 200);
        // Other channels untouched since initialization
        assert_eq!(bank.channels[0].writes, 1);
    }

    #[test]
    fn test_duty_scales_to_native_range() {
        let mut bank = bank();

        // Channel 3 has a 10-bit native range
        bank.set_duty(3, 255);
        assert_eq!(bank.channels[3].written, 1023);

        bank.set_duty(3, 128);
        assert_eq!(bank.channels[3].written, ((128u32 * 1023) / 255) as u16);
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut bank = bank();
        bank.set_duty(9, 200);

        for index in 0..4 {
            assert_eq!(bank.duty(index), 0);
        }
        assert_eq!(bank.duty(9), 0);
    }

    #[test]
    fn test_pin_mapping() {
        let bank = bank();
        assert_eq!(bank.pin(0), 13);
        assert_eq!(bank.pin(3), 16);
        assert_eq!(bank.pin(9), 0);
    }
}
