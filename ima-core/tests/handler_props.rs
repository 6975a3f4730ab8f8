//! Property tests for the validation boundary

use ima_core::command::MagnetCommand;
use ima_core::config::{MAGNET_COUNT, MAGNET_PINS, MAX_POWER};
use ima_core::handler::{apply, ValidationError};
use ima_core::traits::MagnetBank;
use proptest::prelude::*;

#[derive(Default)]
struct ArrayBank {
    duties: [u8; MAGNET_COUNT],
}

impl MagnetBank for ArrayBank {
    fn channel_count(&self) -> usize {
        MAGNET_COUNT
    }

    fn pin(&self, index: usize) -> u8 {
        MAGNET_PINS[index]
    }

    fn set_duty(&mut self, index: usize, duty: u8) {
        self.duties[index] = duty;
    }

    fn duty(&self, index: usize) -> u8 {
        self.duties[index]
    }
}

proptest! {
    /// Every in-range pair is applied verbatim
    #[test]
    fn valid_commands_apply(channel in 0i32..MAGNET_COUNT as i32, power in 0i32..=MAX_POWER) {
        let mut bank = ArrayBank::default();
        let applied = apply(&MagnetCommand { channel, power }, &mut bank).unwrap();

        prop_assert_eq!(applied.duty as i32, power);
        prop_assert_eq!(applied.pin, MAGNET_PINS[channel as usize]);
        prop_assert_eq!(bank.duty(channel as usize) as i32, power);
    }

    /// Out-of-range commands never mutate any channel
    #[test]
    fn invalid_commands_are_inert(channel in any::<i32>(), power in any::<i32>()) {
        let in_range =
            (0..MAGNET_COUNT as i32).contains(&channel) && (0..=MAX_POWER).contains(&power);
        prop_assume!(!in_range);

        let mut bank = ArrayBank::default();
        let result = apply(&MagnetCommand { channel, power }, &mut bank);

        prop_assert!(result.is_err());
        prop_assert_eq!(bank.duties, [0u8; MAGNET_COUNT]);

        // Index is checked before power
        if !(0..MAGNET_COUNT as i32).contains(&channel) {
            prop_assert_eq!(result, Err(ValidationError::ChannelOutOfRange(channel)));
        }
    }
}
