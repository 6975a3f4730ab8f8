//! Magnet control handler
//!
//! The single validation boundary between "this message decoded" and "this
//! command is within domain bounds". Only a fully valid command reaches the
//! magnet bank.

use core::fmt;

use crate::command::MagnetCommand;
use crate::config::MAX_POWER;
use crate::traits::MagnetBank;

/// A command rejected at the validation boundary
///
/// The channel index is checked before the power level, so when both are
/// invalid the channel diagnostic wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Channel index outside the bank
    ChannelOutOfRange(i32),
    /// Power level outside 0..=MAX_POWER
    PowerOutOfRange(i32),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ChannelOutOfRange(channel) => {
                write!(f, "channel out of range: {}", channel)
            }
            ValidationError::PowerOutOfRange(power) => {
                write!(f, "power out of range: {}", power)
            }
        }
    }
}

/// Record of a successfully applied command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Applied {
    /// Channel that was driven
    pub channel: u8,
    /// Physical pin identity of that channel
    pub pin: u8,
    /// Duty value applied
    pub duty: u8,
}

/// Validate a command and apply it to the bank
pub fn apply<B: MagnetBank>(
    cmd: &MagnetCommand,
    bank: &mut B,
) -> Result<Applied, ValidationError> {
    if cmd.channel < 0 || cmd.channel >= bank.channel_count() as i32 {
        return Err(ValidationError::ChannelOutOfRange(cmd.channel));
    }
    if cmd.power < 0 || cmd.power > MAX_POWER {
        return Err(ValidationError::PowerOutOfRange(cmd.power));
    }

    let index = cmd.channel as usize;
    let duty = cmd.power as u8;
    bank.set_duty(index, duty);

    Ok(Applied {
        channel: index as u8,
        pin: bank.pin(index),
        duty,
    })
}
