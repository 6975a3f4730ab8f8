//! Magnet command interpretation
//!
//! A routed message's argument list is interpreted into a channel/power pair
//! before validation. Three encodings are accepted, decided by the type of
//! argument 0.

use ima_protocol::Arg;

/// A channel/power pair extracted from a message's arguments
///
/// Fields are kept as raw i32 on purpose: interpretation never rejects a
/// value, range validation happens once in [`crate::handler::apply`].
///
/// # Accepted encodings
///
/// - `[Int(power)]` - power only; the command targets channel 0. Senders
///   that use the single-numeric form have no way to name a channel, and
///   the reference controller always drove channel 0 for them; that
///   contract is kept here.
/// - `[Float(power)]` - as above, with the power truncated toward zero.
/// - `[Str(index), Str(power)]` - both values as base-10 ASCII. Text that
///   does not parse becomes 0. This is a known weak fallback for senders
///   that cannot emit typed numeric arguments, not a decode failure.
///
/// Anything else interprets as `{channel: 0, power: 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagnetCommand {
    /// Target channel index
    pub channel: i32,
    /// Requested power level
    pub power: i32,
}

impl MagnetCommand {
    /// Interpret an argument list into a command
    pub fn from_args(args: &[Arg]) -> Self {
        match args.first() {
            Some(Arg::Int(power)) => Self {
                channel: 0,
                power: *power,
            },
            Some(Arg::Float(power)) => Self {
                channel: 0,
                power: *power as i32,
            },
            Some(Arg::Str(index)) => {
                let power = match args.get(1) {
                    Some(Arg::Str(power)) => parse_decimal(power),
                    _ => 0,
                };
                Self {
                    channel: parse_decimal(index),
                    power,
                }
            }
            None => Self {
                channel: 0,
                power: 0,
            },
        }
    }
}

/// Base-10 parse with the documented weak fallback to 0
fn parse_decimal(s: &str) -> i32 {
    s.parse().unwrap_or(0)
}
