//! Typed OSC arguments
//!
//! Each argument in a message carries an explicit type tag. The three tags
//! magnet senders use map onto one variant each.

use heapless::String;

/// Type tag for a big-endian i32 argument
pub const TAG_INT: u8 = b'i';

/// Type tag for a big-endian f32 argument
pub const TAG_FLOAT: u8 = b'f';

/// Type tag for a padded NUL-terminated string argument
pub const TAG_STRING: u8 = b's';

/// Maximum length of a string argument
///
/// Senders encode channel index and power as short decimal strings; the
/// reference sender never exceeds 8 bytes.
pub const MAX_STR_LEN: usize = 16;

/// One decoded argument
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Arg {
    /// 32-bit signed integer (`i` tag)
    Int(i32),
    /// 32-bit float (`f` tag)
    Float(f32),
    /// ASCII string (`s` tag)
    Str(String<MAX_STR_LEN>),
}

impl Arg {
    /// The wire type tag for this argument
    pub fn tag(&self) -> u8 {
        match self {
            Arg::Int(_) => TAG_INT,
            Arg::Float(_) => TAG_FLOAT,
            Arg::Str(_) => TAG_STRING,
        }
    }
}
