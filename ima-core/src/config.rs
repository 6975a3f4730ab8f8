//! Device configuration
//!
//! The magnet bank geometry and PWM parameters are fixed at build time.
//! Network parameters have build-time defaults but can be overridden by the
//! firmware's embedded configuration file.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of magnet channels
pub const MAGNET_COUNT: usize = 8;

/// Fixed channel-index to physical-pin mapping
pub const MAGNET_PINS: [u8; MAGNET_COUNT] = [13, 14, 15, 16, 17, 18, 19, 21];

/// UDP port the control socket binds to
pub const CONTROL_PORT: u16 = 5005;

/// PWM carrier frequency
pub const PWM_FREQ_HZ: u32 = 5000;

/// PWM resolution (duty range is 0..=2^bits - 1)
pub const PWM_RESOLUTION_BITS: u8 = 8;

/// Highest accepted power level
pub const MAX_POWER: i32 = 255;

/// Maximum SSID / hostname length
pub const MAX_NAME_LEN: usize = 32;

/// Maximum Wi-Fi passphrase length
pub const MAX_PASS_LEN: usize = 64;

/// Static IPv4 addressing for the station interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StaticAddr {
    /// Device address
    pub address: [u8; 4],
    /// Gateway address
    pub gateway: [u8; 4],
    /// Subnet mask
    pub netmask: [u8; 4],
}

impl Default for StaticAddr {
    fn default() -> Self {
        Self {
            address: [192, 168, 15, 253],
            gateway: [192, 168, 15, 1],
            netmask: [255, 255, 0, 0],
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetConfig {
    /// Access point to associate with
    pub ssid: String<MAX_NAME_LEN>,
    /// Access point passphrase
    pub password: String<MAX_PASS_LEN>,
    /// Advertised host name
    pub hostname: String<MAX_NAME_LEN>,
    /// Station addressing
    pub static_addr: StaticAddr,
    /// Control socket port
    pub port: u16,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            hostname: String::try_from("eletroima").unwrap_or_default(),
            static_addr: StaticAddr::default(),
            port: CONTROL_PORT,
        }
    }
}
