//! Link events reported by the radio driver

/// Events that drive link-state transitions
///
/// These correspond to the asynchronous station events the wireless driver
/// raises; the session drains them once per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Association with the access point succeeded
    Associated,
    /// Station addressing is active; the link is usable
    AddressAssigned,
    /// Link lost, with the driver's disconnect reason code
    Lost(u8),
}
