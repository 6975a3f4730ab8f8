//! Firmware update listener trait

/// Passive firmware-update service
///
/// The listener has its own internal timeout-driven protocol, so the control
/// loop gives it a turn every iteration regardless of network activity.
pub trait UpdateListener {
    /// Service the listener; must return promptly and never block
    fn poll(&mut self);
}
