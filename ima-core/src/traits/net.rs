//! Network link and datagram socket traits
//!
//! The radio driver delivers asynchronous link events; the session machine
//! in [`crate::session`] turns them into explicit state transitions. Both
//! traits are non-blocking so the control loop never stalls on the network.

use crate::config::StaticAddr;
use crate::session::LinkEvent;

/// Errors reported by the link driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Static address configuration was rejected
    ConfigFailed,
    /// Driver not ready for the requested operation
    NotReady,
}

/// Errors reported by the datagram socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SocketError {
    /// Socket is not open
    Closed,
    /// Underlying transport error
    Io,
}

/// Control surface of the wireless link
pub trait LinkControl {
    /// Apply static IPv4 addressing to the station interface
    fn configure_static(&mut self, addr: &StaticAddr) -> Result<(), LinkError>;

    /// Begin association with the configured access point
    ///
    /// Returns immediately; progress is reported through
    /// [`poll_event`](LinkControl::poll_event).
    fn connect(&mut self);

    /// Take the next pending link event, if any
    fn poll_event(&mut self) -> Option<LinkEvent>;
}

/// Non-blocking datagram receive socket
pub trait DatagramSocket {
    /// Open the socket bound to the given port
    fn open(&mut self, port: u16) -> Result<(), SocketError>;

    /// Close the socket, discarding anything still buffered
    fn close(&mut self);

    /// Read one pending datagram into `buf`
    ///
    /// Returns `Ok(None)` immediately when no datagram is pending.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, SocketError>;
}
