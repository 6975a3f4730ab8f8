//! Hardware and network abstraction traits
//!
//! These traits define the interface between the control logic and the
//! platform-specific implementations in the firmware crate.

pub mod net;
pub mod output;
pub mod update;

pub use net::{DatagramSocket, LinkControl, LinkError, SocketError};
pub use output::MagnetBank;
pub use update::UpdateListener;
