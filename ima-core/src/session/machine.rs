//! Link state machine
//!
//! Connectivity is a function of the current state and a link event. The
//! datagram socket is open if and only if the state is `Connected`; the
//! session manager in [`super`] enforces that invariant around each
//! transition.

use super::events::LinkEvent;

/// Network session connectivity phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No link; association not in progress
    Disconnected,
    /// Association with the access point in progress
    Associating,
    /// Link up with addressing active; datagrams flow
    Connected,
}

impl LinkState {
    /// Whether the control socket may accept datagrams in this state
    pub fn accepts_datagrams(&self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// Process a link event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            // Association progress; addressing is still pending
            (Disconnected | Associating, Associated) => Associating,

            // Addressing active - the link is usable
            (Associating | Connected, AddressAssigned) => Connected,

            // Loss tears the link down from any state
            (_, Lost(_)) => Disconnected,

            // Default: stay in current state
            _ => self,
        }
    }
}
