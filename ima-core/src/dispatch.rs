//! Address dispatch
//!
//! Decoded messages are routed by address pattern against a small static
//! table. Unmatched addresses are ignored without error so multi-purpose
//! senders can share the socket with future services.

/// Address pattern for magnet control
pub const MAGNET_ADDRESS: &str = "/ima";

/// Registered message routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// Magnet control handler
    Magnet,
}

/// Registered address patterns
const ROUTES: &[(&str, Route)] = &[(MAGNET_ADDRESS, Route::Magnet)];

/// Match an address pattern against the registered table
pub fn route(address: &str) -> Option<Route> {
    ROUTES
        .iter()
        .find(|(pattern, _)| *pattern == address)
        .map(|(_, route)| *route)
}
