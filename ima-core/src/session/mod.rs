//! Network session management
//!
//! Owns the connection lifecycle: static addressing, association,
//! reconnection after link loss, and the datagram socket the decoder reads
//! from. Reconnection is automatic and unbounded, but paced so a dead access
//! point does not spin the control loop.

mod events;
mod machine;

pub use events::LinkEvent;
pub use machine::LinkState;

use crate::config::NetConfig;
use crate::traits::{DatagramSocket, LinkControl};

/// Minimum time between re-association attempts while the link is down
pub const RETRY_INTERVAL_MS: u32 = 2000;

/// Network session manager
///
/// Maintains the invariant that the control socket is open if and only if
/// the link state is [`LinkState::Connected`].
pub struct Session<L, S> {
    link: L,
    socket: S,
    config: NetConfig,
    state: LinkState,
    retry_elapsed_ms: u32,
}

impl<L: LinkControl, S: DatagramSocket> Session<L, S> {
    /// Create a session; the link stays down until [`start`](Session::start)
    pub fn new(link: L, socket: S, config: NetConfig) -> Self {
        Self {
            link,
            socket,
            config,
            state: LinkState::Disconnected,
            retry_elapsed_ms: 0,
        }
    }

    /// Current connectivity phase
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Apply static addressing and begin association
    ///
    /// A static-configuration failure is fatal to correct addressing but
    /// not to the attempt: association is started regardless, matching the
    /// device's behavior in the field.
    pub fn start(&mut self) {
        if let Err(e) = self.link.configure_static(&self.config.static_addr) {
            log::error!("static address configuration failed: {:?}", e);
        }
        log::info!("associating with '{}'", self.config.ssid);
        self.link.connect();
        self.state = LinkState::Associating;
        self.retry_elapsed_ms = 0;
    }

    /// Drain pending link events and pace re-association
    ///
    /// `delta_ms` is the wall-clock time since the previous poll; it only
    /// feeds the retry pacer.
    pub fn poll(&mut self, delta_ms: u32) {
        while let Some(event) = self.link.poll_event() {
            self.handle_event(event);
        }

        // Re-kick association when the link stays down past the pacing
        // interval (covers attempts that die without a loss event).
        if !self.state.accepts_datagrams() {
            self.retry_elapsed_ms = self.retry_elapsed_ms.saturating_add(delta_ms);
            if self.retry_elapsed_ms >= RETRY_INTERVAL_MS {
                log::warn!("link still down, retrying association");
                self.start();
            }
        }
    }

    /// Read one pending datagram while connected
    ///
    /// Returns `None` immediately when disconnected, when nothing is
    /// pending, or when the socket reports an error (logged and treated as
    /// no data; the loop must not stall on a flaky read).
    pub fn recv(&mut self, buf: &mut [u8]) -> Option<usize> {
        if !self.state.accepts_datagrams() {
            return None;
        }
        match self.socket.try_recv(buf) {
            Ok(pending) => pending,
            Err(e) => {
                log::warn!("socket read failed: {:?}", e);
                None
            }
        }
    }

    fn handle_event(&mut self, event: LinkEvent) {
        let next = self.state.transition(event);
        if next == self.state {
            return;
        }

        match next {
            LinkState::Connected => {
                if let Err(e) = self.socket.open(self.config.port) {
                    // Without a socket the Connected state would violate
                    // the open-iff-connected invariant; treat as a loss.
                    log::error!("socket open failed: {:?}", e);
                    self.state = LinkState::Disconnected;
                    self.start();
                    return;
                }
                log::info!(
                    "link up, listening on port {}",
                    self.config.port
                );
                self.state = LinkState::Connected;
            }
            LinkState::Disconnected => {
                if self.state.accepts_datagrams() {
                    self.socket.close();
                }
                if let LinkEvent::Lost(reason) = event {
                    log::warn!("link lost, reason {}", reason);
                }
                self.state = LinkState::Disconnected;
                // Re-enter immediately; the pacer bounds later attempts
                self.start();
            }
            LinkState::Associating => {
                self.state = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{LinkError, SocketError};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Default)]
    struct LinkInner {
        events: VecDeque<LinkEvent>,
        configs: u32,
        connects: u32,
        fail_config: bool,
    }

    #[derive(Clone, Default)]
    struct MockLink(Rc<RefCell<LinkInner>>);

    impl MockLink {
        fn push(&self, event: LinkEvent) {
            self.0.borrow_mut().events.push_back(event);
        }
    }

    impl LinkControl for MockLink {
        fn configure_static(&mut self, _addr: &crate::config::StaticAddr) -> Result<(), LinkError> {
            let mut inner = self.0.borrow_mut();
            inner.configs += 1;
            if inner.fail_config {
                Err(LinkError::ConfigFailed)
            } else {
                Ok(())
            }
        }

        fn connect(&mut self) {
            self.0.borrow_mut().connects += 1;
        }

        fn poll_event(&mut self) -> Option<LinkEvent> {
            self.0.borrow_mut().events.pop_front()
        }
    }

    #[derive(Default)]
    struct SocketInner {
        open: bool,
        port: Option<u16>,
        queue: VecDeque<Vec<u8>>,
    }

    #[derive(Clone, Default)]
    struct MockSocket(Rc<RefCell<SocketInner>>);

    impl MockSocket {
        fn push(&self, datagram: &[u8]) {
            self.0.borrow_mut().queue.push_back(datagram.to_vec());
        }

        fn is_open(&self) -> bool {
            self.0.borrow().open
        }
    }

    impl DatagramSocket for MockSocket {
        fn open(&mut self, port: u16) -> Result<(), SocketError> {
            let mut inner = self.0.borrow_mut();
            inner.open = true;
            inner.port = Some(port);
            Ok(())
        }

        fn close(&mut self) {
            let mut inner = self.0.borrow_mut();
            inner.open = false;
            inner.queue.clear();
        }

        fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, SocketError> {
            let mut inner = self.0.borrow_mut();
            if !inner.open {
                return Err(SocketError::Closed);
            }
            match inner.queue.pop_front() {
                Some(datagram) => {
                    buf[..datagram.len()].copy_from_slice(&datagram);
                    Ok(Some(datagram.len()))
                }
                None => Ok(None),
            }
        }
    }

    fn session() -> (Session<MockLink, MockSocket>, MockLink, MockSocket) {
        let link = MockLink::default();
        let socket = MockSocket::default();
        let session = Session::new(link.clone(), socket.clone(), NetConfig::default());
        (session, link, socket)
    }

    #[test]
    fn test_start_configures_then_connects() {
        let (mut session, link, _socket) = session();
        session.start();

        assert_eq!(session.state(), LinkState::Associating);
        assert_eq!(link.0.borrow().configs, 1);
        assert_eq!(link.0.borrow().connects, 1);
    }

    #[test]
    fn test_config_failure_still_attempts_association() {
        let (mut session, link, _socket) = session();
        link.0.borrow_mut().fail_config = true;
        session.start();

        assert_eq!(session.state(), LinkState::Associating);
        assert_eq!(link.0.borrow().connects, 1);
    }

    #[test]
    fn test_address_assignment_opens_socket() {
        let (mut session, link, socket) = session();
        session.start();
        link.push(LinkEvent::Associated);
        link.push(LinkEvent::AddressAssigned);
        session.poll(0);

        assert_eq!(session.state(), LinkState::Connected);
        assert!(socket.is_open());
        assert_eq!(socket.0.borrow().port, Some(crate::config::CONTROL_PORT));
    }

    #[test]
    fn test_loss_closes_socket_and_reassociates() {
        let (mut session, link, socket) = session();
        session.start();
        link.push(LinkEvent::AddressAssigned);
        session.poll(0);
        assert!(socket.is_open());

        link.push(LinkEvent::Lost(8));
        session.poll(0);

        // Back to associating with a fresh attempt; socket unusable
        assert_eq!(session.state(), LinkState::Associating);
        assert!(!socket.is_open());
        assert_eq!(link.0.borrow().connects, 2);
    }

    #[test]
    fn test_no_replay_after_reconnect() {
        let (mut session, link, socket) = session();
        session.start();
        link.push(LinkEvent::AddressAssigned);
        session.poll(0);

        // Datagram buffered, then the link drops before it is read
        socket.push(b"stale");
        link.push(LinkEvent::Lost(8));
        session.poll(0);

        let mut buf = [0u8; 64];
        assert_eq!(session.recv(&mut buf), None);

        // Reassociate; the stale datagram is gone
        link.push(LinkEvent::AddressAssigned);
        session.poll(0);
        assert_eq!(session.state(), LinkState::Connected);
        assert_eq!(session.recv(&mut buf), None);

        // New traffic flows
        socket.push(b"fresh");
        assert_eq!(session.recv(&mut buf), Some(5));
        assert_eq!(&buf[..5], b"fresh");
    }

    #[test]
    fn test_recv_returns_none_while_disconnected() {
        let (mut session, _link, socket) = session();
        socket.push(b"early");

        let mut buf = [0u8; 64];
        assert_eq!(session.recv(&mut buf), None);
    }

    #[test]
    fn test_retry_is_paced() {
        let (mut session, link, _socket) = session();
        session.start();
        assert_eq!(link.0.borrow().connects, 1);

        // Polling below the pacing interval does not re-kick
        session.poll(RETRY_INTERVAL_MS / 2);
        assert_eq!(link.0.borrow().connects, 1);

        // Crossing it does, and the pacer re-arms
        session.poll(RETRY_INTERVAL_MS / 2);
        assert_eq!(link.0.borrow().connects, 2);
        session.poll(1);
        assert_eq!(link.0.borrow().connects, 2);
    }

    #[test]
    fn test_connected_session_does_not_retry() {
        let (mut session, link, _socket) = session();
        session.start();
        link.push(LinkEvent::AddressAssigned);
        session.poll(0);

        session.poll(RETRY_INTERVAL_MS * 10);
        assert_eq!(link.0.borrow().connects, 1);
    }
}
