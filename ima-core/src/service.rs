//! The cooperative control loop
//!
//! One iteration services the update listener, lets the session make
//! progress, and fully processes at most one datagram. There are no
//! suspension points: decode, dispatch, validate and drive all run to
//! completion before the next iteration. The socket's receive buffer is the
//! only queue.

use ima_protocol::{Message, MAX_PACKET_SIZE};

use crate::command::MagnetCommand;
use crate::dispatch::{route, Route};
use crate::handler;
use crate::session::{LinkState, Session};
use crate::traits::{DatagramSocket, LinkControl, MagnetBank, UpdateListener};

/// The magnet control service
///
/// Owns the magnet bank exclusively; nothing else mutates channel state.
pub struct MagnetService<B, L, S, U> {
    bank: B,
    session: Session<L, S>,
    updater: U,
    rx_buf: [u8; MAX_PACKET_SIZE],
}

impl<B, L, S, U> MagnetService<B, L, S, U>
where
    B: MagnetBank,
    L: LinkControl,
    S: DatagramSocket,
    U: UpdateListener,
{
    /// Assemble the service around its collaborators
    pub fn new(bank: B, session: Session<L, S>, updater: U) -> Self {
        Self {
            bank,
            session,
            updater,
            rx_buf: [0; MAX_PACKET_SIZE],
        }
    }

    /// Bring the network session up
    pub fn start(&mut self) {
        self.session.start();
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.session.state()
    }

    /// The magnet bank (for host-side inspection)
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Run one loop iteration
    ///
    /// `delta_ms` is the time since the previous iteration, used only for
    /// reconnect pacing.
    pub fn poll_once(&mut self, delta_ms: u32) {
        // The updater gets its turn unconditionally; it has its own
        // timeout-driven protocol.
        self.updater.poll();

        self.session.poll(delta_ms);

        let Some(len) = self.session.recv(&mut self.rx_buf) else {
            return;
        };

        let msg = match Message::decode(&self.rx_buf[..len]) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("discarding malformed datagram: {:?}", e);
                return;
            }
        };

        match route(&msg.address) {
            Some(Route::Magnet) => {
                let cmd = MagnetCommand::from_args(&msg.args);
                match handler::apply(&cmd, &mut self.bank) {
                    Ok(applied) => log::info!(
                        "configured magnet {} (channel {}): power {}",
                        applied.pin,
                        applied.channel,
                        applied.duty
                    ),
                    Err(e) => log::warn!("{}", e),
                }
            }
            // Unmatched addresses are ignored for forward compatibility
            None => {}
        }
    }
}
