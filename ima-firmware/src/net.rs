//! esp-idf implementations of the core network traits
//!
//! ESP-IDF raises Wi-Fi and IP events on the system event loop; this module
//! funnels them into a channel the session manager drains synchronously, so
//! all connectivity decisions happen on the control loop.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, UdpSocket};
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::Result;
use esp_idf_svc::eventloop::{EspSubscription, EspSystemEventLoop, System};
use esp_idf_svc::ipv4;
use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi, WifiEvent};
use ima_core::config::{NetConfig, StaticAddr};
use ima_core::session::LinkEvent;
use ima_core::traits::{DatagramSocket, LinkControl, LinkError, SocketError};

/// Wi-Fi station link driving the session state machine
pub struct EspLink {
    wifi: EspWifi<'static>,
    events: Receiver<LinkEvent>,
    config: NetConfig,
    _wifi_sub: EspSubscription<'static, System>,
    _ip_sub: EspSubscription<'static, System>,
}

impl EspLink {
    /// Wrap a Wi-Fi driver and subscribe to its link events
    pub fn new(
        wifi: EspWifi<'static>,
        sysloop: &EspSystemEventLoop,
        config: NetConfig,
    ) -> Result<Self> {
        let (tx, events) = channel();

        let wifi_tx: Sender<LinkEvent> = tx.clone();
        let wifi_sub = sysloop.subscribe::<WifiEvent, _>(move |event| {
            // The IDF logs the detailed disconnect reason itself; the
            // session only needs the loss signal.
            let mapped = match event {
                WifiEvent::StaConnected(_) => Some(LinkEvent::Associated),
                WifiEvent::StaDisconnected(_) => Some(LinkEvent::Lost(0)),
                _ => None,
            };
            if let Some(event) = mapped {
                let _ = wifi_tx.send(event);
            }
        })?;

        // Any station IP event means our addressing is active
        let ip_sub = sysloop.subscribe::<esp_idf_svc::netif::IpEvent, _>(move |_| {
            let _ = tx.send(LinkEvent::AddressAssigned);
        })?;

        Ok(Self {
            wifi,
            events,
            config,
            _wifi_sub: wifi_sub,
            _ip_sub: ip_sub,
        })
    }
}

impl LinkControl for EspLink {
    fn configure_static(&mut self, addr: &StaticAddr) -> Result<(), LinkError> {
        let settings = ipv4::ClientSettings {
            ip: Ipv4Addr::from(addr.address),
            subnet: ipv4::Subnet {
                gateway: Ipv4Addr::from(addr.gateway),
                mask: ipv4::Mask(prefix_len(addr.netmask)),
            },
            dns: None,
            secondary_dns: None,
        };

        let netif = EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: Some(ipv4::Configuration::Client(
                ipv4::ClientConfiguration::Fixed(settings),
            )),
            ..NetifConfiguration::wifi_default_client()
        })
        .map_err(|_| LinkError::ConfigFailed)?;

        self.wifi
            .swap_netif_sta(netif)
            .map(|_| ())
            .map_err(|_| LinkError::ConfigFailed)
    }

    fn connect(&mut self) {
        let client = ClientConfiguration {
            ssid: self.config.ssid.clone(),
            password: self.config.password.clone(),
            ..Default::default()
        };

        // Failures surface as a missing Associated event; the session's
        // retry pacer re-enters here.
        if let Err(e) = self.wifi.set_configuration(&Configuration::Client(client)) {
            log::error!("wifi configuration rejected: {}", e);
            return;
        }
        if !self.wifi.is_started().unwrap_or(false) {
            if let Err(e) = self.wifi.start() {
                log::error!("wifi start failed: {}", e);
                return;
            }
        }
        if let Err(e) = self.wifi.connect() {
            log::error!("wifi connect failed: {}", e);
        }
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.events.try_recv().ok()
    }
}

/// Count of leading one bits in a dotted-quad netmask
fn prefix_len(netmask: [u8; 4]) -> u8 {
    netmask.iter().map(|octet| octet.count_ones() as u8).sum()
}

/// Non-blocking UDP control socket
#[derive(Default)]
pub struct UdpControlSocket {
    socket: Option<UdpSocket>,
}

impl UdpControlSocket {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatagramSocket for UdpControlSocket {
    fn open(&mut self, port: u16) -> Result<(), SocketError> {
        let socket =
            UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).map_err(|_| SocketError::Io)?;
        socket.set_nonblocking(true).map_err(|_| SocketError::Io)?;
        self.socket = Some(socket);
        Ok(())
    }

    fn close(&mut self) {
        self.socket = None;
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, SocketError> {
        let Some(socket) = &self.socket else {
            return Err(SocketError::Closed);
        };
        match socket.recv_from(buf) {
            Ok((len, _peer)) => Ok(Some(len)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(_) => Err(SocketError::Io),
        }
    }
}
