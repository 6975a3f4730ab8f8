//! Ima - networked electromagnet array firmware for ESP32 boards
//!
//! Eight LEDC PWM channels drive the magnet bridges; OSC datagrams on UDP
//! port 5005 set per-channel power. All control logic lives in `ima-core`;
//! this binary only wires it to ESP-IDF services.

use std::time::Instant;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::mdns::EspMdns;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use ima_core::config::{MAGNET_PINS, PWM_FREQ_HZ};
use ima_core::service::MagnetService;
use ima_core::session::Session;
use ima_drivers::PwmMagnetBank;

mod config;
mod net;
mod ota;
mod provision;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();
    log::info!("ima firmware starting");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let cfg = config::load(nvs.clone())?;

    // One LEDC timer at 5 kHz / 8 bit shared by every magnet channel
    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(PWM_FREQ_HZ))
            .resolution(Resolution::Bits8),
    )?;
    let pins = peripherals.pins;
    let channels = [
        LedcDriver::new(peripherals.ledc.channel0, &timer, pins.gpio13)?,
        LedcDriver::new(peripherals.ledc.channel1, &timer, pins.gpio14)?,
        LedcDriver::new(peripherals.ledc.channel2, &timer, pins.gpio15)?,
        LedcDriver::new(peripherals.ledc.channel3, &timer, pins.gpio16)?,
        LedcDriver::new(peripherals.ledc.channel4, &timer, pins.gpio17)?,
        LedcDriver::new(peripherals.ledc.channel5, &timer, pins.gpio18)?,
        LedcDriver::new(peripherals.ledc.channel6, &timer, pins.gpio19)?,
        LedcDriver::new(peripherals.ledc.channel7, &timer, pins.gpio21)?,
    ];
    let bank = PwmMagnetBank::new(channels, MAGNET_PINS);
    log::info!("magnet bank initialized ({} channels)", MAGNET_PINS.len());

    let wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs.clone()))?;

    // A fresh device has no credentials; hand the radio to the portal.
    // Normal operation resumes after the post-provisioning restart.
    if cfg.ssid.is_empty() {
        return provision::run(wifi, nvs);
    }

    let link = net::EspLink::new(wifi, &sysloop, cfg.clone())?;
    let session = Session::new(link, net::UdpControlSocket::new(), cfg.clone());
    let updater = ota::OtaListener::new()?;

    let mut mdns = EspMdns::take()?;
    mdns.set_hostname(cfg.hostname.as_str())?;
    mdns.add_service(None, "_osc", "_udp", cfg.port, &[])?;

    let mut service = MagnetService::new(bank, session, updater);
    service.start();

    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        let delta_ms = now.duration_since(last).as_millis().min(u32::MAX as u128) as u32;
        last = now;

        service.poll_once(delta_ms);
        FreeRtos::delay_ms(10);
    }
}
