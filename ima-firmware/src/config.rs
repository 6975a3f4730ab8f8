//! Configuration loading
//!
//! The defaults are compiled in from `magnet.toml`; Wi-Fi credentials
//! captured by the provisioning portal live in NVS and take precedence.

use anyhow::{anyhow, Context, Result};
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};
use heapless::String as HString;
use ima_core::config::{NetConfig, StaticAddr};
use serde::Deserialize;

/// Embedded default configuration (compiled into firmware)
const EMBEDDED_CONFIG: &str = include_str!("../magnet.toml");

/// NVS namespace holding provisioned credentials
pub const NVS_NAMESPACE: &str = "ima";

#[derive(Debug, Deserialize)]
struct RawConfig {
    wifi: RawWifi,
    network: RawNetwork,
}

#[derive(Debug, Deserialize)]
struct RawWifi {
    ssid: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RawNetwork {
    hostname: String,
    address: String,
    gateway: String,
    netmask: String,
    port: u16,
}

/// Load the effective network configuration
pub fn load(nvs: EspDefaultNvsPartition) -> Result<NetConfig> {
    let raw: RawConfig =
        toml::from_str(EMBEDDED_CONFIG).context("embedded magnet.toml is invalid")?;

    let mut config = NetConfig {
        ssid: bounded(&raw.wifi.ssid)?,
        password: bounded(&raw.wifi.password)?,
        hostname: bounded(&raw.network.hostname)?,
        static_addr: StaticAddr {
            address: parse_quad(&raw.network.address)?,
            gateway: parse_quad(&raw.network.gateway)?,
            netmask: parse_quad(&raw.network.netmask)?,
        },
        port: raw.network.port,
    };

    // Provisioned credentials override the embedded defaults
    let store = EspNvs::new(nvs, NVS_NAMESPACE, true)?;
    let mut buf = [0u8; 128];
    if let Ok(Some(ssid)) = store.get_str("ssid", &mut buf) {
        config.ssid = bounded(ssid)?;
        let mut buf = [0u8; 128];
        if let Ok(Some(password)) = store.get_str("password", &mut buf) {
            config.password = bounded(password)?;
        }
    }

    Ok(config)
}

/// Persist portal-provided credentials
pub fn store_credentials(nvs: EspDefaultNvsPartition, ssid: &str, password: &str) -> Result<()> {
    let mut store = EspNvs::new(nvs, NVS_NAMESPACE, true)?;
    store.set_str("ssid", ssid)?;
    store.set_str("password", password)?;
    Ok(())
}

fn bounded<const N: usize>(s: &str) -> Result<HString<N>> {
    HString::try_from(s).map_err(|_| anyhow!("'{}' exceeds {} bytes", s, N))
}

fn parse_quad(s: &str) -> Result<[u8; 4]> {
    let mut quad = [0u8; 4];
    let mut parts = s.split('.');
    for octet in &mut quad {
        *octet = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| anyhow!("bad IPv4 literal '{}'", s))?;
    }
    if parts.next().is_some() {
        return Err(anyhow!("bad IPv4 literal '{}'", s));
    }
    Ok(quad)
}
