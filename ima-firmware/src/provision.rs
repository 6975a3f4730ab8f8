//! First-boot Wi-Fi provisioning portal
//!
//! A fresh device has no credentials, so it raises its own access point
//! and serves a minimal credential form. Submitted credentials are stored
//! in NVS and the device restarts into normal operation. If the portal
//! cannot be established, or nobody provisions the device within the
//! window, the device restarts and tries again: there is no degraded mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::hal::reset::restart;
use esp_idf_svc::http::server::{Configuration as HttpConfiguration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::{Read, Write};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, Configuration, EspWifi};

use crate::config;

/// SSID of the provisioning access point
const PORTAL_SSID: &str = "eletroima";

/// Passphrase of the provisioning access point
const PORTAL_PASSWORD: &str = "imaimaima";

/// How long the portal stays up before the device gives up and restarts
const PORTAL_WINDOW: Duration = Duration::from_secs(300);

const PORTAL_PAGE: &str = "<!DOCTYPE html><html><body>\
<h1>eletroima setup</h1>\
<form method='post' action='/save'>\
SSID: <input name='ssid'><br>\
Password: <input name='password' type='password'><br>\
<input type='submit' value='Save'>\
</form></body></html>";

/// Run the provisioning portal; never returns
pub fn run(mut wifi: EspWifi<'static>, nvs: EspDefaultNvsPartition) -> Result<()> {
    log::warn!("no credentials stored, raising provisioning portal '{}'", PORTAL_SSID);

    let ap = AccessPointConfiguration {
        ssid: PORTAL_SSID.try_into().unwrap_or_default(),
        password: PORTAL_PASSWORD.try_into().unwrap_or_default(),
        auth_method: AuthMethod::WPA2Personal,
        ..Default::default()
    };
    wifi.set_configuration(&Configuration::AccessPoint(ap))?;
    wifi.start()?;

    let saved = Arc::new(AtomicBool::new(false));
    let mut server = EspHttpServer::new(&HttpConfiguration::default())?;

    server.fn_handler::<anyhow::Error, _>("/", Method::Get, |req| {
        req.into_ok_response()?.write_all(PORTAL_PAGE.as_bytes())?;
        Ok(())
    })?;

    let flag = saved.clone();
    server.fn_handler::<anyhow::Error, _>("/save", Method::Post, move |mut req| {
        let mut body = [0u8; 256];
        let len = req.read(&mut body)?;
        let body = std::str::from_utf8(&body[..len]).unwrap_or("");

        let ssid = form_field(body, "ssid");
        let password = form_field(body, "password");
        if ssid.is_empty() {
            req.into_status_response(400)?.write_all(b"ssid required\n")?;
            return Ok(());
        }

        config::store_credentials(nvs.clone(), &ssid, &password)?;
        flag.store(true, Ordering::SeqCst);
        req.into_ok_response()?
            .write_all(b"saved, device restarting\n")?;
        Ok(())
    })?;

    let deadline = std::time::Instant::now() + PORTAL_WINDOW;
    loop {
        if saved.load(Ordering::SeqCst) {
            log::info!("credentials stored, restarting into station mode");
            restart();
        }
        if std::time::Instant::now() > deadline {
            log::error!("provisioning window expired, restarting");
            restart();
        }
        std::thread::sleep(Duration::from_millis(250));
    }
}

/// Pull one field out of a urlencoded form body
fn form_field(body: &str, name: &str) -> String {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode(value))
        .unwrap_or_default()
}

/// Minimal percent decoding ('+' and %XX escapes)
fn percent_decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut bytes = input.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'+' => out.push(' '),
            b'%' => {
                let hi = bytes.next().and_then(hex_val);
                let lo = bytes.next().and_then(hex_val);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi << 4 | lo) as char);
                }
            }
            other => out.push(other as char),
        }
    }
    out
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
