//! Firmware update listener
//!
//! A small HTTP endpoint accepts a raw firmware image and stages it in the
//! inactive OTA slot. The transfer runs on the HTTP server's own task; the
//! control loop only polls a completion flag, so updates never block
//! command processing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use esp_idf_svc::hal::reset::restart;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::{Read, Write};
use esp_idf_svc::ota::EspOta;
use ima_core::traits::UpdateListener;

/// HTTP-push OTA listener
pub struct OtaListener {
    staged: Arc<AtomicBool>,
    _server: EspHttpServer<'static>,
}

impl OtaListener {
    /// Start the update endpoint (`POST /update` with the raw image body)
    pub fn new() -> Result<Self> {
        let staged = Arc::new(AtomicBool::new(false));
        let mut server = EspHttpServer::new(&Configuration::default())?;

        let flag = staged.clone();
        server.fn_handler::<anyhow::Error, _>("/update", Method::Post, move |mut req| {
            log::info!("firmware update transfer started");

            let mut ota = EspOta::new()?;
            let mut update = ota.initiate_update()?;
            let mut buf = [0u8; 4096];
            let mut total = 0usize;
            loop {
                let read = req.read(&mut buf)?;
                if read == 0 {
                    break;
                }
                update.write_all(&buf[..read])?;
                total += read;
            }
            update.complete()?;

            log::info!("staged {} byte image in inactive slot", total);
            flag.store(true, Ordering::SeqCst);

            req.into_ok_response()?.write_all(b"update staged\n")?;
            Ok(())
        })?;

        Ok(Self {
            staged,
            _server: server,
        })
    }
}

impl UpdateListener for OtaListener {
    fn poll(&mut self) {
        if self.staged.load(Ordering::SeqCst) {
            log::info!("rebooting into updated firmware");
            restart();
        }
    }
}
