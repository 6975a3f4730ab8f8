//! Board-agnostic core logic for the Ima magnet controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware and network abstraction traits (magnet bank, link, socket)
//! - Command interpretation for the accepted argument encodings
//! - Address dispatch and the magnet-control handler
//! - Link-session state machine with paced reconnection
//! - The cooperative control loop

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod config;
pub mod dispatch;
pub mod handler;
pub mod service;
pub mod session;
pub mod traits;
