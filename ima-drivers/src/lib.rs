//! Hardware driver implementations for the Ima magnet controller
//!
//! Drivers implement the abstraction traits from `ima-core` on top of
//! `embedded-hal` peripherals.

#![no_std]
#![deny(unsafe_code)]

pub mod magnet;

pub use magnet::PwmMagnetBank;
