//! OSC wire-format subset for the Ima magnet controller
//!
//! This crate decodes the Open Sound Control messages the controller
//! accepts over UDP. Only the subset actually spoken by magnet senders is
//! implemented: single messages (no bundles) with `i`, `f` and `s` typed
//! arguments.
//!
//! # Wire format
//!
//! Every datagram is one self-describing message:
//! ```text
//! ┌──────────────────┬──────────────────┬─────────────────────┐
//! │ ADDRESS          │ TYPE TAGS        │ ARGUMENTS           │
//! │ "/ima\0..." pad4 │ ",is\0..." pad4  │ per-tag encoding    │
//! └──────────────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! Strings are NUL-terminated and padded to a 4-byte boundary; `i` is a
//! big-endian i32 and `f` a big-endian IEEE-754 f32. Malformed envelopes
//! fail with a [`DecodeError`] and never yield a partial message.

#![no_std]
#![deny(unsafe_code)]

pub mod args;
pub mod packet;

pub use args::{Arg, MAX_STR_LEN, TAG_FLOAT, TAG_INT, TAG_STRING};
pub use packet::{
    DecodeError, EncodeError, Message, MAX_ADDRESS_LEN, MAX_ARGS, MAX_PACKET_SIZE,
};
