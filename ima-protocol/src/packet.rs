//! Message decoding and encoding
//!
//! A datagram holds exactly one message: a padded address string, a padded
//! type-tag string (`,` followed by one tag per argument), then the
//! arguments in tag order. The decoder consumes the whole envelope or fails;
//! a failed decode never produces a partial message.

use heapless::{String, Vec};

use crate::args::{Arg, TAG_FLOAT, TAG_INT, TAG_STRING};

/// Largest datagram the decoder accepts
///
/// Control messages are tiny; this bounds the receive buffer well below the
/// UDP MTU.
pub const MAX_PACKET_SIZE: usize = 512;

/// Maximum address pattern length
pub const MAX_ADDRESS_LEN: usize = 32;

/// Maximum number of arguments per message
pub const MAX_ARGS: usize = 4;

/// Errors that can occur while decoding a datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Datagram ended before the envelope was complete
    Truncated,
    /// Address pattern does not start with '/'
    BadAddress,
    /// Bundles ("#bundle") are not supported
    Bundle,
    /// Type tag string missing its ',' prefix
    BadTypeTags,
    /// Argument carries a tag the decoder does not understand
    UnsupportedTag(u8),
    /// A string field is not valid UTF-8
    BadString,
    /// Address pattern exceeds [`MAX_ADDRESS_LEN`]
    AddressTooLong,
    /// String argument exceeds [`MAX_STR_LEN`]
    StringTooLong,
    /// Message carries more than [`MAX_ARGS`] arguments
    TooManyArgs,
}

/// Errors that can occur while encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer too small for the encoded message
    BufferTooSmall,
}

/// A decoded or constructed message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    /// Address pattern routing this message to a handler
    pub address: String<MAX_ADDRESS_LEN>,
    /// Typed argument list
    pub args: Vec<Arg, MAX_ARGS>,
}

impl Message {
    /// Build a message from parts (for tests and host-side senders)
    pub fn new(address: &str, args: &[Arg]) -> Result<Self, EncodeError> {
        let address = String::try_from(address).map_err(|_| EncodeError::BufferTooSmall)?;
        let mut vec = Vec::new();
        for arg in args {
            vec.push(arg.clone()).map_err(|_| EncodeError::BufferTooSmall)?;
        }
        Ok(Self { address, args: vec })
    }

    /// Decode one complete datagram into a message
    pub fn decode(datagram: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(datagram);

        let address = reader.read_padded_str()?;
        if address.starts_with('#') {
            return Err(DecodeError::Bundle);
        }
        if !address.starts_with('/') {
            return Err(DecodeError::BadAddress);
        }
        let address =
            String::try_from(address).map_err(|_| DecodeError::AddressTooLong)?;

        let tags = reader.read_padded_str()?;
        let tags = tags.strip_prefix(',').ok_or(DecodeError::BadTypeTags)?;

        let mut args = Vec::new();
        for tag in tags.bytes() {
            let arg = match tag {
                TAG_INT => Arg::Int(i32::from_be_bytes(reader.read_word()?)),
                TAG_FLOAT => Arg::Float(f32::from_be_bytes(reader.read_word()?)),
                TAG_STRING => {
                    let s = reader.read_padded_str()?;
                    Arg::Str(String::try_from(s).map_err(|_| DecodeError::StringTooLong)?)
                }
                other => return Err(DecodeError::UnsupportedTag(other)),
            };
            args.push(arg).map_err(|_| DecodeError::TooManyArgs)?;
        }

        Ok(Self { address, args })
    }

    /// Encode this message into a byte buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let mut writer = Writer::new(buffer);

        writer.write_padded_str(&self.address)?;

        let mut tags = Vec::<u8, { MAX_ARGS + 1 }>::new();
        let _ = tags.push(b',');
        for arg in &self.args {
            let _ = tags.push(arg.tag());
        }
        writer.write_padded_bytes(&tags)?;

        for arg in &self.args {
            match arg {
                Arg::Int(v) => writer.write(&v.to_be_bytes())?,
                Arg::Float(v) => writer.write(&v.to_be_bytes())?,
                Arg::Str(s) => writer.write_padded_str(s)?,
            }
        }

        Ok(writer.pos)
    }
}

/// Cursor over an incoming datagram
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read a NUL-terminated string and skip its 4-byte padding
    fn read_padded_str(&mut self) -> Result<&'a str, DecodeError> {
        let rest = &self.buf[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::Truncated)?;
        // String field occupies len + 1..4 NUL bytes, total a multiple of 4
        let padded = (nul + 4) & !3;
        if padded > rest.len() {
            return Err(DecodeError::Truncated);
        }
        let s = core::str::from_utf8(&rest[..nul]).map_err(|_| DecodeError::BadString)?;
        self.pos += padded;
        Ok(s)
    }

    /// Read one 4-byte big-endian word
    fn read_word(&mut self) -> Result<[u8; 4], DecodeError> {
        let rest = &self.buf[self.pos..];
        if rest.len() < 4 {
            return Err(DecodeError::Truncated);
        }
        let word = [rest[0], rest[1], rest[2], rest[3]];
        self.pos += 4;
        Ok(word)
    }
}

/// Cursor over an outgoing buffer
struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(EncodeError::BufferTooSmall);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn write_padded_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.write(bytes)?;
        let pad = 4 - (bytes.len() % 4);
        self.write(&[0u8; 4][..pad])
    }

    fn write_padded_str(&mut self, s: &str) -> Result<(), EncodeError> {
        self.write_padded_bytes(s.as_bytes())
    }
}
