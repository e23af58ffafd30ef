//! The fixed frame header shared by every wire format.
//!
//! Six bytes: a protocol version, the format byte of the serialization
//! policy, and the little-endian message id. The header is covered by the
//! integrity trailer along with the payload.

use crate::message::Message;
use crate::serdes::Wire;
use crate::{Error, MessageId};

/// Current protocol version, first byte of every frame.
pub const VERSION: u8 = 3;

/// Size of the frame header in bytes: version, format, message id.
pub const HEADER_SIZE: usize = 6;

/// Size of an encoded message id in bytes.
pub const MESSAGE_ID_SIZE: usize = 4;

/// A parsed frame header.
///
/// The format byte is kept raw; it is interpreted against the expected
/// serialization policy during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version byte.
    pub version: u8,
    /// Raw format byte.
    pub format: u8,
    /// Message type identifier.
    pub message_id: MessageId,
}

/// Parses the header from the front of `input`.
pub fn parse(input: &[u8]) -> Result<Header, Error> {
    if input.len() < HEADER_SIZE {
        return Err(Error::deserialization("buffer too small for header"));
    }
    let mut id_bytes = [0u8; MESSAGE_ID_SIZE];
    id_bytes.copy_from_slice(&input[2..HEADER_SIZE]);
    Ok(Header {
        version: input[0],
        format: input[1],
        message_id: MessageId::from_le_bytes(id_bytes),
    })
}

/// Writes the header for message type `M` under wire format `S`.
///
/// `out` must be at least [HEADER_SIZE] bytes.
pub fn write<M: Message, S: Wire>(out: &mut [u8]) {
    out[0] = VERSION;
    out[1] = S::FORMAT as u8;
    out[2..HEADER_SIZE].copy_from_slice(&M::MESSAGE_ID.to_le_bytes());
}

/// Parses the header and checks it against the expected message type and
/// wire format.
///
/// The three mismatches are distinct error kinds: an unsupported version is
/// a `Deserialization` error, a format mismatch `InvalidFormat`, and a
/// message-id mismatch `InvalidMessageId`.
pub fn validate<M: Message, S: Wire>(input: &[u8]) -> Result<(), Error> {
    let header = parse(input)?;
    if header.version != VERSION {
        return Err(Error::deserialization("unsupported protocol version"));
    }
    if header.format != S::FORMAT as u8 {
        return Err(Error::invalid_format());
    }
    if header.message_id != M::MESSAGE_ID {
        return Err(Error::invalid_message_id());
    }
    Ok(())
}
