//! The tag-length-value layout.
//!
//! # Overview
//!
//! After the common header comes a 4-byte little-endian payload length,
//! then a sequence of fields, each `[tag varint][body]` with
//! `tag = (field_id << 3) | wire_type`. Two wire types exist: `Varint` (0)
//! for scalars and `LengthDelimited` (1) for everything else. Unset fields
//! are omitted entirely; required-field enforcement happens in the
//! post-decode validation walk.
//!
//! Arrays and maps are always packed: one length-delimited body holding a
//! varint element count followed by tag-free element bodies. Scalars travel
//! as varints (bools as 0/1, signed integers two's-complement zero-extended,
//! floats by bit pattern); strings as raw bytes; submessages as nested
//! field sequences without an inner header.
//!
//! Length-delimited writers reserve the maximum varint width for the
//! length, write the body, then back-patch and shift the body left when the
//! actual length encodes shorter.

use crate::fields::{Array, Element, Field, Map, Scalar, Text, Value};
use crate::header::HEADER_SIZE;
use crate::message::Message;
use crate::validators::{Presence, Validator};
use crate::varint;
use crate::{Error, FieldId};

use super::{Format, Serdes, Wire};

/// The TLV serialization policy.
pub struct Tlv;

impl Wire for Tlv {
    const FORMAT: Format = Format::Tlv;
}

/// Wire type for varint-encoded scalar bodies.
pub const WIRE_VARINT: u8 = 0;

/// Wire type for `[varint length][bytes]` bodies.
pub const WIRE_LEN_DELIMITED: u8 = 1;

/// Number of tag bits reserved for the wire type.
const WIRE_TYPE_BITS: usize = 3;

/// Maximum encoded length of a tag varint: 32 id bits plus 3 wire-type
/// bits, `ceil(35 / 7)`.
pub const TAG_MAX_LEN: usize = 5;

fn write_tag(id: FieldId, wire: u8, out: &mut [u8], offset: usize) -> usize {
    let tag = ((id as u32 as u64) << WIRE_TYPE_BITS) | wire as u64;
    offset + varint::write(tag, &mut &mut out[offset..])
}

/// Back-patches a length-delimited body: the length varint was reserved at
/// maximum width before `content_start`; encode the real length and shift
/// the body left by the unused reservation.
fn finish_length_prefix(
    out: &mut [u8],
    len_offset: usize,
    content_start: usize,
    end: usize,
) -> usize {
    let content_len = end - content_start;
    let prefix_len = varint::size(content_len as u64);
    if prefix_len < varint::MAX_LEN {
        out.copy_within(content_start..end, len_offset + prefix_len);
    }
    varint::write(content_len as u64, &mut &mut out[len_offset..]);
    len_offset + prefix_len + content_len
}

/// Reads a varint length prefix and bounds-checks it against the remaining
/// input.
fn read_length_prefix(
    input: &[u8],
    offset: &mut usize,
    varint_err: &'static str,
    bounds_err: &'static str,
) -> Result<usize, Error> {
    let Some((len, consumed)) = varint::read_at(input, *offset) else {
        return Err(Error::deserialization(varint_err));
    };
    *offset += consumed;
    let Ok(len) = usize::try_from(len) else {
        return Err(Error::deserialization(bounds_err));
    };
    if input.len() - *offset < len {
        return Err(Error::deserialization(bounds_err));
    }
    Ok(len)
}

/// Writes a nested message as a length-delimited field sequence.
pub fn write_nested<M: TlvMessage>(msg: &M, out: &mut [u8], offset: usize) -> usize {
    let len_offset = offset;
    let content_start = offset + varint::MAX_LEN;
    let end = msg.encode_tlv_fields(out, content_start);
    finish_length_prefix(out, len_offset, content_start, end)
}

/// Reads a nested message from a length-delimited field sequence.
pub fn read_nested<M: TlvMessage>(
    msg: &mut M,
    input: &[u8],
    offset: &mut usize,
) -> Result<(), Error> {
    let len = read_length_prefix(input, offset, "invalid message length", "buffer underflow")?;
    read_fields(&input[*offset..*offset + len], msg)?;
    *offset += len;
    Ok(())
}

/// Decodes a field sequence, dispatching each tag to the message's fields.
///
/// An unknown field id aborts the decode; a repeated non-array id
/// overwrites the earlier value (last wins), while repeated array and map
/// tags append.
pub fn read_fields<M: TlvMessage>(input: &[u8], msg: &mut M) -> Result<(), Error> {
    let mut offset = 0;
    while offset < input.len() {
        let Some((tag, consumed)) = varint::read_at(input, offset) else {
            return Err(Error::deserialization("invalid tag varint"));
        };
        offset += consumed;

        let id = ((tag >> WIRE_TYPE_BITS) as u32) as FieldId;
        let wire = (tag & 0x07) as u8;

        if !msg.decode_tlv_field(id, wire, input, &mut offset)? {
            return Err(Error::deserialization("unknown fields present"));
        }
    }
    Ok(())
}

/// Body-level encoding of one value, tag-free, as used inside packed
/// containers and behind field tags.
///
/// Implemented for every field kind; the [`message!`](crate::message!)
/// macro implements it per message type.
pub trait TlvElement {
    /// The wire type a tagged occurrence of this kind must carry.
    const WIRE: u8;

    /// Error for a tagged occurrence with the wrong wire type.
    const WIRE_ERR: &'static str;

    /// Writes the body and returns the end offset.
    fn write_element(&self, out: &mut [u8], offset: usize) -> usize;

    /// Reads the body, advancing `offset`.
    fn read_element(&mut self, input: &[u8], offset: &mut usize) -> Result<(), Error>;
}

impl<T: Value, V> TlvElement for Scalar<T, V> {
    const WIRE: u8 = WIRE_VARINT;
    const WIRE_ERR: &'static str = "scalar must be varint";

    fn write_element(&self, out: &mut [u8], offset: usize) -> usize {
        offset + varint::write(self.get().to_bits(), &mut &mut out[offset..])
    }

    fn read_element(&mut self, input: &[u8], offset: &mut usize) -> Result<(), Error> {
        let Some((bits, consumed)) = varint::read_at(input, *offset) else {
            return Err(Error::deserialization("invalid varint"));
        };
        *offset += consumed;
        self.set_without_validation(T::from_bits(bits)?);
        Ok(())
    }
}

impl<const MAX: usize, V: Validator<str>> TlvElement for Text<MAX, V> {
    const WIRE: u8 = WIRE_LEN_DELIMITED;
    const WIRE_ERR: &'static str = "string requires length delimited";

    fn write_element(&self, out: &mut [u8], offset: usize) -> usize {
        let value = self.get();
        let o = offset + varint::write(value.len() as u64, &mut &mut out[offset..]);
        out[o..o + value.len()].copy_from_slice(value.as_bytes());
        o + value.len()
    }

    fn read_element(&mut self, input: &[u8], offset: &mut usize) -> Result<(), Error> {
        let len = read_length_prefix(input, offset, "invalid string length", "buffer underflow")?;
        let value = core::str::from_utf8(&input[*offset..*offset + len])
            .map_err(|_| Error::deserialization("string is not valid utf-8"))?;
        // Capacity and validators are enforced here, during decode; the
        // error surfaces immediately rather than in the post-decode walk.
        self.set(value)?;
        *offset += len;
        Ok(())
    }
}

impl<const ID: i32, E, const MAX: usize, V> TlvElement for Array<ID, E, MAX, V>
where
    E: Element + TlvElement,
{
    const WIRE: u8 = WIRE_LEN_DELIMITED;
    const WIRE_ERR: &'static str = "array must be length delimited";

    fn write_element(&self, out: &mut [u8], offset: usize) -> usize {
        let len_offset = offset;
        let content_start = offset + varint::MAX_LEN;
        let mut o =
            content_start + varint::write(self.len() as u64, &mut &mut out[content_start..]);
        for element in self.iter() {
            o = element.write_element(out, o);
        }
        finish_length_prefix(out, len_offset, content_start, o)
    }

    fn read_element(&mut self, input: &[u8], offset: &mut usize) -> Result<(), Error> {
        let len = read_length_prefix(input, offset, "invalid array length", "array underflow")?;
        let body = &input[*offset..*offset + len];
        let mut pos = 0usize;
        let Some((count, consumed)) = varint::read_at(body, pos) else {
            return Err(Error::deserialization("invalid array count"));
        };
        pos += consumed;
        // Appends rather than replaces: a repeated array tag extends the
        // array, and capacity violations surface through `add`.
        for _ in 0..count {
            let mut element = E::default();
            element.read_element(body, &mut pos)?;
            self.add(element)?;
        }
        *offset += len;
        Ok(())
    }
}

impl<const ID: i32, K, V, const MAX: usize, W> TlvElement for Map<ID, K, V, MAX, W>
where
    K: Element + TlvElement,
    V: Element + TlvElement,
{
    const WIRE: u8 = WIRE_LEN_DELIMITED;
    const WIRE_ERR: &'static str = "map must be length delimited";

    fn write_element(&self, out: &mut [u8], offset: usize) -> usize {
        let len_offset = offset;
        let content_start = offset + varint::MAX_LEN;
        let mut o =
            content_start + varint::write(self.len() as u64, &mut &mut out[content_start..]);
        for (key, value) in self.iter() {
            o = key.write_element(out, o);
            o = value.write_element(out, o);
        }
        finish_length_prefix(out, len_offset, content_start, o)
    }

    fn read_element(&mut self, input: &[u8], offset: &mut usize) -> Result<(), Error> {
        let len = read_length_prefix(input, offset, "could not decode map length", "map underflow")?;
        let body = &input[*offset..*offset + len];
        let mut pos = 0usize;
        let Some((count, consumed)) = varint::read_at(body, pos) else {
            return Err(Error::deserialization("invalid map count"));
        };
        pos += consumed;
        for _ in 0..count {
            let mut key = K::default();
            key.read_element(body, &mut pos)?;
            let mut value = V::default();
            value.read_element(body, &mut pos)?;
            // Inserting validates the pair and rejects duplicate keys.
            self.insert(key, value)?;
        }
        *offset += len;
        Ok(())
    }
}

impl<const ID: i32, P: Presence, T: crate::fields::FieldValue + TlvElement> Field<ID, P, T> {
    /// Writes `[tag][body]` when set; unset fields emit nothing.
    #[doc(hidden)]
    pub fn write_tlv(&self, out: &mut [u8], offset: usize) -> usize {
        if !self.is_set() {
            return offset;
        }
        let o = write_tag(ID, T::WIRE, out, offset);
        self.inner().write_element(out, o)
    }

    /// Decodes a tagged occurrence of this field. A repeated id fully
    /// replaces the earlier value (last wins).
    #[doc(hidden)]
    pub fn read_tlv(
        &mut self,
        wire: u8,
        input: &[u8],
        offset: &mut usize,
    ) -> Result<(), Error> {
        if wire != T::WIRE {
            return Err(Error::deserialization(T::WIRE_ERR));
        }
        self.reset_value();
        self.inner_mut()
            .read_element(input, offset)
            .map_err(|err| {
                // Inner kinds do not know their field id; attribute their
                // failures to this field.
                if err.field_id == 0 {
                    Error {
                        field_id: ID,
                        ..err
                    }
                } else {
                    err
                }
            })?;
        self.mark_set();
        Ok(())
    }
}

impl<const ID: i32, E, const MAX: usize, V> Array<ID, E, MAX, V>
where
    E: Element + TlvElement,
{
    /// Writes `[tag][body]` when non-empty; empty arrays emit nothing.
    #[doc(hidden)]
    pub fn write_tlv_tagged(&self, out: &mut [u8], offset: usize) -> usize {
        if self.is_empty() {
            return offset;
        }
        let o = write_tag(ID, WIRE_LEN_DELIMITED, out, offset);
        self.write_element(out, o)
    }

    #[doc(hidden)]
    pub fn read_tlv_tagged(
        &mut self,
        wire: u8,
        input: &[u8],
        offset: &mut usize,
    ) -> Result<(), Error> {
        if wire != WIRE_LEN_DELIMITED {
            return Err(Error::deserialization(
                <Self as TlvElement>::WIRE_ERR,
            ));
        }
        self.read_element(input, offset)
    }
}

impl<const ID: i32, K, V, const MAX: usize, W> Map<ID, K, V, MAX, W>
where
    K: Element + TlvElement,
    V: Element + TlvElement,
{
    /// Writes `[tag][body]` when non-empty; empty maps emit nothing.
    #[doc(hidden)]
    pub fn write_tlv_tagged(&self, out: &mut [u8], offset: usize) -> usize {
        if self.is_empty() {
            return offset;
        }
        let o = write_tag(ID, WIRE_LEN_DELIMITED, out, offset);
        self.write_element(out, o)
    }

    #[doc(hidden)]
    pub fn read_tlv_tagged(
        &mut self,
        wire: u8,
        input: &[u8],
        offset: &mut usize,
    ) -> Result<(), Error> {
        if wire != WIRE_LEN_DELIMITED {
            return Err(Error::deserialization(
                <Self as TlvElement>::WIRE_ERR,
            ));
        }
        self.read_element(input, offset)
    }
}

/// The TLV walker over a message's fields, generated per message by the
/// [`message!`](crate::message!) macro.
pub trait TlvMessage: Message {
    /// Upper bound on the encoded field block.
    fn max_tlv_size() -> usize;

    /// Writes every set field as `[tag][body]` in declaration order.
    fn encode_tlv_fields(&self, out: &mut [u8], offset: usize) -> usize;

    /// Decodes one tagged field by id, returning `Ok(false)` for an unknown
    /// id.
    fn decode_tlv_field(
        &mut self,
        id: FieldId,
        wire: u8,
        input: &[u8],
        offset: &mut usize,
    ) -> Result<bool, Error>;
}

impl<M: TlvMessage> Serdes<M> for Tlv {
    fn encode(msg: &M, out: &mut [u8]) -> usize {
        assert!(
            out.len() >= <Self as Serdes<M>>::max_size(),
            "output buffer smaller than the maximum frame size"
        );
        let len_offset = HEADER_SIZE;
        let payload_start = len_offset + 4;
        let end = msg.encode_tlv_fields(out, payload_start);
        let payload_len = (end - payload_start) as u32;
        out[len_offset..payload_start].copy_from_slice(&payload_len.to_le_bytes());
        end
    }

    fn decode(input: &[u8], msg: &mut M) -> Result<(), Error> {
        if input.len() < HEADER_SIZE + 4 {
            return Err(Error::deserialization("buffer too small for tlv length"));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&input[HEADER_SIZE..HEADER_SIZE + 4]);
        let payload_len = u32::from_le_bytes(len_bytes) as usize;

        let payload_start = HEADER_SIZE + 4;
        if input.len() - payload_start < payload_len {
            return Err(Error::deserialization("tlv length exceeds buffer"));
        }
        read_fields(&input[payload_start..payload_start + payload_len], msg)
    }

    fn max_size() -> usize {
        HEADER_SIZE + 4 + M::max_tlv_size()
    }
}
