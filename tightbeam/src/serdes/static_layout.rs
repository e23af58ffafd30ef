//! The static layout family: Packed, Aligned4, Aligned8.
//!
//! # Overview
//!
//! A deterministic, field-order binary layout parameterized by an alignment
//! `A` in {1, 4, 8}. The payload begins at the first multiple of `A` at or
//! after the 6-byte header. Per top-level field, in declaration order:
//!
//! - scalar / text / submessage fields emit a 1-byte is-set flag, then the
//!   value slot aligned to `min(value size, A)`;
//! - arrays and maps have no flag: a 4-byte little-endian length, then
//!   exactly `MAX` element slots (pairs of slots for maps).
//!
//! Unset fields still consume their zero-filled slot, and unused container
//! slots are zero-filled, so the frame length of a message type is a
//! compile-time constant: `encode` always writes exactly
//! `fields_end(A, payload_start)` bytes. Submessage slots align to `A` and
//! carry a 4-byte message id before their field sequence; the top-level
//! frame does not repeat the id (it lives in the header).
//!
//! All padding bytes are zero. Offset arithmetic is `const fn` so message
//! buffer capacities resolve at compile time.

use crate::fields::{Array, Element, Field, Map, Scalar, Text, Value};
use crate::header::HEADER_SIZE;
use crate::message::Message;
use crate::validators::Presence;
use crate::Error;

use super::{Format, Serdes, Wire};

/// Static layout with alignment `A` (1, 4, or 8).
pub struct StaticLayout<const A: usize>;

impl<const A: usize> Wire for StaticLayout<A> {
    const FORMAT: Format = {
        assert!(
            A == 1 || A == 4 || A == 8,
            "static layout alignment must be 1, 4, or 8"
        );
        match A {
            1 => Format::Packed,
            4 => Format::Aligned4,
            _ => Format::Aligned8,
        }
    };
}

/// Rounds `offset` up to a multiple of `align` (a power of two).
pub const fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

/// Rounds `offset` up to the alignment of a value of `size` bytes under
/// layout alignment `align`, i.e. to `min(size, align)`.
pub const fn pad_to(offset: usize, size: usize, align: usize) -> usize {
    let effective = if size < align { size } else { align };
    align_up(offset, effective)
}

/// End offset of a scalar slot of `width` bytes starting at `offset`.
pub const fn scalar_slot_end(width: usize, align: usize, offset: usize) -> usize {
    pad_to(offset, width, align) + width
}

/// End offset of a 4-byte length prefix starting at `offset`.
pub const fn length_prefix_end(align: usize, offset: usize) -> usize {
    pad_to(offset, 4, align) + 4
}

/// End offset of a text slot (length prefix plus `max` bytes).
pub const fn text_slot_end(max: usize, align: usize, offset: usize) -> usize {
    length_prefix_end(align, offset) + max
}

/// Zero-fills `out[from..to]`.
pub fn zero(out: &mut [u8], from: usize, to: usize) {
    out[from..to].fill(0);
}

fn write_len_prefix(len: usize, align: usize, out: &mut [u8], offset: usize) -> usize {
    let o = pad_to(offset, 4, align);
    zero(out, offset, o);
    out[o..o + 4].copy_from_slice(&(len as u32).to_le_bytes());
    o + 4
}

fn read_len_prefix(align: usize, input: &[u8], offset: usize) -> (usize, usize) {
    let o = pad_to(offset, 4, align);
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&input[o..o + 4]);
    (u32::from_le_bytes(bytes) as usize, o + 4)
}

/// Slot-level encoding of one value under the static layout.
///
/// Implemented for every field kind; the [`message!`](crate::message!)
/// macro implements it for each message type so submessages, array
/// elements, and map entries all share one walker.
pub trait StaticElement {
    /// End offset of the slot for a value starting at `offset`.
    fn slot_end(align: usize, offset: usize) -> usize;

    /// Writes the slot (padding included) and returns its end offset.
    fn write_slot(&self, align: usize, out: &mut [u8], offset: usize) -> usize;

    /// Reads the slot and returns its end offset.
    fn read_slot(&mut self, align: usize, input: &[u8], offset: usize) -> Result<usize, Error>;
}

impl<T: Value, V> StaticElement for Scalar<T, V> {
    fn slot_end(align: usize, offset: usize) -> usize {
        scalar_slot_end(T::WIDTH, align, offset)
    }

    fn write_slot(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
        let o = pad_to(offset, T::WIDTH, align);
        zero(out, offset, o);
        self.get().write_le(&mut out[o..o + T::WIDTH]);
        o + T::WIDTH
    }

    fn read_slot(&mut self, align: usize, input: &[u8], offset: usize) -> Result<usize, Error> {
        let o = pad_to(offset, T::WIDTH, align);
        let value = T::read_le(&input[o..o + T::WIDTH])?;
        self.set_without_validation(value);
        Ok(o + T::WIDTH)
    }
}

impl<const MAX: usize, V> StaticElement for Text<MAX, V> {
    fn slot_end(align: usize, offset: usize) -> usize {
        text_slot_end(MAX, align, offset)
    }

    fn write_slot(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
        let o = write_len_prefix(self.len(), align, out, offset);
        out[o..o + MAX].copy_from_slice(self.raw_bytes());
        o + MAX
    }

    fn read_slot(&mut self, align: usize, input: &[u8], offset: usize) -> Result<usize, Error> {
        let (len, o) = read_len_prefix(align, input, offset);
        if len > MAX {
            return Err(Error::capacity_exceeded(0, "deserialized string too long"));
        }
        let prefix = core::str::from_utf8(&input[o..o + len])
            .map_err(|_| Error::deserialization("string is not valid utf-8"))?;
        self.set_without_validation(prefix)?;
        Ok(o + MAX)
    }
}

impl<const ID: i32, E, const MAX: usize, V> StaticElement for Array<ID, E, MAX, V>
where
    E: Element + StaticElement,
{
    fn slot_end(align: usize, offset: usize) -> usize {
        let mut o = length_prefix_end(align, offset);
        for _ in 0..MAX {
            o = E::slot_end(align, o);
        }
        o
    }

    fn write_slot(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
        let mut o = write_len_prefix(self.len(), align, out, offset);
        for element in self.iter() {
            o = element.write_slot(align, out, o);
        }
        for _ in self.len()..MAX {
            let end = E::slot_end(align, o);
            zero(out, o, end);
            o = end;
        }
        o
    }

    fn read_slot(&mut self, align: usize, input: &[u8], offset: usize) -> Result<usize, Error> {
        let end = <Self as StaticElement>::slot_end(align, offset);
        let (len, mut o) = read_len_prefix(align, input, offset);
        if len > MAX {
            return Err(Error::capacity_exceeded(ID, "array capacity exceeded"));
        }
        self.clear();
        for _ in 0..len {
            let mut element = E::default();
            o = element.read_slot(align, input, o)?;
            self.add(element)?;
        }
        Ok(end)
    }
}

impl<const ID: i32, K, V, const MAX: usize, W> StaticElement for Map<ID, K, V, MAX, W>
where
    K: Element + StaticElement,
    V: Element + StaticElement,
{
    fn slot_end(align: usize, offset: usize) -> usize {
        let mut o = length_prefix_end(align, offset);
        for _ in 0..MAX {
            o = K::slot_end(align, o);
            o = V::slot_end(align, o);
        }
        o
    }

    fn write_slot(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
        let mut o = write_len_prefix(self.len(), align, out, offset);
        for (key, value) in self.iter() {
            o = key.write_slot(align, out, o);
            o = value.write_slot(align, out, o);
        }
        for _ in self.len()..MAX {
            let key_end = K::slot_end(align, o);
            zero(out, o, key_end);
            let value_end = V::slot_end(align, key_end);
            zero(out, key_end, value_end);
            o = value_end;
        }
        o
    }

    fn read_slot(&mut self, align: usize, input: &[u8], offset: usize) -> Result<usize, Error> {
        let end = <Self as StaticElement>::slot_end(align, offset);
        let (len, mut o) = read_len_prefix(align, input, offset);
        if len > MAX {
            return Err(Error::capacity_exceeded(ID, "map capacity exceeded"));
        }
        self.clear();
        for _ in 0..len {
            let mut key = K::default();
            o = key.read_slot(align, input, o)?;
            let mut value = V::default();
            o = value.read_slot(align, input, o)?;
            self.push_raw(key, value);
        }
        Ok(end)
    }
}

impl<const ID: i32, P: Presence, T: crate::fields::FieldValue + StaticElement>
    Field<ID, P, T>
{
    /// Writes the is-set flag and the value slot; an unset field zero-fills
    /// its entire slot so the frame length never varies.
    #[doc(hidden)]
    pub fn write_static(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
        let set = self.is_set();
        out[offset] = set as u8;
        let o = offset + 1;
        if set {
            self.inner().write_slot(align, out, o)
        } else {
            let end = T::slot_end(align, o);
            zero(out, o, end);
            end
        }
    }

    /// Restores the is-set flag and, when set, the value. Unset fields are
    /// cleared and their slot skipped without inspection.
    #[doc(hidden)]
    pub fn read_static(
        &mut self,
        align: usize,
        input: &[u8],
        offset: usize,
    ) -> Result<usize, Error> {
        let set = input[offset] != 0;
        let o = offset + 1;
        if set {
            let end = self
                .inner_mut()
                .read_slot(align, input, o)
                .map_err(|err| {
                    // Inner kinds do not know their field id; attribute
                    // their failures to this field.
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
            Ok(end)
        } else {
            self.clear();
            Ok(T::slot_end(align, o))
        }
    }
}

/// The static-layout walker over a message's fields, generated per message
/// by the [`message!`](crate::message!) macro.
pub trait StaticMessage: Message {
    /// End offset of the field block starting at `offset`; mirrors the
    /// `const fn` of the same shape used for buffer sizing.
    fn fields_end(align: usize, offset: usize) -> usize;

    /// Writes every field slot in declaration order.
    fn encode_fields(&self, align: usize, out: &mut [u8], offset: usize) -> usize;

    /// Reads every field slot in declaration order.
    fn decode_fields(&mut self, align: usize, input: &[u8], offset: usize)
        -> Result<usize, Error>;
}

impl<const A: usize, M: StaticMessage> Serdes<M> for StaticLayout<A> {
    fn encode(msg: &M, out: &mut [u8]) -> usize {
        let start = align_up(HEADER_SIZE, A);
        let frame = M::fields_end(A, start);
        assert!(
            out.len() >= frame,
            "output buffer smaller than the fixed frame size"
        );
        zero(out, HEADER_SIZE, start);
        msg.encode_fields(A, out, start)
    }

    fn decode(input: &[u8], msg: &mut M) -> Result<(), Error> {
        let start = align_up(HEADER_SIZE, A);
        let frame = M::fields_end(A, start);
        if input.len() < frame {
            return Err(Error::deserialization("buffer too small for static layout"));
        }
        msg.decode_fields(A, input, start)?;
        Ok(())
    }

    fn max_size() -> usize {
        M::fields_end(A, align_up(HEADER_SIZE, A))
    }
}
