//! Frame buffers and the top-level encode/decode pipeline.
//!
//! # Overview
//!
//! A [FrameBuffer] owns a compile-time-sized byte array large enough for
//! the worst-case frame of its (message, integrity, serdes) combination,
//! plus a used-length cursor. Build one with
//! [`frame_buffer!`](crate::frame_buffer!), which computes the capacity at
//! the call site:
//!
//! ```
//! use tightbeam::{frame_buffer, integrity, serdes::Packed};
//!
//! tightbeam::message! {
//!     pub struct Ping {
//!         id = 0x01;
//!         fields = {
//!             1 => seq: required scalar(u32),
//!         };
//!     }
//! }
//!
//! let mut ping = Ping::default();
//! ping.seq.set(7).unwrap();
//!
//! let mut buffer = frame_buffer!(Ping, integrity::Crc16, Packed);
//! tightbeam::encode(&mut buffer, &ping).unwrap();
//!
//! let mut out = Ping::default();
//! tightbeam::decode(&buffer, &mut out).unwrap();
//! assert_eq!(ping, out);
//! ```
//!
//! Encode: validate, write header, serialize payload, append the integrity
//! trailer. Decode: verify the trailer, validate the header, deserialize,
//! validate the result. First error wins throughout.

use crate::header;
use crate::integrity::Integrity;
use crate::message::{validate, Message};
use crate::serdes::{Serdes, Wire};
use crate::Error;
use core::fmt;
use core::marker::PhantomData;

/// Maximum frame length (header included) of a message type under a
/// serialization policy. Implemented per message by the
/// [`message!`](crate::message!) macro for each of the closed set of
/// policies, so buffer capacities are plain constants.
pub trait FrameSize<S> {
    /// The bound in bytes, excluding the integrity trailer.
    const MAX: usize;
}

/// Builds a [FrameBuffer] for a (message, integrity, serdes) combination,
/// sized exactly to the maximum frame plus trailer.
#[macro_export]
macro_rules! frame_buffer {
    ($m:ty, $i:ty, $s:ty) => {
        $crate::FrameBuffer::<$m, $i, $s, {
            <$m as $crate::FrameSize<$s>>::MAX + <$i as $crate::integrity::Integrity>::SIZE
        }>::new()
    };
}

/// Fixed-capacity storage for one encoded frame.
///
/// `N` must be at least the maximum frame size plus the integrity trailer;
/// this is checked at compile time when the buffer is constructed. Use
/// [`frame_buffer!`](crate::frame_buffer!) to compute `N` automatically.
pub struct FrameBuffer<M, I, S, const N: usize> {
    bytes: [u8; N],
    used: usize,
    _marker: PhantomData<(M, I, S)>,
}

impl<M, I, S, const N: usize> FrameBuffer<M, I, S, N>
where
    M: Message + FrameSize<S>,
    I: Integrity,
    S: Wire + Serdes<M>,
{
    const FITS: () = assert!(
        N >= <M as FrameSize<S>>::MAX + I::SIZE,
        "frame buffer capacity is below the maximum frame size"
    );

    /// Creates an empty buffer.
    pub fn new() -> Self {
        let () = Self::FITS;
        Self {
            bytes: [0; N],
            used: 0,
            _marker: PhantomData,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Length of the encoded frame currently held.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// The encoded frame: the used prefix of the storage.
    pub fn frame(&self) -> &[u8] {
        &self.bytes[..self.used]
    }

    /// The whole backing storage.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable access to the whole backing storage. The used length is not
    /// affected.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Copies a received frame into the buffer and records its length.
    pub fn load(&mut self, frame: &[u8]) -> Result<(), Error> {
        if frame.len() > N {
            return Err(Error::capacity_exceeded(0, "frame exceeds buffer capacity"));
        }
        self.bytes[..frame.len()].copy_from_slice(frame);
        self.used = frame.len();
        Ok(())
    }

    /// Discards any held frame.
    pub fn clear(&mut self) {
        self.used = 0;
    }
}

impl<M, I, S, const N: usize> Default for FrameBuffer<M, I, S, N>
where
    M: Message + FrameSize<S>,
    I: Integrity,
    S: Wire + Serdes<M>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M, I, S, const N: usize> fmt::Debug for FrameBuffer<M, I, S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &N)
            .field("used", &self.used)
            .finish()
    }
}

/// Validates `msg` and encodes it into `buffer`.
pub fn encode<M, I, S, const N: usize>(
    buffer: &mut FrameBuffer<M, I, S, N>,
    msg: &M,
) -> Result<(), Error>
where
    M: Message + FrameSize<S>,
    I: Integrity,
    S: Wire + Serdes<M>,
{
    validate(msg)?;
    encode_unchecked(buffer, msg);
    Ok(())
}

/// Encodes `msg` without validating it first.
///
/// Strictly the serialization pipeline: header, payload, trailer. Useful
/// for forwarding messages that are known-invalid or already validated.
pub fn encode_unchecked<M, I, S, const N: usize>(buffer: &mut FrameBuffer<M, I, S, N>, msg: &M)
where
    M: Message + FrameSize<S>,
    I: Integrity,
    S: Wire + Serdes<M>,
{
    let payload_limit = N - I::SIZE;
    header::write::<M, S>(&mut buffer.bytes);
    let written = S::encode(msg, &mut buffer.bytes[..payload_limit]);

    // The trailer covers everything written so far: header and payload.
    let tag = I::calculate(&buffer.bytes[..written]);
    buffer.bytes[written..written + I::SIZE].copy_from_slice(tag.as_ref());
    buffer.used = written + I::SIZE;
}

/// Decodes the frame held by `buffer` into `out`.
pub fn decode<M, I, S, const N: usize>(
    buffer: &FrameBuffer<M, I, S, N>,
    out: &mut M,
) -> Result<(), Error>
where
    M: Message + FrameSize<S>,
    I: Integrity,
    S: Wire + Serdes<M>,
{
    decode_frame::<M, I, S>(buffer.frame(), out)
}

/// Decodes an encoded frame from a byte slice into `out`.
///
/// The pipeline: integrity verification, header validation, payload
/// deserialization, then full message validation. On error `out` may hold
/// partially decoded state.
pub fn decode_frame<M, I, S>(input: &[u8], out: &mut M) -> Result<(), Error>
where
    M: Message,
    I: Integrity,
    S: Wire + Serdes<M>,
{
    if input.len() < I::SIZE {
        return Err(Error::deserialization("buffer too small for checksum"));
    }
    let payload = &input[..input.len() - I::SIZE];

    if I::SIZE > 0 {
        let expected = I::calculate(payload);
        if expected.as_ref() != &input[payload.len()..] {
            return Err(Error::integrity());
        }
    }

    header::validate::<M, S>(payload)?;
    S::decode(payload, out)?;
    validate(out)
}
