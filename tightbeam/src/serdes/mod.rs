//! Serialization policies: the wire-format families.
//!
//! Two families exist. [StaticLayout] produces fixed-size, field-order
//! frames with configurable alignment (handy for DMA and fixed-offset
//! parsers on embedded receivers); [Tlv] produces a self-describing
//! tag-length-value stream that omits unset fields. Both write everything
//! after the common 6-byte header and report total frame length including
//! it.

pub mod static_layout;
pub mod tlv;

pub use static_layout::{StaticLayout, StaticMessage};
pub use tlv::{Tlv, TlvMessage};

use crate::message::Message;
use crate::Error;

/// Alias for [`StaticLayout<1>`]: no alignment padding.
pub type Packed = StaticLayout<1>;

/// Alias for [`StaticLayout<4>`]: 4-byte alignment padding.
pub type Aligned4 = StaticLayout<4>;

/// Alias for [`StaticLayout<8>`]: 8-byte alignment padding.
pub type Aligned8 = StaticLayout<8>;

/// Wire-format identifier carried in the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Format {
    /// Static layout without padding.
    Packed = 1,
    /// Static layout with 4-byte alignment.
    Aligned4 = 2,
    /// Static layout with 8-byte alignment.
    Aligned8 = 3,
    /// Tag-length-value layout.
    Tlv = 4,
}

/// Identifies a serialization policy on the wire.
pub trait Wire {
    /// The format byte written into the frame header.
    const FORMAT: Format;
}

/// A serialization policy for message type `M`.
///
/// `encode` receives the whole frame buffer (header already written at the
/// front), writes the payload after the header, and returns the total
/// length including the header. `decode` receives the frame minus the
/// integrity trailer.
pub trait Serdes<M: Message>: Wire {
    /// Writes the payload of `msg` and returns the frame length.
    fn encode(msg: &M, out: &mut [u8]) -> usize;

    /// Reads the payload into `msg`.
    fn decode(input: &[u8], msg: &mut M) -> Result<(), Error>;

    /// Upper bound on the frame length (header included) for any value of
    /// `M`. Exact for static layouts.
    fn max_size() -> usize;
}
