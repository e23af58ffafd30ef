//! Schema-driven, fixed-capacity binary message codec.
//!
//! # Overview
//!
//! Declare message schemas as typed definitions and get serializers and
//! deserializers whose maximum frame size is a compile-time constant. Built
//! for embedded and latency-sensitive environments: every field, buffer,
//! and validator has a compile-time-known size and is owned in place, so
//! the runtime path is straight-line memory I/O and arithmetic: no heap,
//! no global state, no await points.
//!
//! - **Schemas**: [`message!`](crate::message!) defines a struct of typed
//!   fields (scalar, string, array, map, submessage) with per-field
//!   presence and composable [validators].
//! - **Wire formats**: the static layouts ([`Packed`](serdes::Packed),
//!   [`Aligned4`](serdes::Aligned4), [`Aligned8`](serdes::Aligned8)) emit
//!   fixed-size field-order frames; [`Tlv`](serdes::Tlv) emits a
//!   self-describing tag-length-value stream.
//! - **Framing**: a 6-byte header (version, format, message id) plus an
//!   optional [integrity] trailer (`Parity`, `Crc16`).
//! - **Pipeline**: [encode] validates and serializes into a
//!   [FrameBuffer]; [decode] verifies, deserializes, and re-validates.
//!   [`decoder!`](crate::decoder!) dispatches one of several message types
//!   by header id.
//!
//! # Example
//!
//! ```
//! use tightbeam::{frame_buffer, integrity, message, serdes::Aligned4, validators::Positive};
//!
//! message! {
//!     /// Position report sent by field units.
//!     pub struct Position {
//!         id = 0x0101;
//!         fields = {
//!             1 => lat_e7: required scalar(i32),
//!             2 => lon_e7: required scalar(i32),
//!             3 => alt_cm: optional scalar(i32, Positive),
//!         };
//!     }
//! }
//!
//! let mut report = Position::default();
//! report.lat_e7.set(377_749_000).unwrap();
//! report.lon_e7.set(-1_224_194_000).unwrap();
//!
//! let mut buffer = frame_buffer!(Position, integrity::Crc16, Aligned4);
//! tightbeam::encode(&mut buffer, &report).unwrap();
//!
//! let mut received = Position::default();
//! tightbeam::decode(&buffer, &mut received).unwrap();
//! assert_eq!(report, received);
//! assert_eq!(received.alt_cm.get(), None);
//! ```

pub mod buffer;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod header;
pub mod integrity;
pub mod message;
pub mod serdes;
pub mod validators;
pub mod varint;

pub use buffer::{decode, decode_frame, encode, encode_unchecked, FrameBuffer, FrameSize};
pub use error::{Error, ErrorKind};
pub use message::{validate, Message};

/// Identifier of a field within a message. Unique per message; at most
/// [MAX_FIELD_ID] (the TLV tag reserves three bits for the wire type).
pub type FieldId = i32;

/// Identifier of a message type. Unique within any decoder set.
pub type MessageId = i32;

/// Largest representable field id: `2^29 - 1`.
pub const MAX_FIELD_ID: FieldId = (1 << 29) - 1;
