//! Field kinds: the typed storage cells that make up a message.
//!
//! Five kinds exist: [Scalar], [Text], [Array], [Map], and submessages
//! (any [`Message`](crate::Message) embedded by value). Scalars, text, and
//! submessages sit behind the presence wrapper [Field]; arrays and maps have
//! no presence flag ("set" means non-empty) and appear directly as message
//! members. Every kind is a plain value type with compile-time capacity:
//! messages own their fields in place and nothing allocates.

mod array;
mod map;
mod scalar;
mod text;
mod wrapper;

pub use array::Array;
pub use map::Map;
pub use scalar::{Scalar, Value};
pub use text::Text;
pub use wrapper::{Field, FieldValue};

use crate::{Error, FieldId};

/// Anything that can be stored inside an [Array] or [Map], or wrapped by
/// [Field]: scalars, text, arrays, maps, and messages.
///
/// Implemented by the field kinds in this module and, for each user message
/// type, by the [`message!`](crate::message!) macro.
pub trait Element: Default + Clone + PartialEq + core::fmt::Debug {
    /// Recursively validates the element, attributing errors to `field_id`
    /// where the element does not carry its own id.
    fn validate_element(&self, field_id: FieldId) -> Result<(), Error>;
}
