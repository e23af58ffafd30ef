//! Message schemas and the `message!` definition macro.
//!
//! # Overview
//!
//! A message is a plain struct whose members are field kinds, declared
//! through [`message!`](crate::message!). The macro generates the struct
//! and every uniform walker the codec needs: the declaration-order
//! validation walk, both wire-format walkers, the `const fn` offset folds
//! that make frame sizes compile-time constants, and the
//! [`FrameSize`](crate::FrameSize) impls used by
//! [`frame_buffer!`](crate::frame_buffer!).
//!
//! ```
//! use tightbeam::validators::Positive;
//!
//! tightbeam::message! {
//!     /// A measurement report.
//!     pub struct Report {
//!         id = 0x0510;
//!         fields = {
//!             1 => reading: required scalar(i32, Positive),
//!             2 => label: optional text(16),
//!         };
//!     }
//! }
//!
//! let mut report = Report::default();
//! report.reading.set(42).unwrap();
//! assert!(tightbeam::validate(&report).is_ok());
//! ```
//!
//! Field kinds in the `fields` block:
//!
//! - `required`/`optional` `scalar(T [, V])`: primitive with validators;
//! - `required`/`optional` `text(MAX [, V])`: fixed-capacity string;
//! - `required`/`optional` `message(M)`: submessage by value;
//! - `array(ELEM, MAX [, V])`: fixed-capacity sequence (no presence);
//! - `map(KEY => VALUE, MAX [, V])`: fixed-capacity map (no presence).
//!
//! `ELEM`, `KEY`, and `VALUE` are themselves kind specs, so containers nest.
//! An optional `validate = |msg: &MyMessage| { .. };` entry adds a
//! cross-field check that runs after all field-level validation.
//!
//! Field ids must be pairwise distinct within a message; duplicates fail to
//! compile. Schemas form finite trees by construction: a message cannot
//! embed itself (directly or mutually), since members are stored by value.

use crate::{Error, MessageId};

/// A message schema: an identified, validatable set of fields.
///
/// Implemented by [`message!`](crate::message!); the walkers for the wire
/// formats live in the companion traits
/// [`StaticMessage`](crate::serdes::StaticMessage) and
/// [`TlvMessage`](crate::serdes::TlvMessage).
pub trait Message: Default + Clone + PartialEq + Sized {
    /// Unique identifier of this message type.
    const MESSAGE_ID: MessageId;

    /// Walks the fields in declaration order: presence first, then the
    /// field's own validation (recursing into set submessages). The first
    /// error wins.
    fn validate_fields(&self) -> Result<(), Error>;

    /// Cross-field validation hook; runs after every field has passed.
    fn validate(&self) -> Result<(), Error>;
}

/// Validates `msg` fully: field walk, then the cross-field hook.
pub fn validate<M: Message>(msg: &M) -> Result<(), Error> {
    msg.validate_fields()?;
    msg.validate()
}

/// Defines a message schema. See the [module docs](self) for the grammar.
#[macro_export]
macro_rules! message {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            id = $mid:expr;
            fields = { $($fields:tt)* };
            $(validate = $validate:expr;)?
        }
    ) => {
        $crate::__tb_normalize! {
            [] ($(#[$meta])*) ($vis) $name, $mid, ($($validate)?) ; $($fields)*
        }
    };
}

/// Rewrites each field declaration into the uniform bracketed form the
/// emitter matches on, then hands off to `__tb_emit`.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_normalize {
    ( [$($done:tt)*] $meta:tt $vis:tt $name:ident, $mid:expr, $validate:tt ; ) => {
        $crate::__tb_emit! { [$($done)*] $meta $vis $name, $mid, $validate }
    };
    ( [$($done:tt)*] $meta:tt $vis:tt $name:ident, $mid:expr, $validate:tt ;
      $fid:literal => $fname:ident : required $kind:ident $args:tt , $($rest:tt)* ) => {
        $crate::__tb_normalize! {
            [$($done)* [$fid, $fname, req, $kind $args]] $meta $vis $name, $mid, $validate ; $($rest)*
        }
    };
    ( [$($done:tt)*] $meta:tt $vis:tt $name:ident, $mid:expr, $validate:tt ;
      $fid:literal => $fname:ident : optional $kind:ident $args:tt , $($rest:tt)* ) => {
        $crate::__tb_normalize! {
            [$($done)* [$fid, $fname, opt, $kind $args]] $meta $vis $name, $mid, $validate ; $($rest)*
        }
    };
    ( [$($done:tt)*] $meta:tt $vis:tt $name:ident, $mid:expr, $validate:tt ;
      $fid:literal => $fname:ident : $kind:ident $args:tt , $($rest:tt)* ) => {
        $crate::__tb_normalize! {
            [$($done)* [$fid, $fname, bare, $kind $args]] $meta $vis $name, $mid, $validate ; $($rest)*
        }
    };
}

/// Generates the struct and every impl from the normalized field list.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_emit {
    (
        [$([$fid:literal, $fname:ident, $shape:ident, $kind:ident $args:tt])*]
        ($(#[$meta:meta])*) ($vis:vis) $name:ident, $mid:expr, ($($validate:expr)?)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( pub $fname: $crate::__tb_member_ty!($fid, $shape, $kind $args), )*
        }

        $crate::__tb_assert_unique_ids!($name; $($fid)*);

        impl $crate::Message for $name {
            const MESSAGE_ID: $crate::MessageId = $mid;

            fn validate_fields(&self) -> ::core::result::Result<(), $crate::Error> {
                $( $crate::__tb_validate_field!(self.$fname, $shape)?; )*
                ::core::result::Result::Ok(())
            }

            fn validate(&self) -> ::core::result::Result<(), $crate::Error> {
                $crate::__tb_cross_validate!(self, $($validate)?)
            }
        }

        impl $name {
            /// End offset of this message's static-layout field block when
            /// it starts at `offset` under alignment `align`.
            pub const fn static_fields_end(align: usize, offset: usize) -> usize {
                $( let offset = $crate::__tb_static_field_end!($shape, $kind $args, align, offset); )*
                offset
            }

            /// Exact static-layout frame size (header included) under
            /// alignment `align`.
            pub const fn static_frame_size(align: usize) -> usize {
                Self::static_fields_end(
                    align,
                    $crate::serdes::static_layout::align_up($crate::header::HEADER_SIZE, align),
                )
            }

            /// Upper bound on the TLV field block.
            pub const fn tlv_max_fields_size() -> usize {
                let mut size = 0usize;
                $(
                    size += $crate::serdes::tlv::TAG_MAX_LEN
                        + $crate::__tb_tlv_value_max!($kind $args);
                )*
                size
            }

            /// Upper bound on the TLV frame (header and payload length
            /// prefix included).
            pub const fn tlv_frame_size() -> usize {
                $crate::header::HEADER_SIZE + 4 + Self::tlv_max_fields_size()
            }
        }

        impl $crate::serdes::StaticMessage for $name {
            fn fields_end(align: usize, offset: usize) -> usize {
                Self::static_fields_end(align, offset)
            }

            fn encode_fields(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
                $( let offset = $crate::__tb_static_write_field!(self.$fname, $shape, align, out, offset); )*
                offset
            }

            fn decode_fields(
                &mut self,
                align: usize,
                input: &[u8],
                offset: usize,
            ) -> ::core::result::Result<usize, $crate::Error> {
                $( let offset = $crate::__tb_static_read_field!(self.$fname, $shape, align, input, offset)?; )*
                ::core::result::Result::Ok(offset)
            }
        }

        impl $crate::serdes::static_layout::StaticElement for $name {
            fn slot_end(align: usize, offset: usize) -> usize {
                let o = $crate::serdes::static_layout::align_up(offset, align);
                Self::static_fields_end(align, o + $crate::header::MESSAGE_ID_SIZE)
            }

            fn write_slot(&self, align: usize, out: &mut [u8], offset: usize) -> usize {
                let o = $crate::serdes::static_layout::align_up(offset, align);
                $crate::serdes::static_layout::zero(out, offset, o);
                out[o..o + $crate::header::MESSAGE_ID_SIZE]
                    .copy_from_slice(&<Self as $crate::Message>::MESSAGE_ID.to_le_bytes());
                $crate::serdes::StaticMessage::encode_fields(
                    self,
                    align,
                    out,
                    o + $crate::header::MESSAGE_ID_SIZE,
                )
            }

            fn read_slot(
                &mut self,
                align: usize,
                input: &[u8],
                offset: usize,
            ) -> ::core::result::Result<usize, $crate::Error> {
                let o = $crate::serdes::static_layout::align_up(offset, align);
                let mut id_bytes = [0u8; $crate::header::MESSAGE_ID_SIZE];
                id_bytes.copy_from_slice(&input[o..o + $crate::header::MESSAGE_ID_SIZE]);
                if $crate::MessageId::from_le_bytes(id_bytes) != <Self as $crate::Message>::MESSAGE_ID {
                    return ::core::result::Result::Err($crate::Error::invalid_message_id());
                }
                $crate::serdes::StaticMessage::decode_fields(
                    self,
                    align,
                    input,
                    o + $crate::header::MESSAGE_ID_SIZE,
                )
            }
        }

        impl $crate::serdes::TlvMessage for $name {
            fn max_tlv_size() -> usize {
                Self::tlv_max_fields_size()
            }

            fn encode_tlv_fields(&self, out: &mut [u8], offset: usize) -> usize {
                $( let offset = $crate::__tb_tlv_write_field!(self.$fname, $shape, out, offset); )*
                offset
            }

            fn decode_tlv_field(
                &mut self,
                id: $crate::FieldId,
                wire: u8,
                input: &[u8],
                offset: &mut usize,
            ) -> ::core::result::Result<bool, $crate::Error> {
                $(
                    if id == $fid {
                        $crate::__tb_tlv_read_field!(self.$fname, $shape, wire, input, offset)?;
                        return ::core::result::Result::Ok(true);
                    }
                )*
                ::core::result::Result::Ok(false)
            }
        }

        impl $crate::serdes::tlv::TlvElement for $name {
            const WIRE: u8 = $crate::serdes::tlv::WIRE_LEN_DELIMITED;
            const WIRE_ERR: &'static str = "nested msg requires length delimited";

            fn write_element(&self, out: &mut [u8], offset: usize) -> usize {
                $crate::serdes::tlv::write_nested(self, out, offset)
            }

            fn read_element(
                &mut self,
                input: &[u8],
                offset: &mut usize,
            ) -> ::core::result::Result<(), $crate::Error> {
                $crate::serdes::tlv::read_nested(self, input, offset)
            }
        }

        impl $crate::fields::Element for $name {
            fn validate_element(
                &self,
                _field_id: $crate::FieldId,
            ) -> ::core::result::Result<(), $crate::Error> {
                $crate::validate(self)
            }
        }

        impl $crate::fields::FieldValue for $name {
            type SetArg<'a> = $name;
            type Ref<'a>
                = &'a $name
            where
                Self: 'a;

            fn assign(
                &mut self,
                value: $name,
                _field_id: $crate::FieldId,
            ) -> ::core::result::Result<(), $crate::Error> {
                *self = value;
                ::core::result::Result::Ok(())
            }

            fn value_ref(&self) -> &$name {
                self
            }
        }

        impl $crate::FrameSize<$crate::serdes::StaticLayout<1>> for $name {
            const MAX: usize = Self::static_frame_size(1);
        }

        impl $crate::FrameSize<$crate::serdes::StaticLayout<4>> for $name {
            const MAX: usize = Self::static_frame_size(4);
        }

        impl $crate::FrameSize<$crate::serdes::StaticLayout<8>> for $name {
            const MAX: usize = Self::static_frame_size(8);
        }

        impl $crate::FrameSize<$crate::serdes::Tlv> for $name {
            const MAX: usize = Self::tlv_frame_size();
        }
    };
}

/// Pairwise compile-time distinctness of field ids.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_assert_unique_ids {
    ($name:ident; ) => {};
    ($name:ident; $head:literal $($tail:literal)*) => {
        $(
            const _: () = assert!(
                $head != $tail,
                concat!("duplicate field id in message `", stringify!($name), "`")
            );
        )*
        $crate::__tb_assert_unique_ids!($name; $($tail)*);
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __tb_cross_validate {
    ($self_:expr, ) => {
        ::core::result::Result::Ok(())
    };
    ($self_:expr, $validate:expr) => {
        ($validate)($self_)
    };
}

/// Member type for one normalized field declaration.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_member_ty {
    ($fid:literal, req, $kind:ident $args:tt) => {
        $crate::fields::Field<$fid, $crate::validators::Required, $crate::__tb_value_ty!($kind $args)>
    };
    ($fid:literal, opt, $kind:ident $args:tt) => {
        $crate::fields::Field<$fid, $crate::validators::Optional, $crate::__tb_value_ty!($kind $args)>
    };
    ($fid:literal, bare, array ($ek:ident $eargs:tt, $max:literal $(, $v:ty)?)) => {
        $crate::fields::Array<$fid, $crate::__tb_value_ty!($ek $eargs), $max, ($($v)?)>
    };
    ($fid:literal, bare, map ($kk:ident $kargs:tt => $vk:ident $vargs:tt, $max:literal $(, $w:ty)?)) => {
        $crate::fields::Map<
            $fid,
            $crate::__tb_value_ty!($kk $kargs),
            $crate::__tb_value_ty!($vk $vargs),
            $max,
            ($($w)?),
        >
    };
}

/// Storage type for a kind spec in value position (field inner type, array
/// element, map key or value).
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_value_ty {
    (scalar ($t:ty)) => { $crate::fields::Scalar<$t, ()> };
    (scalar ($t:ty, $v:ty)) => { $crate::fields::Scalar<$t, $v> };
    (text ($max:literal)) => { $crate::fields::Text<$max, ()> };
    (text ($max:literal, $v:ty)) => { $crate::fields::Text<$max, $v> };
    (message ($m:ty)) => { $m };
    (array ($ek:ident $eargs:tt, $max:literal $(, $v:ty)?)) => {
        $crate::fields::Array<0, $crate::__tb_value_ty!($ek $eargs), $max, ($($v)?)>
    };
    (map ($kk:ident $kargs:tt => $vk:ident $vargs:tt, $max:literal $(, $w:ty)?)) => {
        $crate::fields::Map<
            0,
            $crate::__tb_value_ty!($kk $kargs),
            $crate::__tb_value_ty!($vk $vargs),
            $max,
            ($($w)?),
        >
    };
}

/// Declaration-order validation of one field.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_validate_field {
    ($f:expr, req) => {{
        $f.validate_presence()?;
        $f.validate_value()
    }};
    ($f:expr, opt) => {{
        $f.validate_presence()?;
        $f.validate_value()
    }};
    ($f:expr, bare) => {
        $f.validate()
    };
}

/// Const end-offset of one field's static slot (is-set byte included for
/// wrapped kinds).
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_static_field_end {
    (req, $kind:ident $args:tt, $align:expr, $off:expr) => {
        $crate::__tb_static_value_end!($kind $args, $align, $off + 1)
    };
    (opt, $kind:ident $args:tt, $align:expr, $off:expr) => {
        $crate::__tb_static_value_end!($kind $args, $align, $off + 1)
    };
    (bare, $kind:ident $args:tt, $align:expr, $off:expr) => {
        $crate::__tb_static_value_end!($kind $args, $align, $off)
    };
}

/// Const end-offset of one value slot under the static layout.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_static_value_end {
    (scalar ($t:ty $(, $v:ty)?), $align:expr, $off:expr) => {
        $crate::serdes::static_layout::scalar_slot_end(
            <$t as $crate::fields::Value>::WIDTH,
            $align,
            $off,
        )
    };
    (text ($max:literal $(, $v:ty)?), $align:expr, $off:expr) => {
        $crate::serdes::static_layout::text_slot_end($max, $align, $off)
    };
    (message ($m:ty), $align:expr, $off:expr) => {{
        let __slot = $crate::serdes::static_layout::align_up($off, $align);
        <$m>::static_fields_end($align, __slot + $crate::header::MESSAGE_ID_SIZE)
    }};
    (array ($ek:ident $eargs:tt, $max:literal $(, $v:ty)?), $align:expr, $off:expr) => {{
        let mut __slot = $crate::serdes::static_layout::length_prefix_end($align, $off);
        let mut __i = 0usize;
        while __i < $max {
            __slot = $crate::__tb_static_value_end!($ek $eargs, $align, __slot);
            __i += 1;
        }
        __slot
    }};
    (map ($kk:ident $kargs:tt => $vk:ident $vargs:tt, $max:literal $(, $w:ty)?), $align:expr, $off:expr) => {{
        let mut __slot = $crate::serdes::static_layout::length_prefix_end($align, $off);
        let mut __i = 0usize;
        while __i < $max {
            __slot = $crate::__tb_static_value_end!($kk $kargs, $align, __slot);
            __slot = $crate::__tb_static_value_end!($vk $vargs, $align, __slot);
            __i += 1;
        }
        __slot
    }};
}

/// Const upper bound of one value's TLV body (length prefix included for
/// delimited kinds).
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_tlv_value_max {
    (scalar ($t:ty $(, $v:ty)?)) => {
        $crate::varint::MAX_LEN
    };
    (text ($max:literal $(, $v:ty)?)) => {
        $crate::varint::MAX_LEN + $max
    };
    (message ($m:ty)) => {
        $crate::varint::MAX_LEN + <$m>::tlv_max_fields_size()
    };
    (array ($ek:ident $eargs:tt, $max:literal $(, $v:ty)?)) => {
        $crate::varint::MAX_LEN
            + $crate::varint::MAX_LEN
            + $max * $crate::__tb_tlv_value_max!($ek $eargs)
    };
    (map ($kk:ident $kargs:tt => $vk:ident $vargs:tt, $max:literal $(, $w:ty)?)) => {
        $crate::varint::MAX_LEN
            + $crate::varint::MAX_LEN
            + $max
                * ($crate::__tb_tlv_value_max!($kk $kargs)
                    + $crate::__tb_tlv_value_max!($vk $vargs))
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __tb_static_write_field {
    ($f:expr, req, $align:expr, $out:expr, $off:expr) => {
        $f.write_static($align, $out, $off)
    };
    ($f:expr, opt, $align:expr, $out:expr, $off:expr) => {
        $f.write_static($align, $out, $off)
    };
    ($f:expr, bare, $align:expr, $out:expr, $off:expr) => {
        $crate::serdes::static_layout::StaticElement::write_slot(&$f, $align, $out, $off)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __tb_static_read_field {
    ($f:expr, req, $align:expr, $input:expr, $off:expr) => {
        $f.read_static($align, $input, $off)
    };
    ($f:expr, opt, $align:expr, $input:expr, $off:expr) => {
        $f.read_static($align, $input, $off)
    };
    ($f:expr, bare, $align:expr, $input:expr, $off:expr) => {
        $crate::serdes::static_layout::StaticElement::read_slot(&mut $f, $align, $input, $off)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __tb_tlv_write_field {
    ($f:expr, req, $out:expr, $off:expr) => {
        $f.write_tlv($out, $off)
    };
    ($f:expr, opt, $out:expr, $off:expr) => {
        $f.write_tlv($out, $off)
    };
    ($f:expr, bare, $out:expr, $off:expr) => {
        $f.write_tlv_tagged($out, $off)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __tb_tlv_read_field {
    ($f:expr, req, $wire:expr, $input:expr, $off:expr) => {
        $f.read_tlv($wire, $input, $off)
    };
    ($f:expr, opt, $wire:expr, $input:expr, $off:expr) => {
        $f.read_tlv($wire, $input, $off)
    };
    ($f:expr, bare, $wire:expr, $input:expr, $off:expr) => {
        $f.read_tlv_tagged($wire, $input, $off)
    };
}
