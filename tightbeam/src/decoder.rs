//! Multi-message decoding into a tagged union.
//!
//! [`decoder!`](crate::decoder!) defines an enum over a closed set of
//! message types and generates a `decode` method that peeks the frame
//! header, selects the branch whose message id matches, and runs the full
//! decode pipeline for it. Message ids must be pairwise distinct across the
//! set; duplicates fail to compile.
//!
//! ```
//! use tightbeam::{decoder, frame_buffer, integrity, message, serdes::Packed};
//!
//! message! {
//!     pub struct Start { id = 1; fields = { 1 => at: required scalar(u32), }; }
//! }
//! message! {
//!     pub struct Stop { id = 2; fields = { 1 => at: required scalar(u32), }; }
//! }
//!
//! decoder! {
//!     pub enum Command {
//!         Start(Start),
//!         Stop(Stop),
//!     }
//! }
//!
//! let mut stop = Stop::default();
//! stop.at.set(99).unwrap();
//! let mut buffer = frame_buffer!(Stop, integrity::Crc16, Packed);
//! tightbeam::encode(&mut buffer, &stop).unwrap();
//!
//! match Command::decode::<integrity::Crc16, Packed>(buffer.frame()).unwrap() {
//!     Command::Stop(msg) => assert_eq!(msg.at.get(), Some(99)),
//!     other => panic!("wrong branch: {other:?}"),
//! }
//! ```

/// Defines a tagged union over a closed set of message types, with a
/// header-dispatched `decode`.
#[macro_export]
macro_rules! decoder {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident ( $msg:ty ) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $( $variant($msg), )+
        }

        $crate::__tb_assert_unique_message_ids!($name; $($msg),+);

        impl $name {
            /// Decodes a frame into whichever branch matches the header's
            /// message id, or `InvalidMessageId` when none does.
            pub fn decode<I, S>(input: &[u8]) -> ::core::result::Result<Self, $crate::Error>
            where
                I: $crate::integrity::Integrity,
                S: $crate::serdes::Wire $( + $crate::serdes::Serdes<$msg> )+,
            {
                let header = $crate::header::parse(input)?;
                $(
                    if header.message_id == <$msg as $crate::Message>::MESSAGE_ID {
                        let mut msg = <$msg as ::core::default::Default>::default();
                        $crate::decode_frame::<$msg, I, S>(input, &mut msg)?;
                        return ::core::result::Result::Ok(Self::$variant(msg));
                    }
                )+
                ::core::result::Result::Err($crate::Error::invalid_message_id())
            }
        }
    };
}

/// Pairwise compile-time distinctness of message ids across a decoder.
#[macro_export]
#[doc(hidden)]
macro_rules! __tb_assert_unique_message_ids {
    ($name:ident; $head:ty) => {};
    ($name:ident; $head:ty, $($tail:ty),+) => {
        $(
            const _: () = assert!(
                <$head as $crate::Message>::MESSAGE_ID != <$tail as $crate::Message>::MESSAGE_ID,
                concat!("duplicate message id in decoder `", stringify!($name), "`")
            );
        )+
        $crate::__tb_assert_unique_message_ids!($name; $($tail),+);
    };
}
