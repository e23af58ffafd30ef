//! Error type shared by every codec operation.
//!
//! All failures are values of a single [Error] type carrying a kind, the id
//! of the field that caused the failure (0 when not applicable), and a static
//! message. Errors are constructed through the per-kind factories and compared
//! structurally, which keeps the decode paths branch-cheap and allocation-free.

use crate::FieldId;
use thiserror::Error;

/// Classifies a codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Checksum trailer did not match the frame contents.
    Integrity,
    /// Structural decode failure (short buffer, bad varint, unknown field, ...).
    Deserialization,
    /// A validator (field, container, presence, or cross-field) rejected a value.
    Validation,
    /// Header message id did not match the expected message type.
    InvalidMessageId,
    /// Header format byte did not match the expected wire format.
    InvalidFormat,
    /// A compile-time capacity would have been exceeded.
    CapacityExceeded,
}

/// A codec failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{message} (kind: {kind:?}, field: {field_id})")]
pub struct Error {
    /// What class of failure occurred.
    pub kind: ErrorKind,
    /// Field the failure is associated with, 0 when not applicable.
    pub field_id: FieldId,
    /// Static human-readable description.
    pub message: &'static str,
}

impl Error {
    /// Checksum mismatch on decode.
    pub const fn integrity() -> Self {
        Self {
            kind: ErrorKind::Integrity,
            field_id: 0,
            message: "integrity check failed",
        }
    }

    /// Structural decode failure with a cause-specific message.
    pub const fn deserialization(message: &'static str) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            field_id: 0,
            message,
        }
    }

    /// A validator rejected the value held by `field_id`.
    pub const fn validation(field_id: FieldId, message: &'static str) -> Self {
        Self {
            kind: ErrorKind::Validation,
            field_id,
            message,
        }
    }

    /// Header message id mismatch, or no decoder branch matched.
    pub const fn invalid_message_id() -> Self {
        Self {
            kind: ErrorKind::InvalidMessageId,
            field_id: 0,
            message: "invalid message id",
        }
    }

    /// Header format byte mismatch.
    pub const fn invalid_format() -> Self {
        Self {
            kind: ErrorKind::InvalidFormat,
            field_id: 0,
            message: "invalid serialization format",
        }
    }

    /// A fixed capacity (string, array, map, or buffer) would be exceeded.
    pub const fn capacity_exceeded(field_id: FieldId, message: &'static str) -> Self {
        Self {
            kind: ErrorKind::CapacityExceeded,
            field_id,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Error::integrity(), Error::integrity());
        assert_eq!(
            Error::validation(7, "must be even"),
            Error::validation(7, "must be even")
        );
        assert_ne!(
            Error::validation(7, "must be even"),
            Error::validation(8, "must be even")
        );
        assert_ne!(Error::invalid_format(), Error::invalid_message_id());
    }

    #[test]
    fn test_display() {
        let err = Error::validation(3, "must be > threshold");
        let rendered = err.to_string();
        assert!(rendered.contains("must be > threshold"));
        assert!(rendered.contains('3'));
    }

    #[test]
    fn test_field_id_defaults_to_zero() {
        assert_eq!(Error::integrity().field_id, 0);
        assert_eq!(Error::deserialization("truncated").field_id, 0);
        assert_eq!(Error::invalid_message_id().field_id, 0);
        assert_eq!(Error::invalid_format().field_id, 0);
    }
}
