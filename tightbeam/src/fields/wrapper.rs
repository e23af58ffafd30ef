//! The presence wrapper tying a field id and presence policy to a value.

use crate::validators::{Presence, Validator};
use crate::{Error, FieldId, MAX_FIELD_ID};
use core::fmt;
use core::marker::PhantomData;

use super::{Element, Scalar, Text, Value};

/// The contract for types that can sit inside a [Field]: scalars, text, and
/// messages. Supplies the kind-discriminated `set` argument and `get`
/// return types the wrapper exposes.
///
/// Implemented here for [Scalar] and [Text], and for each user message type
/// by the [`message!`](crate::message!) macro.
pub trait FieldValue: Element {
    /// Argument accepted by [`Field::set`]: the primitive for scalars,
    /// `&str` for text, the message value for submessages.
    type SetArg<'a>;

    /// View returned by [`Field::get`]: the primitive for scalars, `&str`
    /// for text, a message reference for submessages.
    type Ref<'a>
    where
        Self: 'a;

    /// Validates `value` and stores it, attributing errors to `field_id`.
    fn assign(&mut self, value: Self::SetArg<'_>, field_id: FieldId) -> Result<(), Error>;

    /// Returns the stored value.
    fn value_ref(&self) -> Self::Ref<'_>;
}

impl<T: Value, V: Validator<T>> FieldValue for Scalar<T, V> {
    type SetArg<'a> = T;
    type Ref<'a>
        = T
    where
        Self: 'a;

    fn assign(&mut self, value: T, field_id: FieldId) -> Result<(), Error> {
        self.set_with_id(value, field_id)
    }

    fn value_ref(&self) -> T {
        self.get()
    }
}

impl<const MAX: usize, V: Validator<str>> FieldValue for Text<MAX, V> {
    type SetArg<'a> = &'a str;
    type Ref<'a>
        = &'a str
    where
        Self: 'a;

    fn assign(&mut self, value: &str, field_id: FieldId) -> Result<(), Error> {
        self.set_with_id(value, field_id)
    }

    fn value_ref(&self) -> &str {
        self.get()
    }
}

/// Wraps a scalar, text, or submessage value with an is-set flag, a field
/// id, and a presence policy.
///
/// The inner value always exists (fields are plain in-place storage); the
/// flag decides whether [`get`](Field::get) exposes it and whether the wire
/// formats treat the field as present.
pub struct Field<const ID: i32, P, T> {
    value: T,
    set: bool,
    _presence: PhantomData<P>,
}

impl<const ID: i32, P: Presence, T: FieldValue> Field<ID, P, T> {
    const ID_OK: () = assert!(
        ID >= 0 && ID <= MAX_FIELD_ID,
        "field id exceeds the 29-bit tag range"
    );

    /// The field id this field was declared with.
    pub const FIELD_ID: FieldId = ID;

    /// Validates `value`, stores it, and marks the field set. On failure
    /// the prior value and flag are untouched.
    pub fn set(&mut self, value: T::SetArg<'_>) -> Result<(), Error> {
        let () = Self::ID_OK;
        self.value.assign(value, ID)?;
        self.set = true;
        Ok(())
    }

    /// Returns the value if the field is set.
    pub fn get(&self) -> Option<T::Ref<'_>> {
        if self.set {
            Some(self.value.value_ref())
        } else {
            None
        }
    }

    /// Whether the field is set.
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// Unsets the field and resets the value to its default.
    pub fn clear(&mut self) {
        self.set = false;
        self.value = T::default();
    }

    /// Checks the presence policy against the is-set flag.
    pub fn validate_presence(&self) -> Result<(), Error> {
        P::check(self.set, ID)
    }

    /// Validates the stored value; an unset field trivially passes.
    pub fn validate_value(&self) -> Result<(), Error> {
        if self.set {
            self.value.validate_element(ID)
        } else {
            Ok(())
        }
    }

    /// The stored value regardless of the is-set flag. The wire formats use
    /// this to reach storage directly.
    pub(crate) fn inner(&self) -> &T {
        &self.value
    }

    pub(crate) fn inner_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub(crate) fn mark_set(&mut self) {
        self.set = true;
    }

    pub(crate) fn reset_value(&mut self) {
        self.value = T::default();
    }
}

impl<const ID: i32, P: Presence, T: Value, V: Validator<T>> Field<ID, P, Scalar<T, V>> {
    /// Stores a scalar value without running validators, marking the field
    /// set. Used by the decode pipeline, which validates after the whole
    /// message is decoded.
    pub fn set_without_validation(&mut self, value: T) {
        self.value.set_without_validation(value);
        self.set = true;
    }
}

impl<const ID: i32, P: Presence, const MAX: usize, V: Validator<str>>
    Field<ID, P, Text<MAX, V>>
{
    /// Stores a string without running validators, marking the field set.
    /// Capacity remains enforced.
    pub fn set_without_validation(&mut self, value: &str) -> Result<(), Error> {
        self.value
            .set_without_validation(value)
            .map_err(|err| Error::capacity_exceeded(ID, err.message))?;
        self.set = true;
        Ok(())
    }
}

impl<const ID: i32, P, T: Default> Default for Field<ID, P, T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            set: false,
            _presence: PhantomData,
        }
    }
}

impl<const ID: i32, P, T: Clone> Clone for Field<ID, P, T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            set: self.set,
            _presence: PhantomData,
        }
    }
}

// Two unset fields are equal regardless of their (inaccessible) stored
// values.
impl<const ID: i32, P, T: PartialEq> PartialEq for Field<ID, P, T> {
    fn eq(&self, other: &Self) -> bool {
        if self.set != other.set {
            return false;
        }
        !self.set || self.value == other.value
    }
}

impl<const ID: i32, P, T: fmt::Debug> fmt::Debug for Field<ID, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.set {
            f.debug_tuple("Set").field(&self.value).finish()
        } else {
            f.write_str("Unset")
        }
    }
}
