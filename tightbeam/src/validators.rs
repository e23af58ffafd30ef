//! Composable value and presence validators.
//!
//! # Overview
//!
//! A validator is a zero-sized policy type implementing [Validator] for the
//! value types it constrains; which types a validator accepts is therefore
//! checked at compile time. Validators compose as tuples: `(V1, V2)` runs
//! `V1` then `V2` and returns the first failure. The unit type `()` (and its
//! named alias [Always]) accepts everything.
//!
//! Presence is a separate axis: [Required] and [Optional] implement
//! [Presence] and are consulted by the field wrapper before any value
//! validation runs.
//!
//! Compile-time operands are integer const generics; Rust does not admit
//! floating-point const parameters, so float thresholds are integer-valued
//! (compared in the value's own type) and arbitrary float sets go through
//! [OneOf] with an [AllowedValues] policy type.

use crate::{Error, FieldId};
use core::marker::PhantomData;

/// A pure predicate over a value and the id of the field holding it.
pub trait Validator<T: ?Sized> {
    /// Checks `value`, returning the first violation as a typed error.
    fn check(value: &T, field_id: FieldId) -> Result<(), Error>;
}

/// Accepts every value. Alias for the behavior of `()`.
pub struct Always;

impl<T: ?Sized> Validator<T> for Always {
    fn check(_: &T, _: FieldId) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: ?Sized> Validator<T> for () {
    fn check(_: &T, _: FieldId) -> Result<(), Error> {
        Ok(())
    }
}

// Ordered conjunction: the first failing member determines the error.
macro_rules! impl_validator_tuple {
    ($($v:ident),+) => {
        impl<T: ?Sized, $($v: Validator<T>),+> Validator<T> for ($($v,)+) {
            fn check(value: &T, field_id: FieldId) -> Result<(), Error> {
                $( $v::check(value, field_id)?; )+
                Ok(())
            }
        }
    };
}
impl_validator_tuple!(A);
impl_validator_tuple!(A, B);
impl_validator_tuple!(A, B, C);
impl_validator_tuple!(A, B, C, D);
impl_validator_tuple!(A, B, C, D, E);
impl_validator_tuple!(A, B, C, D, E, F);
impl_validator_tuple!(A, B, C, D, E, F, G);
impl_validator_tuple!(A, B, C, D, E, F, G, H);

// ---------- Presence ----------

/// Per-field presence policy, consulted before value validation.
pub trait Presence {
    /// Checks the is-set flag of the field identified by `field_id`.
    fn check(is_set: bool, field_id: FieldId) -> Result<(), Error>;
}

/// The field must be set.
pub struct Required;

impl Presence for Required {
    fn check(is_set: bool, field_id: FieldId) -> Result<(), Error> {
        if is_set {
            Ok(())
        } else {
            Err(Error::validation(field_id, "field is required but not set"))
        }
    }
}

/// The field may be left unset.
pub struct Optional;

impl Presence for Optional {
    fn check(_: bool, _: FieldId) -> Result<(), Error> {
        Ok(())
    }
}

// ---------- Sign and parity ----------

/// Value must be non-negative (>= 0).
pub struct Positive;

/// Value must be strictly negative (< 0).
pub struct Negative;

/// Value must not be zero.
pub struct NotZero;

macro_rules! impl_sign {
    ($($t:ty),+) => {
        $(
            impl Validator<$t> for Positive {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if *value >= 0 as $t {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be >= 0"))
                    }
                }
            }

            impl Validator<$t> for Negative {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if *value < 0 as $t {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be < 0"))
                    }
                }
            }
        )+
    };
}
impl_sign!(i8, i16, i32, i64, f32, f64);

macro_rules! impl_not_zero {
    ($($t:ty),+) => {
        $(
            impl Validator<$t> for NotZero {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if *value != 0 as $t {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be != 0"))
                    }
                }
            }
        )+
    };
}
impl_not_zero!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Integer must be even.
pub struct Even;

/// Integer must be odd.
pub struct Odd;

macro_rules! impl_parity {
    ($($t:ty),+) => {
        $(
            impl Validator<$t> for Even {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if *value % 2 == 0 {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be even"))
                    }
                }
            }

            impl Validator<$t> for Odd {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if *value % 2 != 0 {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be odd"))
                    }
                }
            }
        )+
    };
}
impl_parity!(i8, i16, i32, i64, u8, u16, u32, u64);

// ---------- Thresholds ----------

/// Value must be strictly below `LIMIT`.
pub struct LessThan<const LIMIT: i64>;

/// Value must be strictly above `LIMIT`.
pub struct GreaterThan<const LIMIT: i64>;

/// Value must be at most `LIMIT`.
pub struct LessThanOrEqualTo<const LIMIT: i64>;

/// Value must be at least `LIMIT`.
pub struct GreaterThanOrEqualTo<const LIMIT: i64>;

/// Value must equal `LIMIT`.
pub struct EqualTo<const LIMIT: i64>;

/// Value must not equal `LIMIT`.
pub struct NotEqualTo<const LIMIT: i64>;

// Integers widen to i128 before comparing so that u64 values beyond
// i64::MAX compare correctly; floats compare against the operand cast to
// their own type.
macro_rules! impl_threshold {
    ($name:ident, $op:tt, $msg:literal) => {
        impl_threshold!(@int $name, $op, $msg; i8, i16, i32, i64, u8, u16, u32, u64);
        impl_threshold!(@float $name, $op, $msg; f32, f64);
    };
    (@int $name:ident, $op:tt, $msg:literal; $($t:ty),+) => {
        $(
            impl<const LIMIT: i64> Validator<$t> for $name<LIMIT> {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if (*value as i128) $op (LIMIT as i128) {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, $msg))
                    }
                }
            }
        )+
    };
    (@float $name:ident, $op:tt, $msg:literal; $($t:ty),+) => {
        $(
            impl<const LIMIT: i64> Validator<$t> for $name<LIMIT> {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if (*value as f64) $op (LIMIT as f64) {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, $msg))
                    }
                }
            }
        )+
    };
}

impl_threshold!(LessThan, <, "must be < threshold");
impl_threshold!(GreaterThan, >, "must be > threshold");
impl_threshold!(LessThanOrEqualTo, <=, "must be <= threshold");
impl_threshold!(GreaterThanOrEqualTo, >=, "must be >= threshold");
impl_threshold!(EqualTo, ==, "must equal threshold");
impl_threshold!(NotEqualTo, !=, "must not equal threshold");

// ---------- Membership ----------

/// Supplies the allowed set for [OneOf].
///
/// ```
/// use tightbeam::validators::{AllowedValues, OneOf, Validator};
///
/// struct SmallPrimes;
/// impl AllowedValues<i32> for SmallPrimes {
///     const VALUES: &'static [i32] = &[2, 3, 5, 7];
/// }
///
/// assert!(OneOf::<SmallPrimes>::check(&5, 1).is_ok());
/// assert!(OneOf::<SmallPrimes>::check(&6, 1).is_err());
/// ```
pub trait AllowedValues<T: 'static> {
    /// The values the validator accepts.
    const VALUES: &'static [T];
}

/// Value must be one of the values enumerated by the policy `S`.
pub struct OneOf<S>(PhantomData<S>);

impl<T: PartialEq + 'static, S: AllowedValues<T>> Validator<T> for OneOf<S> {
    fn check(value: &T, field_id: FieldId) -> Result<(), Error> {
        for allowed in S::VALUES {
            if allowed == value {
                return Ok(());
            }
        }
        Err(Error::validation(field_id, "must be one of allowed values"))
    }
}

// ---------- Floating point ----------

/// Float must be finite (neither NaN nor infinite).
pub struct IsFinite;

impl Validator<f32> for IsFinite {
    fn check(value: &f32, field_id: FieldId) -> Result<(), Error> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must be finite"))
        }
    }
}

impl Validator<f64> for IsFinite {
    fn check(value: &f64, field_id: FieldId) -> Result<(), Error> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must be finite"))
        }
    }
}

/// `|value - TARGET| <= TOLERANCE`.
pub struct Around<const TARGET: i64, const TOLERANCE: i64>;

macro_rules! impl_around_int {
    ($($t:ty),+) => {
        $(
            impl<const TARGET: i64, const TOLERANCE: i64> Validator<$t> for Around<TARGET, TOLERANCE> {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    let delta = (*value as i128) - (TARGET as i128);
                    if delta.abs() <= TOLERANCE as i128 {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be around target"))
                    }
                }
            }
        )+
    };
}
impl_around_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_around_float {
    ($($t:ty),+) => {
        $(
            impl<const TARGET: i64, const TOLERANCE: i64> Validator<$t> for Around<TARGET, TOLERANCE> {
                fn check(value: &$t, field_id: FieldId) -> Result<(), Error> {
                    if ((*value as f64) - (TARGET as f64)).abs() <= TOLERANCE as f64 {
                        Ok(())
                    } else {
                        Err(Error::validation(field_id, "must be around target"))
                    }
                }
            }
        )+
    };
}
impl_around_float!(f32, f64);

// ---------- Booleans ----------

/// Boolean must be `true`.
pub struct True;

impl Validator<bool> for True {
    fn check(value: &bool, field_id: FieldId) -> Result<(), Error> {
        if *value {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must be true"))
        }
    }
}

/// Boolean must be `false`.
pub struct False;

impl Validator<bool> for False {
    fn check(value: &bool, field_id: FieldId) -> Result<(), Error> {
        if !*value {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must be false"))
        }
    }
}

// ---------- Containers ----------

/// Length in elements (bytes for strings), implemented by the container
/// views the field kinds hand to their validators.
pub trait Len {
    /// Current length of the container.
    fn length(&self) -> usize;
}

impl Len for str {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<E> Len for [E] {
    fn length(&self) -> usize {
        self.len()
    }
}

/// Container length must equal `N`.
pub struct Length<const N: usize>;

impl<const N: usize, T: ?Sized + Len> Validator<T> for Length<N> {
    fn check(value: &T, field_id: FieldId) -> Result<(), Error> {
        if value.length() == N {
            Ok(())
        } else {
            Err(Error::validation(field_id, "length mismatch"))
        }
    }
}

/// Container must hold at least `N` elements.
pub struct LengthAtLeast<const N: usize>;

impl<const N: usize, T: ?Sized + Len> Validator<T> for LengthAtLeast<N> {
    fn check(value: &T, field_id: FieldId) -> Result<(), Error> {
        if value.length() >= N {
            Ok(())
        } else {
            Err(Error::validation(field_id, "length must be at least N"))
        }
    }
}

/// Container must hold at most `N` elements.
pub struct LengthAtMost<const N: usize>;

impl<const N: usize, T: ?Sized + Len> Validator<T> for LengthAtMost<N> {
    fn check(value: &T, field_id: FieldId) -> Result<(), Error> {
        if value.length() <= N {
            Ok(())
        } else {
            Err(Error::validation(field_id, "length must be at most N"))
        }
    }
}

/// Container elements must be pairwise distinct.
///
/// O(n^2) scan; capacities are small compile-time constants so this avoids
/// sorting or allocating.
pub struct Unique;

impl<E: PartialEq> Validator<[E]> for Unique {
    fn check(value: &[E], field_id: FieldId) -> Result<(), Error> {
        for (i, a) in value.iter().enumerate() {
            for b in &value[i + 1..] {
                if a == b {
                    return Err(Error::validation(field_id, "elements must be unique"));
                }
            }
        }
        Ok(())
    }
}

// ---------- Strings ----------

/// Last byte of the string must be NUL.
///
/// Only the final byte is inspected; embedded NUL bytes earlier in the
/// string are not detected.
pub struct NullTerminated;

impl Validator<str> for NullTerminated {
    fn check(value: &str, field_id: FieldId) -> Result<(), Error> {
        let bytes = value.as_bytes();
        if !bytes.is_empty() && bytes[bytes.len() - 1] == 0 {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must count null terminator"))
        }
    }
}

/// Supplies the operand for [StringEquals] and [StringNotEquals].
pub trait StrValue {
    /// The compile-time string operand.
    const VALUE: &'static str;
}

/// String must equal the policy's `VALUE`.
pub struct StringEquals<S>(PhantomData<S>);

impl<S: StrValue> Validator<str> for StringEquals<S> {
    fn check(value: &str, field_id: FieldId) -> Result<(), Error> {
        if value == S::VALUE {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must equal expected string"))
        }
    }
}

/// String must not equal the policy's `VALUE`.
pub struct StringNotEquals<S>(PhantomData<S>);

impl<S: StrValue> Validator<str> for StringNotEquals<S> {
    fn check(value: &str, field_id: FieldId) -> Result<(), Error> {
        if value != S::VALUE {
            Ok(())
        } else {
            Err(Error::validation(field_id, "must not equal forbidden string"))
        }
    }
}
