//! Fixed-capacity key-value fields.

use crate::validators::Validator;
use crate::{Error, FieldId, MAX_FIELD_ID};
use core::fmt;
use core::marker::PhantomData;

use super::Element;

/// A fixed-capacity map stored as insertion-ordered pairs.
///
/// Keys are unique under element equality; [`insert`](Map::insert) rejects
/// duplicates. Lookup and removal are linear scans, and equality is
/// order-independent set equality (O(n^2)); capacities are small
/// compile-time constants, so no ordering or hashing is maintained.
pub struct Map<const ID: i32, K, V, const MAX: usize, W = ()> {
    items: [(K, V); MAX],
    len: usize,
    _validators: PhantomData<W>,
}

impl<const ID: i32, K, V, const MAX: usize, W> Map<ID, K, V, MAX, W> {
    const ID_OK: () = assert!(
        ID >= 0 && ID <= MAX_FIELD_ID,
        "field id exceeds the 29-bit tag range"
    );

    /// The field id this map was declared with.
    pub const FIELD_ID: FieldId = ID;

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read-only view of the stored pairs in insertion order.
    pub fn entries(&self) -> &[(K, V)] {
        &self.items[..self.len]
    }

    /// Iterates over the stored pairs in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, (K, V)> {
        self.entries().iter()
    }

    /// Removes all pairs.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const ID: i32, K: Element, V: Element, const MAX: usize, W> Map<ID, K, V, MAX, W> {
    /// Validates and inserts a pair.
    ///
    /// Fails with `Validation` on an invalid key or value or a duplicate
    /// key, and with `CapacityExceeded` when full.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), Error> {
        let () = Self::ID_OK;
        key.validate_element(ID)?;
        value.validate_element(ID)?;
        if self.len >= MAX {
            return Err(Error::capacity_exceeded(ID, "map capacity exceeded"));
        }
        if self.at(&key).is_some() {
            return Err(Error::validation(ID, "duplicate key in map"));
        }
        self.items[self.len] = (key, value);
        self.len += 1;
        Ok(())
    }

    /// Looks up the value stored under `key`.
    pub fn at(&self, key: &K) -> Option<&V> {
        self.entries()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Mutable lookup of the value stored under `key`.
    pub fn at_mut(&mut self, key: &K) -> Option<&mut V> {
        self.items[..self.len]
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Removes `key` and its value, shifting later pairs down.
    ///
    /// Returns whether the key was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(index) = self.entries().iter().position(|(k, _)| k == key) else {
            return false;
        };
        self.items[index..self.len].rotate_left(1);
        self.items[self.len - 1] = (K::default(), V::default());
        self.len -= 1;
        true
    }

    /// Appends a pair without validation or duplicate checking.
    ///
    /// Used by the static-layout decode path, which bounds-checks the pair
    /// count beforehand and validates the whole message afterwards.
    pub(crate) fn push_raw(&mut self, key: K, value: V) {
        self.items[self.len] = (key, value);
        self.len += 1;
    }
}

impl<const ID: i32, K: Element, V: Element, const MAX: usize, W: Validator<[(K, V)]>>
    Map<ID, K, V, MAX, W>
{
    /// Validates every stored pair, then the container validators.
    pub fn validate(&self) -> Result<(), Error> {
        for (key, value) in self.iter() {
            key.validate_element(ID)?;
            value.validate_element(ID)?;
        }
        W::check(self.entries(), ID)
    }
}

impl<const ID: i32, K: Default, V: Default, const MAX: usize, W> Default
    for Map<ID, K, V, MAX, W>
{
    fn default() -> Self {
        Self {
            items: core::array::from_fn(|_| (K::default(), V::default())),
            len: 0,
            _validators: PhantomData,
        }
    }
}

impl<const ID: i32, K: Clone, V: Clone, const MAX: usize, W> Clone for Map<ID, K, V, MAX, W> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            len: self.len,
            _validators: PhantomData,
        }
    }
}

// Insertion order is preserved for iteration but ignored by equality: two
// maps are equal when they hold the same key-value pairs. Duplicate keys are
// rejected at insert time, so membership checks need not dedupe.
impl<const ID: i32, K: PartialEq, V: PartialEq, const MAX: usize, W> PartialEq
    for Map<ID, K, V, MAX, W>
{
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        self.entries().iter().all(|(key, value)| {
            other
                .entries()
                .iter()
                .any(|(ok, ov)| ok == key && ov == value)
        })
    }
}

impl<const ID: i32, K: fmt::Debug, V: fmt::Debug, const MAX: usize, W> fmt::Debug
    for Map<ID, K, V, MAX, W>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries().iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<const ID: i32, K: Element, V: Element, const MAX: usize, W: Validator<[(K, V)]>> Element
    for Map<ID, K, V, MAX, W>
{
    fn validate_element(&self, _field_id: FieldId) -> Result<(), Error> {
        self.validate()
    }
}
