//! Key and value contracts of a unification table.
//!
//! A key is a dense `u32` index in disguise; a value is the payload carried
//! by each equivalence class and knows how to merge with another payload.

use std::fmt;

/// A key type that identifies one node of a [`UnificationTable`](crate::UnificationTable).
///
/// `index` and `from_index` must be inverse bijections over the indices the
/// table hands out.
pub trait UnifyKey: Copy + Eq + fmt::Debug {
    /// Payload attached to each equivalence class.
    type Value: UnifyValue;

    /// Returns the dense index of this key.
    fn index(&self) -> u32;

    /// Builds the key that corresponds to `index`.
    fn from_index(index: u32) -> Self;

    /// Short name of the key type, used in diagnostics.
    #[must_use]
    fn tag() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Optionally overrides which of two roots survives a union.
    ///
    /// Returns `Some((new_root, redirected))` to force the choice; the pair
    /// must be exactly `{a, b}` in some order or the union fails with
    /// [`UnifyError::InvalidRootOrder`](crate::UnifyError::InvalidRootOrder).
    /// Returning `None` (the default) leaves the choice to rank.
    fn order_roots(
        a: Self,
        a_value: &Self::Value,
        b: Self,
        b_value: &Self::Value,
    ) -> Option<(Self, Self)> {
        let _ = (a, a_value, b, b_value);
        None
    }
}

/// Payload of an equivalence class.
///
/// Cloning must produce an independent copy: the table keeps clones in its
/// undo log and hands clones out of [`probe`](crate::UnificationTable::probe).
pub trait UnifyValue: Clone + fmt::Debug {
    /// Reason two values cannot be merged.
    type Error;

    /// Merges `other` into `self`.
    ///
    /// On error `self` may be left in any state; the table discards it.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the two values are incompatible.
    fn merge(&mut self, other: &Self) -> Result<(), Self::Error>;
}

/// Error type for values that always merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoError {}

impl fmt::Display for NoError {
    #[allow(clippy::uninhabited_references, reason = "`NoError` has no values")]
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl std::error::Error for NoError {}

impl UnifyValue for () {
    type Error = NoError;

    fn merge(&mut self, _other: &Self) -> Result<(), NoError> {
        Ok(())
    }
}
