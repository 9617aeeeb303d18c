//! Index-addressed node storage for a unification table.
//!
//! No union-find logic lives here; the table decides what to write and the
//! store makes every write reversible while a snapshot is open.

use std::collections::TryReserveError;
use std::fmt;

use crate::error::UnifyError;
use crate::node::VarValue;
use crate::undo_log::{UndoEntry, UndoLog};

/// Growable array of union-find nodes.
pub struct VarStore<V> {
    vars: Vec<VarValue<V>>,
}

impl<V> VarStore<V> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if the store holds no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Ensures room for `additional` more nodes without reallocating.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error; the store is left unchanged.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.vars.try_reserve(additional)
    }

    /// Returns the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: u32) -> &VarValue<V> {
        &self.vars[index as usize]
    }

    /// Appends a self-rooted, rank-0 node holding `value` and returns its index.
    ///
    /// The append is journaled if a snapshot is open.
    ///
    /// # Errors
    ///
    /// Fails with [`UnifyError::OutOfMemory`] if the store cannot grow, or
    /// [`UnifyError::KeySpaceExhausted`] once it holds `u32::MAX` nodes. The
    /// store is left at its previous length.
    pub fn push_new<E>(
        &mut self,
        value: V,
        undo_log: &mut UndoLog<V>,
    ) -> Result<u32, UnifyError<E>> {
        let len = self.vars.len();
        let index = next_index(len).ok_or(UnifyError::KeySpaceExhausted { len })?;
        self.vars.try_reserve(1)?;
        self.vars.push(VarValue::new_root(index, value));
        if undo_log.in_snapshot() {
            undo_log.push_new(index);
        }
        Ok(index)
    }

    /// Journals the node at `index` ahead of an in-place write.
    ///
    /// Does nothing when no snapshot is open.
    pub fn record_set(&self, index: u32, undo_log: &mut UndoLog<V>)
    where
        V: Clone,
    {
        if undo_log.in_snapshot() {
            undo_log.push_set(index, self.get(index));
        }
    }

    /// Applies `op` to the node at `index`, journaling its prior state first.
    pub fn update<F>(&mut self, index: u32, undo_log: &mut UndoLog<V>, op: F)
    where
        V: Clone,
        F: FnOnce(&mut VarValue<V>),
    {
        self.record_set(index, undo_log);
        op(&mut self.vars[index as usize]);
    }

    /// Reverses one journaled mutation.
    ///
    /// Entries must be applied newest first: a `NewElem` entry always refers
    /// to the last node.
    pub fn apply_undo(&mut self, entry: &UndoEntry<V>)
    where
        V: Clone,
    {
        match entry {
            UndoEntry::NewElem { index } => {
                debug_assert_eq!(
                    *index as usize + 1,
                    self.vars.len(),
                    "undo applied out of order"
                );
                self.vars.pop();
            }
            UndoEntry::SetElem { index, old } => {
                self.vars[*index as usize] = old.clone();
            }
        }
    }
}

/// Index of the node appended to a store of `len` nodes.
///
/// The store never grows past `u32::MAX` nodes, so its length always fits
/// in a `u32` as well.
pub(crate) fn next_index(len: usize) -> Option<u32> {
    u32::try_from(len).ok().filter(|&index| index < u32::MAX)
}

impl<V> Default for VarStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for VarStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarStore")
            .field("len", &self.vars.len())
            .field("capacity", &self.vars.capacity())
            .finish()
    }
}
