//! Unification table: path-compressing find, rank-balanced union with
//! value merging, and nested snapshot/rollback.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use crate::Snapshot;
use crate::error::UnifyError;
use crate::key::{UnifyKey, UnifyValue};
use crate::store::VarStore;
use crate::undo_log::UndoLog;

/// Result of a table operation on keys of type `K`.
pub type UnifyResult<T, K> = Result<T, UnifyError<<<K as UnifyKey>::Value as UnifyValue>::Error>>;

/// Disjoint-set forest over keys of type `K`, each class carrying a
/// [`UnifyKey::Value`].
///
/// Mutations made while a [`Snapshot`] is open can be undone exactly with
/// [`rollback_to`](Self::rollback_to). The table is meant to be owned by a
/// single pass; it has no internal synchronisation.
pub struct UnificationTable<K: UnifyKey> {
    values: VarStore<K::Value>,
    undo_log: UndoLog<K::Value>,
    _key: PhantomData<K>,
}

// ---------------------------------------------------------------------------
// Construction & accessors
// ---------------------------------------------------------------------------

impl<K: UnifyKey> UnificationTable<K> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: VarStore::new(),
            undo_log: UndoLog::new(),
            _key: PhantomData,
        }
    }

    /// Creates an empty table with room for `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::OutOfMemory`] if the allocation fails.
    pub fn with_capacity(capacity: usize) -> UnifyResult<Self, K> {
        let mut table = Self::new();
        table.reserve(capacity)?;
        Ok(table)
    }

    /// Returns the number of keys ever allocated (and not rolled back).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no key has been allocated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ensures the next `additional` calls to [`new_key`](Self::new_key) do
    /// not reallocate.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::OutOfMemory`] if the allocation fails; the table
    /// is unchanged.
    pub fn reserve(&mut self, additional: usize) -> UnifyResult<(), K> {
        self.values.reserve(additional)?;
        Ok(())
    }

    /// Returns `true` while at least one snapshot is open.
    #[must_use]
    pub const fn in_snapshot(&self) -> bool {
        self.undo_log.in_snapshot()
    }

    /// Number of open snapshots.
    #[must_use]
    pub const fn snapshot_depth(&self) -> usize {
        self.undo_log.depth()
    }
}

// ---------------------------------------------------------------------------
// Union-find operations
// ---------------------------------------------------------------------------

impl<K: UnifyKey> UnificationTable<K> {
    /// Allocates a fresh singleton class holding `value` and returns its key.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::OutOfMemory`] or [`UnifyError::KeySpaceExhausted`]
    /// if no node can be added; the table is unchanged.
    pub fn new_key(&mut self, value: K::Value) -> UnifyResult<K, K> {
        let index = self.values.push_new(value, &mut self.undo_log)?;
        Ok(K::from_index(index))
    }

    /// Returns the representative key of `key`'s class.
    ///
    /// Every node on the path is re-pointed directly at the root.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::UnknownKey`] if `key` was not allocated here.
    pub fn find(&mut self, key: K) -> UnifyResult<K, K> {
        let index = self.check_key(key)?;
        Ok(K::from_index(self.root_index(index)))
    }

    /// Returns `true` if `a` and `b` are in the same class.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::UnknownKey`] if either key was not allocated here.
    pub fn unioned(&mut self, a: K, b: K) -> UnifyResult<bool, K> {
        let a = self.check_key(a)?;
        let b = self.check_key(b)?;
        Ok(self.root_index(a) == self.root_index(b))
    }

    /// Joins the classes of `a` and `b`.
    ///
    /// The joined class carries the root value of `a` merged with the root
    /// value of `b`. The surviving root is chosen by
    /// [`UnifyKey::order_roots`] if it nominates one, otherwise by rank; on a
    /// rank tie the root of `b` survives.
    ///
    /// # Errors
    ///
    /// - [`UnifyError::UnknownKey`] if either key was not allocated here.
    /// - [`UnifyError::MergeConflict`] if the values cannot be merged; the two
    ///   classes stay separate and keep their values.
    /// - [`UnifyError::InvalidRootOrder`] if `order_roots` nominates a pair
    ///   other than the two roots.
    pub fn union(&mut self, a: K, b: K) -> UnifyResult<(), K> {
        let a = self.check_key(a)?;
        let b = self.check_key(b)?;
        let root_a = self.root_index(a);
        let root_b = self.root_index(b);
        if root_a == root_b {
            return Ok(());
        }

        let mut combined = self.values.get(root_a).value.clone();
        combined
            .merge(&self.values.get(root_b).value)
            .map_err(UnifyError::MergeConflict)?;
        self.unify_roots(root_a, root_b, combined)
    }

    /// Merges `value` into the root value of `key`'s class.
    ///
    /// # Errors
    ///
    /// - [`UnifyError::UnknownKey`] if `key` was not allocated here.
    /// - [`UnifyError::MergeConflict`] if the values cannot be merged; the
    ///   class keeps its value.
    #[allow(clippy::needless_pass_by_value)]
    pub fn union_value(&mut self, key: K, value: K::Value) -> UnifyResult<(), K> {
        let index = self.check_key(key)?;
        let root = self.root_index(index);

        let mut merged = self.values.get(root).value.clone();
        merged.merge(&value).map_err(UnifyError::MergeConflict)?;
        self.values
            .update(root, &mut self.undo_log, |node| node.value = merged);
        Ok(())
    }

    /// Returns a copy of the value of `key`'s class.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::UnknownKey`] if `key` was not allocated here.
    pub fn probe(&mut self, key: K) -> UnifyResult<K::Value, K> {
        let index = self.check_key(key)?;
        let root = self.root_index(index);
        Ok(self.values.get(root).value.clone())
    }

    #[cfg(test)]
    pub(crate) fn node(&self, key: K) -> &crate::node::VarValue<K::Value> {
        self.values.get(key.index())
    }

    fn check_key(&self, key: K) -> UnifyResult<u32, K> {
        let index = key.index();
        if (index as usize) < self.values.len() {
            Ok(index)
        } else {
            Err(UnifyError::UnknownKey {
                tag: K::tag(),
                index,
                len: self.values.len(),
            })
        }
    }

    /// Walks to the root of `index`, then re-points the path at it.
    fn root_index(&mut self, index: u32) -> u32 {
        let mut root = index;
        loop {
            let parent = self.values.get(root).parent;
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut current = index;
        while current != root {
            let parent = self.values.get(current).parent;
            if parent != root {
                self.values
                    .update(current, &mut self.undo_log, |node| node.parent = root);
            }
            current = parent;
        }
        root
    }

    /// Links two distinct roots and stores `combined` on the survivor.
    fn unify_roots(&mut self, a: u32, b: u32, combined: K::Value) -> UnifyResult<(), K> {
        let rank_a = self.values.get(a).rank;
        let rank_b = self.values.get(b).rank;

        let (new_root, redirected, new_rank) = match self.ordered_roots(a, b)? {
            Some((new_root, redirected)) => {
                let (winner, loser) = if new_root == a {
                    (rank_a, rank_b)
                } else {
                    (rank_b, rank_a)
                };
                let rank = if winner > loser { winner } else { loser + 1 };
                (new_root, redirected, rank)
            }
            None => match rank_a.cmp(&rank_b) {
                Ordering::Greater => (a, b, rank_a),
                Ordering::Less => (b, a, rank_b),
                Ordering::Equal => (b, a, rank_b + 1),
            },
        };

        self.values.update(redirected, &mut self.undo_log, |node| {
            node.parent = new_root;
        });
        self.values.update(new_root, &mut self.undo_log, |node| {
            node.rank = new_rank;
            node.value = combined;
        });
        Ok(())
    }

    /// Asks the key type for a root ordering and validates the answer.
    fn ordered_roots(&self, a: u32, b: u32) -> UnifyResult<Option<(u32, u32)>, K> {
        let Some((new_root, redirected)) = K::order_roots(
            K::from_index(a),
            &self.values.get(a).value,
            K::from_index(b),
            &self.values.get(b).value,
        ) else {
            return Ok(None);
        };

        let pair = (new_root.index(), redirected.index());
        if pair == (a, b) || pair == (b, a) {
            Ok(Some(pair))
        } else {
            Err(UnifyError::InvalidRootOrder {
                tag: K::tag(),
                new_root: pair.0,
                redirected: pair.1,
                a,
                b,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

impl<K: UnifyKey> UnificationTable<K> {
    /// Opens a snapshot. Snapshots nest and must be closed innermost first.
    pub fn snapshot(&mut self) -> Snapshot {
        self.undo_log.start_snapshot(self.values.len())
    }

    /// Restores the table to its state when `snapshot` was opened and closes
    /// it. Keys created since then become unknown.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::SnapshotMismatch`] without changing anything if
    /// `snapshot` is not the innermost open snapshot.
    pub fn rollback_to(&mut self, snapshot: Snapshot) -> UnifyResult<(), K> {
        self.undo_log
            .rollback_to(snapshot, |entry| self.values.apply_undo(entry))
    }

    /// Closes `snapshot`, keeping every change made since it was opened.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::SnapshotMismatch`] without changing anything if
    /// `snapshot` is not the innermost open snapshot.
    pub fn commit(&mut self, snapshot: Snapshot) -> UnifyResult<(), K> {
        self.undo_log.commit(snapshot)
    }

    /// Returns the keys created since `snapshot` was opened, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::SnapshotMismatch`] if `snapshot` is not open.
    pub fn new_keys_since(
        &self,
        snapshot: Snapshot,
    ) -> UnifyResult<impl Iterator<Item = K> + use<K>, K> {
        let start = self
            .undo_log
            .value_count(snapshot)
            .ok_or_else(|| UnifyError::SnapshotMismatch {
                found: snapshot.id,
                innermost: self.undo_log.innermost(),
            })?;
        let len = self.values.len();
        let overflow = |_| UnifyError::KeySpaceExhausted { len };
        let start = u32::try_from(start).map_err(overflow)?;
        let end = u32::try_from(len).map_err(overflow)?;
        Ok((start..end).map(K::from_index))
    }

    /// Runs `f` inside a fresh snapshot, keeping its changes only if it
    /// returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns; on `Err` the table is rolled back.
    ///
    /// # Panics
    ///
    /// Panics if `f` leaves a snapshot of its own open.
    pub fn commit_if_ok<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.snapshot();
        let result = f(self);
        let closed = if result.is_ok() {
            self.commit(snapshot)
        } else {
            self.rollback_to(snapshot)
        };
        assert!(closed.is_ok(), "speculative closure left a snapshot open");
        result
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K: UnifyKey> Default for UnificationTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: UnifyKey> fmt::Debug for UnificationTable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnificationTable")
            .field("tag", &K::tag())
            .field("len", &self.values.len())
            .field("snapshot_depth", &self.undo_log.depth())
            .finish_non_exhaustive()
    }
}
