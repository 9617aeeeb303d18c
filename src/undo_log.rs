//! Undo journal partitioned into nested snapshot regions.
//!
//! Entries live in a bump arena. Each open snapshot remembers the arena
//! checkpoint taken when it began, so discarding a region is a single
//! arena rollback. Entries are only journaled while a snapshot is open.

use std::fmt;

use safe_bump::{Arena, Checkpoint, Idx};

use crate::Snapshot;
use crate::error::UnifyError;
use crate::node::VarValue;

/// One reversible mutation of the value store.
pub enum UndoEntry<V> {
    /// A node was appended at `index`.
    NewElem {
        /// Index of the appended node.
        index: u32,
    },
    /// The node at `index` was overwritten.
    SetElem {
        /// Index of the overwritten node.
        index: u32,
        /// Independent copy of the node before the write.
        old: VarValue<V>,
    },
}

impl<V: fmt::Debug> fmt::Debug for UndoEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewElem { index } => f.debug_struct("NewElem").field("index", index).finish(),
            Self::SetElem { index, old } => f
                .debug_struct("SetElem")
                .field("index", index)
                .field("old", old)
                .finish(),
        }
    }
}

/// An open snapshot region.
struct Frame<V> {
    id: u32,
    /// Journal length when the region began.
    checkpoint: Checkpoint<UndoEntry<V>>,
    /// Store length when the region began.
    value_count: usize,
}

/// Append-only journal of store mutations with a stack of snapshot frames.
pub struct UndoLog<V> {
    entries: Arena<UndoEntry<V>>,
    frames: Vec<Frame<V>>,
    next_id: u32,
}

impl<V> UndoLog<V> {
    /// Creates an empty log with no open snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Arena::new(),
            frames: Vec::new(),
            next_id: 1,
        }
    }

    /// Returns `true` while at least one snapshot is open.
    #[must_use]
    pub const fn in_snapshot(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of open snapshots.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of journaled entries not yet released.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are journaled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Journals the creation of the node at `index`.
    pub fn push_new(&mut self, index: u32) {
        self.entries.alloc(UndoEntry::NewElem { index });
    }

    /// Journals the state of the node at `index` before it is overwritten.
    pub fn push_set(&mut self, index: u32, old: &VarValue<V>)
    where
        V: Clone,
    {
        self.entries.alloc(UndoEntry::SetElem {
            index,
            old: old.clone(),
        });
    }

    /// Opens a new snapshot region. `value_count` is the store length.
    pub fn start_snapshot(&mut self, value_count: usize) -> Snapshot {
        let id = self.next_id;
        self.next_id += 1;
        self.frames.push(Frame {
            id,
            checkpoint: self.entries.checkpoint(),
            value_count,
        });
        Snapshot { id }
    }

    /// Store length recorded when `snapshot` began, if it is still open.
    #[must_use]
    pub fn value_count(&self, snapshot: Snapshot) -> Option<usize> {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.id == snapshot.id)
            .map(|frame| frame.value_count)
    }

    /// Undoes every entry journaled since `snapshot` began, newest first,
    /// and closes the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::SnapshotMismatch`] without touching anything if
    /// `snapshot` is not the innermost open snapshot.
    pub fn rollback_to<E, F>(
        &mut self,
        snapshot: Snapshot,
        mut apply: F,
    ) -> Result<(), UnifyError<E>>
    where
        F: FnMut(&UndoEntry<V>),
    {
        let frame = self.pop_innermost(snapshot)?;

        for i in (frame.checkpoint.len()..self.entries.len()).rev() {
            apply(self.entries.get(Idx::from_raw(i)));
        }
        self.entries.rollback(frame.checkpoint);
        Ok(())
    }

    /// Closes `snapshot`, keeping its mutations.
    ///
    /// Committing the outermost snapshot releases the whole journal. A nested
    /// commit keeps its entries so the enclosing snapshot can still undo them.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::SnapshotMismatch`] without touching anything if
    /// `snapshot` is not the innermost open snapshot.
    pub fn commit<E>(&mut self, snapshot: Snapshot) -> Result<(), UnifyError<E>> {
        let frame = self.pop_innermost(snapshot)?;

        if self.frames.is_empty() {
            debug_assert!(
                frame.checkpoint.is_empty(),
                "entries journaled outside any snapshot"
            );
            self.entries.rollback(frame.checkpoint);
        }
        Ok(())
    }

    /// Id of the innermost open snapshot.
    #[must_use]
    pub fn innermost(&self) -> Option<u32> {
        self.frames.last().map(|frame| frame.id)
    }

    fn pop_innermost<E>(&mut self, snapshot: Snapshot) -> Result<Frame<V>, UnifyError<E>> {
        self.frames
            .pop_if(|frame| frame.id == snapshot.id)
            .ok_or_else(|| UnifyError::SnapshotMismatch {
                found: snapshot.id,
                innermost: self.innermost(),
            })
    }
}

impl<V> Default for UndoLog<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for UndoLog<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoLog")
            .field("len", &self.entries.len())
            .field("depth", &self.frames.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
