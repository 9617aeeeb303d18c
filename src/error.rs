//! Error type shared by every table operation.

use std::collections::TryReserveError;

/// Coarse classification of a [`UnifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller passed a key or root ordering the table cannot accept.
    InvalidArgument,
    /// The value store could not grow.
    OutOfMemory,
    /// Two values asserted equal could not be merged.
    MergeConflict,
    /// A snapshot was closed out of LIFO order.
    SnapshotMismatch,
}

/// Failure of a unification table operation.
///
/// `E` is the merge error of the table's value type. Every failing call
/// leaves the table exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnifyError<E> {
    /// The key's index has not been allocated by this table.
    #[error("{tag} key with index {index} is out of bounds for a table of {len} keys")]
    UnknownKey {
        /// Key type tag.
        tag: &'static str,
        /// Index the key maps to.
        index: u32,
        /// Number of keys allocated in the table.
        len: usize,
    },

    /// `order_roots` nominated something other than the two roots being joined.
    #[error(
        "root ordering for {tag} keys nominated {new_root} <- {redirected}, expected the pair {{{a}, {b}}}"
    )]
    InvalidRootOrder {
        /// Key type tag.
        tag: &'static str,
        /// Index nominated as the surviving root.
        new_root: u32,
        /// Index nominated to be redirected.
        redirected: u32,
        /// Root of the first union argument.
        a: u32,
        /// Root of the second union argument.
        b: u32,
    },

    /// The value store could not reserve room for more keys.
    #[error("out of memory while growing the unification table")]
    OutOfMemory(#[from] TryReserveError),

    /// Every `u32` index is already allocated.
    #[error("key space exhausted: the table already holds {len} keys")]
    KeySpaceExhausted {
        /// Number of keys allocated in the table.
        len: usize,
    },

    /// The value type refused to merge two values.
    #[error("values could not be merged: {0}")]
    MergeConflict(E),

    /// The snapshot is not the innermost open one.
    #[error("snapshot {found} is not the innermost open snapshot (innermost: {innermost:?})")]
    SnapshotMismatch {
        /// Id of the snapshot passed in.
        found: u32,
        /// Id of the innermost open snapshot, if any is open.
        innermost: Option<u32>,
    },
}

impl<E> UnifyError<E> {
    /// Returns the status class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownKey { .. } | Self::InvalidRootOrder { .. } => ErrorKind::InvalidArgument,
            Self::OutOfMemory(_) | Self::KeySpaceExhausted { .. } => ErrorKind::OutOfMemory,
            Self::MergeConflict(_) => ErrorKind::MergeConflict,
            Self::SnapshotMismatch { .. } => ErrorKind::SnapshotMismatch,
        }
    }

    /// Returns the merge error if this is a [`MergeConflict`](Self::MergeConflict).
    #[must_use]
    pub fn into_merge_conflict(self) -> Option<E> {
        match self {
            Self::MergeConflict(e) => Some(e),
            _ => None,
        }
    }
}
