//! Union-find table with undoable snapshots, built for type unification.
//!
//! Each key names a node of a disjoint-set forest; each equivalence class
//! carries a value that is merged whenever two classes are joined. A
//! unification pass allocates one key per type variable, joins keys as
//! equality constraints are discovered and reads back the resolved value of
//! any variable.
//!
//! # Key properties
//!
//! - **Path compression + union by rank**: near-constant amortised `find`
//! - **Checked merges**: a failed merge leaves both classes untouched
//! - **Nested snapshots**: every mutation made while a snapshot is open is
//!   journaled and can be undone exactly with
//!   [`rollback_to`](UnificationTable::rollback_to)
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Example
//!
//! ```
//! use unify_table::infer::{Ty, TypeBinding, TypeVar};
//! use unify_table::UnificationTable;
//!
//! let mut table: UnificationTable<TypeVar> = UnificationTable::new();
//! let a = table.new_key(TypeBinding::Unbound).unwrap();
//! let b = table.new_key(TypeBinding::Unbound).unwrap();
//!
//! let snapshot = table.snapshot();
//! table.union(a, b).unwrap();
//! table.union_value(b, TypeBinding::Bound(Ty::Int)).unwrap();
//! assert_eq!(table.probe(a).unwrap(), TypeBinding::Bound(Ty::Int));
//!
//! table.rollback_to(snapshot).unwrap();
//! assert!(!table.unioned(a, b).unwrap());
//! ```
//!
//! # References
//!
//! - Tarjan, 1975. "Efficiency of a Good But Not Linear Set Union Algorithm", JACM 22(2)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod infer;
pub mod key;
pub mod node;
pub mod store;
pub mod table;
pub mod undo_log;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, UnifyError};
pub use key::{NoError, UnifyKey, UnifyValue};
pub use table::{UnificationTable, UnifyResult};

/// Handle to an open snapshot.
///
/// Created by [`UnificationTable::snapshot`] and closed by
/// [`UnificationTable::rollback_to`] or [`UnificationTable::commit`].
/// Snapshot ids are never reused within a table.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub(crate) id: u32,
}

impl Snapshot {
    /// Returns the id of this snapshot.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }
}
