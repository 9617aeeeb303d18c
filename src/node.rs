//! Union-find node type.

use std::fmt;

/// One node of the disjoint-set forest.
///
/// A node is a root iff `parent` equals its own index. Only a root's
/// `value` is meaningful; non-root nodes keep whatever value they held when
/// they were redirected, and the table never reads it.
#[derive(Clone, PartialEq, Eq)]
pub struct VarValue<V> {
    /// Index of the parent node (self for roots).
    pub parent: u32,
    /// Balancing heuristic; an upper bound on subtree height.
    pub rank: u32,
    /// Payload attached to the equivalence class when this node is a root.
    pub value: V,
}

impl<V> VarValue<V> {
    /// Creates a fresh singleton node rooted at `index`.
    #[must_use]
    pub const fn new_root(index: u32, value: V) -> Self {
        Self {
            parent: index,
            rank: 0,
            value,
        }
    }

    /// Returns `true` if this node, stored at `index`, is its own root.
    #[inline]
    #[must_use]
    pub const fn is_root(&self, index: u32) -> bool {
        self.parent == index
    }
}

impl<V: fmt::Debug> fmt::Debug for VarValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarValue")
            .field("parent", &self.parent)
            .field("rank", &self.rank)
            .field("value", &self.value)
            .finish()
    }
}
