mod basic;
mod traits;

use std::fmt;

use crate::{UnifyKey, UnifyValue};

/// Integer payload where `-1` means "unbound".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int(pub i32);

pub const UNBOUND: Int = Int(-1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub ours: i32,
    pub theirs: i32,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} conflicts with {}", self.ours, self.theirs)
    }
}

impl UnifyValue for Int {
    type Error = Conflict;

    fn merge(&mut self, other: &Self) -> Result<(), Conflict> {
        if self.0 == -1 {
            self.0 = other.0;
            Ok(())
        } else if other.0 == -1 || self.0 == other.0 {
            Ok(())
        } else {
            Err(Conflict {
                ours: self.0,
                theirs: other.0,
            })
        }
    }
}

/// Plain key over [`Int`] values; root choice left to rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntKey(pub u32);

impl UnifyKey for IntKey {
    type Value = Int;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(index: u32) -> Self {
        Self(index)
    }

    fn tag() -> &'static str {
        "IntKey"
    }
}
