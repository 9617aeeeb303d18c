use std::collections::TryReserveError;

use super::{Conflict, Int, IntKey, UNBOUND};
use crate::undo_log::UndoLog;
use crate::{ErrorKind, NoError, UnificationTable, UnifyError, UnifyKey, UnifyValue};

/// Key over `()` values with the default tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UnitKey(u32);

impl UnifyKey for UnitKey {
    type Value = ();

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(index: u32) -> Self {
        Self(index)
    }
}

fn reserve_error() -> TryReserveError {
    Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err()
}

#[test]
fn table_debug_reports_shape() {
    let mut table: UnificationTable<IntKey> = UnificationTable::default();
    table.new_key(UNBOUND).unwrap();
    let _snapshot = table.snapshot();
    let debug = format!("{table:?}");
    assert!(debug.starts_with("UnificationTable"), "{debug}");
    assert!(debug.contains("tag: \"IntKey\""), "{debug}");
    assert!(debug.contains("len: 1"), "{debug}");
    assert!(debug.contains("snapshot_depth: 1"), "{debug}");
}

#[test]
fn undo_log_debug() {
    let log: UndoLog<Int> = UndoLog::default();
    let debug = format!("{log:?}");
    assert!(debug.contains("len: 0"), "{debug}");
    assert!(debug.contains("depth: 0"), "{debug}");
}

#[test]
fn unit_values_always_merge() {
    let mut table: UnificationTable<UnitKey> = UnificationTable::new();
    let a = table.new_key(()).unwrap();
    let b = table.new_key(()).unwrap();
    table.union(a, b).unwrap();
    table.union_value(a, ()).unwrap();
    assert!(table.unioned(a, b).unwrap());

    let mut unit = ();
    let merged: Result<(), NoError> = unit.merge(&());
    assert!(merged.is_ok());
    assert!(UnitKey::tag().contains("UnitKey"));
}

fn unknown_key() -> UnifyError<Conflict> {
    UnifyError::UnknownKey {
        tag: "IntKey",
        index: 3,
        len: 2,
    }
}

fn invalid_order() -> UnifyError<Conflict> {
    UnifyError::InvalidRootOrder {
        tag: "IntKey",
        new_root: 0,
        redirected: 0,
        a: 0,
        b: 1,
    }
}

const CONFLICT: Conflict = Conflict { ours: 1, theirs: 2 };

#[test]
fn error_kinds() {
    let cases = [
        (unknown_key(), ErrorKind::InvalidArgument),
        (invalid_order(), ErrorKind::InvalidArgument),
        (UnifyError::OutOfMemory(reserve_error()), ErrorKind::OutOfMemory),
        (UnifyError::KeySpaceExhausted { len: 4 }, ErrorKind::OutOfMemory),
        (UnifyError::MergeConflict(CONFLICT), ErrorKind::MergeConflict),
        (
            UnifyError::SnapshotMismatch {
                found: 1,
                innermost: None,
            },
            ErrorKind::SnapshotMismatch,
        ),
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{err}");
    }
}

#[test]
fn error_messages() {
    assert_eq!(
        unknown_key().to_string(),
        "IntKey key with index 3 is out of bounds for a table of 2 keys"
    );
    assert_eq!(
        invalid_order().to_string(),
        "root ordering for IntKey keys nominated 0 <- 0, expected the pair {0, 1}"
    );

    let conflict: UnifyError<Conflict> = UnifyError::MergeConflict(CONFLICT);
    assert_eq!(
        conflict.to_string(),
        "values could not be merged: 1 conflicts with 2"
    );

    let mismatch: UnifyError<Conflict> = UnifyError::SnapshotMismatch {
        found: 2,
        innermost: Some(3),
    };
    assert_eq!(
        mismatch.to_string(),
        "snapshot 2 is not the innermost open snapshot (innermost: Some(3))"
    );
}

#[test]
fn reserve_error_converts() {
    let err: UnifyError<Conflict> = reserve_error().into();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);
    assert!(err.into_merge_conflict().is_none());
}

#[test]
fn snapshot_handles_compare_by_id() {
    let mut table: UnificationTable<IntKey> = UnificationTable::new();
    let outer = table.snapshot();
    let inner = table.snapshot();
    let copy = inner;
    assert_eq!(copy, inner);
    assert_ne!(outer, inner);
    assert!(inner.id() > outer.id());
    table.commit(inner).unwrap();
    table.commit(outer).unwrap();
    assert_eq!(
        table.probe(IntKey(0)).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}
