use super::{Int, IntKey, UNBOUND};
use crate::infer::{Ty, TypeBinding, TypeVar};
use crate::{ErrorKind, UnificationTable, UnifyError};

#[test]
fn empty_table() {
    let table: UnificationTable<IntKey> = UnificationTable::new();
    assert_eq!(table.len(), 0);
    assert!(table.is_empty());
    assert!(!table.in_snapshot());
    assert_eq!(table.snapshot_depth(), 0);
}

#[test]
fn new_keys_are_dense() {
    let mut table = UnificationTable::new();
    for i in 0..5u32 {
        let key: IntKey = table.new_key(Int(i.cast_signed())).unwrap();
        assert_eq!(key, IntKey(i));
    }
    assert_eq!(table.len(), 5);
    assert!(!table.is_empty());
}

#[test]
fn fresh_key_is_own_root() {
    let mut table = UnificationTable::new();
    let a: IntKey = table.new_key(Int(7)).unwrap();
    assert_eq!(table.find(a).unwrap(), a);
    assert_eq!(table.probe(a).unwrap(), Int(7));
    assert!(table.unioned(a, a).unwrap());
}

#[test]
fn find_is_idempotent() {
    let mut table = UnificationTable::new();
    let keys: Vec<IntKey> = (0..8).map(|_| table.new_key(UNBOUND).unwrap()).collect();
    for pair in keys.chunks(2) {
        table.union(pair[0], pair[1]).unwrap();
    }
    table.union(keys[0], keys[2]).unwrap();
    table.union(keys[4], keys[6]).unwrap();
    table.union(keys[1], keys[7]).unwrap();

    for &k in &keys {
        let root = table.find(k).unwrap();
        assert_eq!(table.find(root).unwrap(), root);
        assert_eq!(table.find(k).unwrap(), root);
    }
}

#[test]
fn unknown_key_is_rejected() {
    let mut table = UnificationTable::new();
    let a: IntKey = table.new_key(UNBOUND).unwrap();
    let ghost = IntKey(3);

    let err = table.find(ghost).unwrap_err();
    assert_eq!(
        err,
        UnifyError::UnknownKey {
            tag: "IntKey",
            index: 3,
            len: 1,
        }
    );
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert!(table.union(a, ghost).is_err());
    assert!(table.union(ghost, a).is_err());
    assert!(table.unioned(a, ghost).is_err());
    assert!(table.union_value(ghost, Int(1)).is_err());
    assert!(table.probe(ghost).is_err());
    assert_eq!(table.probe(a).unwrap(), UNBOUND);
}

#[test]
fn reserve_and_with_capacity() {
    let mut table: UnificationTable<IntKey> = UnificationTable::with_capacity(64).unwrap();
    assert!(table.is_empty());
    table.reserve(128).unwrap();
    for _ in 0..128 {
        table.new_key(UNBOUND).unwrap();
    }
    assert_eq!(table.len(), 128);
}

#[test]
fn reserve_overflow_is_out_of_memory() {
    let mut table: UnificationTable<IntKey> = UnificationTable::new();
    let err = table.reserve(usize::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);
    assert!(table.is_empty());
    table.new_key(UNBOUND).unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn probe_returns_independent_copy() {
    let fields = vec![Ty::Int, Ty::Angle];
    let mut table: UnificationTable<TypeVar> = UnificationTable::new();
    let a = table.new_key(TypeBinding::Bound(Ty::Struct(fields.clone()))).unwrap();
    let b = table.new_key(TypeBinding::Unbound).unwrap();
    table.union(a, b).unwrap();

    let mut copy = table.probe(b).unwrap();
    if let TypeBinding::Bound(Ty::Struct(copied)) = &mut copy {
        copied.push(Ty::Qubit);
        copied[0] = Ty::Float;
    }
    assert_eq!(
        copy,
        TypeBinding::Bound(Ty::Struct(vec![Ty::Float, Ty::Angle, Ty::Qubit]))
    );

    for key in [a, b] {
        assert_eq!(
            table.probe(key).unwrap(),
            TypeBinding::Bound(Ty::Struct(fields.clone()))
        );
    }
}
