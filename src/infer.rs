//! Type variables and bindings on top of the unification table.
//!
//! Each type variable is a key whose class value is either unbound or bound
//! to a concrete [`Ty`]. Equating two variables joins their classes;
//! equating a variable with a type merges the type into the class binding.
//! Bound types are compared structurally as they are. Variables nested
//! inside them are not resolved here.

use std::fmt;

use crate::error::UnifyError;
use crate::key::{UnifyKey, UnifyValue};
use crate::table::UnificationTable;

/// Identifier of the syntax node a constraint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type variable; a key into the inference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar {
    id: u32,
}

impl TypeVar {
    /// Returns the dense id of this variable.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?T{}", self.id)
    }
}

impl UnifyKey for TypeVar {
    type Value = TypeBinding;

    fn index(&self) -> u32 {
        self.id
    }

    fn from_index(index: u32) -> Self {
        Self { id: index }
    }

    fn tag() -> &'static str {
        "TypeVar"
    }

    /// A bound class keeps its representative when joined with an unbound one.
    fn order_roots(
        a: Self,
        a_value: &TypeBinding,
        b: Self,
        b_value: &TypeBinding,
    ) -> Option<(Self, Self)> {
        match (a_value, b_value) {
            (TypeBinding::Bound(_), TypeBinding::Unbound) => Some((a, b)),
            (TypeBinding::Unbound, TypeBinding::Bound(_)) => Some((b, a)),
            _ => None,
        }
    }
}

/// Types of the source language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// String.
    String,
    /// Qubit.
    Qubit,
    /// Angle.
    Angle,
    /// Duration.
    Duration,
    /// Named enumeration.
    Enum(String),
    /// Type variable.
    Var(TypeVar),
    /// Function type.
    Fun {
        /// Parameter types, in order.
        params: Vec<Self>,
        /// Return type.
        ret: Box<Self>,
    },
    /// Struct with positional field types.
    Struct(Vec<Self>),
    /// Union of variant types.
    Union(Vec<Self>),
}

impl Ty {
    /// Builds a function type.
    #[must_use]
    pub fn fun(params: Vec<Self>, ret: Self) -> Self {
        Self::Fun {
            params,
            ret: Box::new(ret),
        }
    }

    /// Returns `true` for function types.
    #[must_use]
    pub const fn is_fun(&self) -> bool {
        matches!(self, Self::Fun { .. })
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Ty]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::Qubit => f.write_str("qubit"),
            Self::Angle => f.write_str("angle"),
            Self::Duration => f.write_str("duration"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Var(var) => write!(f, "{var}"),
            Self::Fun { params, ret } => {
                f.write_str("fn(")?;
                write_list(f, params)?;
                write!(f, ") -> {ret}")
            }
            Self::Struct(fields) => {
                f.write_str("struct { ")?;
                write_list(f, fields)?;
                f.write_str(" }")
            }
            Self::Union(variants) => {
                f.write_str("union { ")?;
                write_list(f, variants)?;
                f.write_str(" }")
            }
        }
    }
}

/// Class value of a type variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TypeBinding {
    /// Nothing is known yet.
    #[default]
    Unbound,
    /// Bound to a concrete type.
    Bound(Ty),
}

impl TypeBinding {
    /// Returns the bound type, if any.
    #[must_use]
    pub const fn as_bound(&self) -> Option<&Ty> {
        match self {
            Self::Unbound => None,
            Self::Bound(ty) => Some(ty),
        }
    }

    /// Consumes the binding, returning the bound type, if any.
    #[must_use]
    pub fn into_bound(self) -> Option<Ty> {
        match self {
            Self::Unbound => None,
            Self::Bound(ty) => Some(ty),
        }
    }
}

/// Two bound types that were required to be equal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected `{expected}`, found `{found}`")]
pub struct TypeMismatch {
    /// Type already bound to the class.
    pub expected: Ty,
    /// Type that was merged in.
    pub found: Ty,
}

impl UnifyValue for TypeBinding {
    type Error = TypeMismatch;

    fn merge(&mut self, other: &Self) -> Result<(), TypeMismatch> {
        let Self::Bound(theirs) = other else {
            return Ok(());
        };
        match self {
            Self::Unbound => {
                *self = Self::Bound(theirs.clone());
                Ok(())
            }
            Self::Bound(ours) if ours == theirs => Ok(()),
            Self::Bound(ours) => Err(TypeMismatch {
                expected: ours.clone(),
                found: theirs.clone(),
            }),
        }
    }
}

/// Why a constraint was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// A function appeared where a non-function was expected.
    UnexpectedFun(NodeId),
    /// An application's callee was expected to be a function.
    AppExpectedFun(NodeId),
    /// Two types were expected to unify.
    ExpectedUnify(NodeId),
}

impl Provenance {
    /// Returns the syntax node the constraint came from.
    #[must_use]
    pub const fn id(self) -> NodeId {
        match self {
            Self::UnexpectedFun(id) | Self::AppExpectedFun(id) | Self::ExpectedUnify(id) => id,
        }
    }
}

/// A type error tied to the constraint that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{mismatch} (constraint from node {})", .provenance.id())]
pub struct TypeError {
    /// Origin of the failed constraint.
    pub provenance: Provenance,
    /// The incompatible types.
    pub mismatch: TypeMismatch,
}

/// Table error for type variables.
pub type InferError = UnifyError<TypeMismatch>;

/// Type-variable state of one inference pass.
///
/// Merge conflicts are recorded as [`TypeError`]s and inference carries on;
/// every other table error is returned to the caller.
#[derive(Debug, Default)]
pub struct TypeInference {
    table: UnificationTable<TypeVar>,
    errors: Vec<TypeError>,
}

impl TypeInference {
    /// Creates an empty inference state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh, unbound type variable.
    ///
    /// # Errors
    ///
    /// Fails only if the table cannot grow.
    pub fn fresh_ty_var(&mut self) -> Result<TypeVar, InferError> {
        self.table.new_key(TypeBinding::Unbound)
    }

    /// Requires `a` and `b` to denote the same type.
    ///
    /// # Errors
    ///
    /// Fails if either variable is unknown. A binding conflict is recorded
    /// in [`errors`](Self::errors) instead.
    pub fn unify_var_var(
        &mut self,
        a: TypeVar,
        b: TypeVar,
        provenance: Provenance,
    ) -> Result<(), InferError> {
        let result = self.table.union(a, b);
        self.record(result, provenance)
    }

    /// Requires `var` to denote `ty`.
    ///
    /// # Errors
    ///
    /// Fails if a variable is unknown. A binding conflict is recorded in
    /// [`errors`](Self::errors) instead.
    pub fn unify_var_ty(
        &mut self,
        var: TypeVar,
        ty: Ty,
        provenance: Provenance,
    ) -> Result<(), InferError> {
        if let Ty::Var(other) = ty {
            return self.unify_var_var(var, other, provenance);
        }
        let result = self.table.union_value(var, TypeBinding::Bound(ty));
        self.record(result, provenance)
    }

    /// Returns the type bound to `var`'s class, if any.
    ///
    /// # Errors
    ///
    /// Fails if `var` is unknown.
    pub fn resolve(&mut self, var: TypeVar) -> Result<Option<Ty>, InferError> {
        Ok(self.table.probe(var)?.into_bound())
    }

    /// Returns the representative variable of `var`'s class.
    ///
    /// # Errors
    ///
    /// Fails if `var` is unknown.
    pub fn representative(&mut self, var: TypeVar) -> Result<TypeVar, InferError> {
        self.table.find(var)
    }

    /// Runs `f` speculatively.
    ///
    /// Returns `Ok(Some(_))` and keeps every effect of `f` if it succeeds
    /// without recording a type error. Otherwise the table and the error list
    /// are restored: a recorded type error yields `Ok(None)`, an error from
    /// `f` is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` leaves a snapshot of its own open.
    pub fn speculate<T, F>(&mut self, f: F) -> Result<Option<T>, InferError>
    where
        F: FnOnce(&mut Self) -> Result<T, InferError>,
    {
        let snapshot = self.table.snapshot();
        let errors_before = self.errors.len();
        let result = f(self);
        let keep = result.is_ok() && self.errors.len() == errors_before;

        let closed = if keep {
            self.table.commit(snapshot)
        } else {
            self.errors.truncate(errors_before);
            self.table.rollback_to(snapshot)
        };
        assert!(closed.is_ok(), "speculative closure left a snapshot open");
        result.map(|value| keep.then_some(value))
    }

    /// Type errors recorded so far, in order.
    #[must_use]
    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    /// Consumes the state, returning the recorded type errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<TypeError> {
        self.errors
    }

    /// Read access to the underlying table.
    #[must_use]
    pub const fn table(&self) -> &UnificationTable<TypeVar> {
        &self.table
    }

    /// Mutable access to the underlying table, e.g. for snapshots.
    pub const fn table_mut(&mut self) -> &mut UnificationTable<TypeVar> {
        &mut self.table
    }

    fn record(
        &mut self,
        result: Result<(), InferError>,
        provenance: Provenance,
    ) -> Result<(), InferError> {
        match result {
            Err(UnifyError::MergeConflict(mismatch)) => {
                self.errors.push(TypeError {
                    provenance,
                    mismatch,
                });
                Ok(())
            }
            other => other,
        }
    }
}
