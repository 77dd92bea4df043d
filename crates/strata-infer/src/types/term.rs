//! Core term representation for region inference.
//!
//! This module defines the `Term` enum, the type-term lattice the engine
//! unifies over. A term mirrors a program type but only region content
//! matters: value types are fixed before inference starts and appear here
//! as opaque scalars, while every region-carrying position holds either a
//! concrete [`Region`] or an unsolved *slot* awaiting unification.
//!
//! # Design
//!
//! - Terms are immutable and interned by [`TermCtx`](crate::TermCtx):
//!   structurally equal terms share one handle, so `Ty` equality is both
//!   identity and structural equality
//! - A slot's identity is its own handle; two distinct slots never compare
//!   equal, and a slot is never entered in the intern table
//! - The variant set is closed and every consumer matches exhaustively, so
//!   adding a shape is a compile-time sweep of the engine

use std::fmt;
use strata_mem::Symbol;

/// An interned term handle.
///
/// `Ty` is an index into the owning context's term store. Because the
/// store is hash-consed, two handles are equal exactly when the terms they
/// name are structurally equal, which makes `Ty` the hash/equality key for
/// constraint deduplication, substitution maps, and derivation scratch
/// maps throughout the engine.
///
/// Handles are meaningful only with the context that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ty(u32);

impl Ty {
    /// Creates a handle from a store index.
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the store index of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A memory region of the Strata abstract machine.
///
/// `Unspecified` is the absence of an annotation in source. It is not a
/// concrete region: a position annotated `Unspecified` must be given a
/// fresh slot, never an interned region term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// No annotation in source; inference decides.
    Unspecified,
    /// Device-global memory, visible to every invocation.
    Global,
    /// Workgroup-shared memory.
    Group,
    /// Per-invocation private memory.
    Private,
    /// Read-only constant memory.
    Constant,
}

impl Region {
    /// The surface-language keyword for this region.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Region::Unspecified => "unspecified",
            Region::Global => "global",
            Region::Group => "group",
            Region::Private => "private",
            Region::Constant => "constant",
        }
    }

    /// Returns true for every region except `Unspecified`.
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        !matches!(self, Region::Unspecified)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A type term.
///
/// The region-carrying positions (`Slot`, `Region`, and the `region` field
/// of `Qual`) are what inference resolves; everything else is structure
/// that constraints decompose through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// An unsolved region variable. The payload equals the term's own
    /// store index, so distinct slots are distinct values.
    Slot(u32),

    /// A concrete memory region. One interned instance per tag.
    Region(Region),

    /// An opaque value type (e.g. `Int`, `Float`, an enum). Carries no
    /// region content; equal iff the descriptors are equal.
    Scalar(Symbol),

    /// A region-qualified pointer (`reference == false`) or reference
    /// (`reference == true`) to an element type. The flag records the
    /// syntactic origin and participates in equality; references
    /// dereference on use but carry regions identically.
    Qual {
        /// The region holding the pointee.
        region: Ty,
        /// The pointee type.
        elem: Ty,
        /// Reference rather than pointer origin.
        reference: bool,
    },

    /// An array/vector of an element type. The length is irrelevant to
    /// region inference and is not modeled.
    Seq(Ty),

    /// A function shape.
    Func {
        /// Receiver type for methods.
        recv: Option<Ty>,
        /// Return type.
        ret: Ty,
        /// Parameter types, in declaration order.
        params: Vec<Ty>,
    },

    /// An aggregate with ordered fields and bases. The symbols are opaque
    /// per-declaration identifiers used as lookup keys; each base handle
    /// refers to a `Record` term.
    Record {
        /// Field id/type pairs, in declaration order.
        fields: Vec<(Symbol, Ty)>,
        /// Base id/record pairs, in declaration order.
        bases: Vec<(Symbol, Ty)>,
    },
}

impl Term {
    /// Returns true for unsolved region variables.
    #[must_use]
    pub const fn is_slot(&self) -> bool {
        matches!(self, Term::Slot(_))
    }

    /// Calls `f` on every direct child handle, in structural order.
    pub fn for_each_child(&self, mut f: impl FnMut(Ty)) {
        match self {
            Term::Slot(_) | Term::Region(_) | Term::Scalar(_) => {}
            Term::Qual { region, elem, .. } => {
                f(*region);
                f(*elem);
            }
            Term::Seq(elem) => f(*elem),
            Term::Func { recv, ret, params } => {
                if let Some(recv) = recv {
                    f(*recv);
                }
                f(*ret);
                for &param in params {
                    f(param);
                }
            }
            Term::Record { fields, bases } => {
                for &(_, ty) in fields {
                    f(ty);
                }
                for &(_, ty) in bases {
                    f(ty);
                }
            }
        }
    }

    /// Pairs up the matching children of two same-constructor compound
    /// terms, calling `pair` once per child pair.
    ///
    /// Returns `false` without calling `pair` further when the outer
    /// constructors (or their fixed structure: pointer/reference flag,
    /// arity, receiver presence, field/base ids) differ. This is the
    /// two-term visitor of constraint decomposition: the `false` branch is
    /// the "incompatible kinds" default case.
    pub fn zip(a: &Term, b: &Term, mut pair: impl FnMut(Ty, Ty)) -> bool {
        match (a, b) {
            (
                Term::Qual {
                    region: ra,
                    elem: ea,
                    reference: fa,
                },
                Term::Qual {
                    region: rb,
                    elem: eb,
                    reference: fb,
                },
            ) => {
                if fa != fb {
                    return false;
                }
                pair(*ra, *rb);
                pair(*ea, *eb);
                true
            }

            (Term::Seq(ea), Term::Seq(eb)) => {
                pair(*ea, *eb);
                true
            }

            (
                Term::Func {
                    recv: va,
                    ret: ra,
                    params: pa,
                },
                Term::Func {
                    recv: vb,
                    ret: rb,
                    params: pb,
                },
            ) => {
                if pa.len() != pb.len() {
                    return false;
                }
                match (va, vb) {
                    (None, None) => {}
                    (Some(x), Some(y)) => pair(*x, *y),
                    _ => return false,
                }
                pair(*ra, *rb);
                for (&x, &y) in pa.iter().zip(pb.iter()) {
                    pair(x, y);
                }
                true
            }

            (
                Term::Record {
                    fields: fa,
                    bases: ba,
                },
                Term::Record {
                    fields: fb,
                    bases: bb,
                },
            ) => {
                if fa.len() != fb.len() || ba.len() != bb.len() {
                    return false;
                }
                if fa.iter().zip(fb.iter()).any(|((ia, _), (ib, _))| ia != ib) {
                    return false;
                }
                if ba.iter().zip(bb.iter()).any(|((ia, _), (ib, _))| ia != ib) {
                    return false;
                }
                for ((_, ta), (_, tb)) in fa.iter().zip(fb.iter()) {
                    pair(*ta, *tb);
                }
                for ((_, ta), (_, tb)) in ba.iter().zip(bb.iter()) {
                    pair(*ta, *tb);
                }
                true
            }

            _ => false,
        }
    }
}
