//! Hash-consed term storage and fresh region slots.
//!
//! # Design
//!
//! The context keeps two structures over one append-only store:
//! - `terms`: handle → term, the store itself
//! - `table`: term → handle, the hash-consing table
//!
//! Interned child handles are canonical by induction, so a `Term` value is
//! its own structural key: probing the table with it finds any
//! structurally equal prior term. Slots bypass the table entirely, which
//! is what makes each `slot()` call a brand-new variable even though every
//! slot looks alike up to its index.
//!
//! Handle equality therefore means structural equality everywhere
//! downstream, and the constraint solver never compares terms any other
//! way.

use std::collections::HashMap;

use strata_mem::{StringInterner, Symbol};

use crate::types::{Region, Term, Ty};

/// Context statistics, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtxStats {
    /// Total terms in the store, slots included.
    pub terms: usize,
    /// Interned (table-reachable) terms.
    pub interned: usize,
    /// Region slots minted so far.
    pub slots: usize,
}

/// The interning context: owns every term of one compilation unit.
///
/// Terms are immutable once created and live as long as the context.
/// Nothing is freed individually; a unifier's results must be
/// canonicalized and copied out before the context is dropped.
///
/// # Example
///
/// ```
/// use strata_infer::{Region, TermCtx};
///
/// let mut ctx = TermCtx::new();
/// let int = ctx.scalar_named("Int");
/// let global = ctx.region(Region::Global);
///
/// // Equal structure, same handle:
/// assert_eq!(ctx.pointer(global, int), ctx.pointer(global, int));
///
/// // Every slot is new:
/// assert_ne!(ctx.slot(), ctx.slot());
/// ```
pub struct TermCtx {
    /// Name interner for scalars, fields, and region keywords.
    names: StringInterner,

    /// Handle → term. Append-only.
    terms: Vec<Term>,

    /// Term → handle, for every non-slot term.
    table: HashMap<Term, Ty>,

    /// Count of slots minted.
    slots: usize,
}

impl TermCtx {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: StringInterner::new(),
            terms: Vec::new(),
            table: HashMap::new(),
            slots: 0,
        }
    }

    /// The name interner.
    #[must_use]
    pub fn names(&self) -> &StringInterner {
        &self.names
    }

    /// The name interner, for interning new names.
    pub fn names_mut(&mut self) -> &mut StringInterner {
        &mut self.names
    }

    /// Dereferences a handle.
    ///
    /// # Panics
    ///
    /// Panics when given a handle minted by a different context.
    #[must_use]
    pub fn term(&self, ty: Ty) -> &Term {
        self.terms
            .get(ty.index())
            .unwrap_or_else(|| panic!("term handle {} does not belong to this context", ty))
    }

    /// Number of terms in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true when no term has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns store statistics.
    #[must_use]
    pub fn stats(&self) -> CtxStats {
        CtxStats {
            terms: self.terms.len(),
            interned: self.table.len(),
            slots: self.slots,
        }
    }

    /// Interns a non-slot term: returns the existing handle for equal
    /// structure, or appends and records a new one.
    fn intern(&mut self, term: Term) -> Ty {
        debug_assert!(!term.is_slot(), "slots are never interned");

        if let Some(&ty) = self.table.get(&term) {
            return ty;
        }

        let ty = Ty::from_index(self.terms.len());
        self.terms.push(term.clone());
        self.table.insert(term, ty);
        ty
    }

    /// Mints a fresh, never-before-seen unsolved region slot.
    ///
    /// Slots are not interned: each call is a distinct variable, and the
    /// handle is the variable's identity. A declaration whose region tag
    /// is unspecified gets exactly one slot, reused at every occurrence of
    /// that declaration.
    pub fn slot(&mut self) -> Ty {
        let index = self.terms.len();
        self.terms.push(Term::Slot(index as u32));
        self.slots += 1;
        Ty::from_index(index)
    }

    /// Returns the single shared term for a concrete region.
    ///
    /// # Panics
    ///
    /// Panics for [`Region::Unspecified`]: an unspecified annotation has
    /// no shared term and must be given a fresh [`slot`](Self::slot).
    pub fn region(&mut self, region: Region) -> Ty {
        assert!(
            region.is_concrete(),
            "the unspecified region has no shared term; mint a fresh slot instead"
        );
        self.intern(Term::Region(region))
    }

    /// Interns a scalar term for an opaque value-type descriptor.
    pub fn scalar(&mut self, name: Symbol) -> Ty {
        self.intern(Term::Scalar(name))
    }

    /// Interns a scalar term, interning its name first.
    pub fn scalar_named(&mut self, name: &str) -> Ty {
        let sym = self.names.intern(name);
        self.scalar(sym)
    }

    /// Interns a region-qualified pointer term.
    pub fn pointer(&mut self, region: Ty, elem: Ty) -> Ty {
        self.qual(region, elem, false)
    }

    /// Interns a region-qualified reference term.
    pub fn reference(&mut self, region: Ty, elem: Ty) -> Ty {
        self.qual(region, elem, true)
    }

    fn qual(&mut self, region: Ty, elem: Ty, reference: bool) -> Ty {
        debug_assert!(
            matches!(self.term(region), Term::Slot(_) | Term::Region(_)),
            "qualifier position must hold a region leaf"
        );
        self.intern(Term::Qual {
            region,
            elem,
            reference,
        })
    }

    /// Interns a sequence (array/vector) term.
    pub fn seq(&mut self, elem: Ty) -> Ty {
        self.intern(Term::Seq(elem))
    }

    /// Interns a function term.
    pub fn func(&mut self, recv: Option<Ty>, ret: Ty, params: Vec<Ty>) -> Ty {
        self.intern(Term::Func { recv, ret, params })
    }

    /// Interns a record term.
    ///
    /// Field and base ids are opaque per-declaration identifiers; every
    /// base handle must name a record term.
    pub fn record(&mut self, fields: Vec<(Symbol, Ty)>, bases: Vec<(Symbol, Ty)>) -> Ty {
        debug_assert!(
            bases
                .iter()
                .all(|&(_, ty)| matches!(self.term(ty), Term::Record { .. })),
            "record bases must be record terms"
        );
        self.intern(Term::Record { fields, bases })
    }

    /// Returns true when no unsolved slot is reachable through `ty`.
    ///
    /// Records require *all* fields and bases solved.
    #[must_use]
    pub fn is_solved(&self, ty: Ty) -> bool {
        match self.term(ty) {
            Term::Slot(_) => false,
            Term::Region(_) | Term::Scalar(_) => true,
            Term::Qual { region, elem, .. } => self.is_solved(*region) && self.is_solved(*elem),
            Term::Seq(elem) => self.is_solved(*elem),
            Term::Func { recv, ret, params } => {
                recv.is_none_or(|r| self.is_solved(r))
                    && self.is_solved(*ret)
                    && params.iter().all(|&p| self.is_solved(p))
            }
            Term::Record { fields, bases } => {
                fields.iter().all(|&(_, t)| self.is_solved(t))
                    && bases.iter().all(|&(_, t)| self.is_solved(t))
            }
        }
    }

    /// Re-instantiates `ty` with fresh slots for its unsolved variables.
    ///
    /// This is the instantiation half of let-polymorphism: each call site
    /// of a region-polymorphic callee derives its own copy of the
    /// callee's terms so that solving one site never pins another.
    ///
    /// Every reachable unsolved slot not yet in `fresh` is replaced by a
    /// new slot and the mapping recorded, so repeated occurrences of one
    /// variable map to one replacement. Compound terms are rebuilt
    /// bottom-up, but the original handle is returned whenever no child
    /// changed; solved subtrees are shared, not copied.
    pub fn derive(&mut self, ty: Ty, fresh: &mut HashMap<Ty, Ty>) -> Ty {
        let term = self.term(ty).clone();
        match term {
            Term::Slot(_) => {
                if let Some(&replacement) = fresh.get(&ty) {
                    replacement
                } else {
                    let replacement = self.slot();
                    fresh.insert(ty, replacement);
                    replacement
                }
            }

            Term::Region(_) | Term::Scalar(_) => ty,

            Term::Qual {
                region,
                elem,
                reference,
            } => {
                let new_region = self.derive(region, fresh);
                let new_elem = self.derive(elem, fresh);
                if new_region == region && new_elem == elem {
                    ty
                } else if reference {
                    self.reference(new_region, new_elem)
                } else {
                    self.pointer(new_region, new_elem)
                }
            }

            Term::Seq(elem) => {
                let new_elem = self.derive(elem, fresh);
                if new_elem == elem { ty } else { self.seq(new_elem) }
            }

            Term::Func { recv, ret, params } => {
                let new_recv = recv.map(|r| self.derive(r, fresh));
                let new_ret = self.derive(ret, fresh);
                let new_params: Vec<Ty> = params.iter().map(|&p| self.derive(p, fresh)).collect();

                if new_recv == recv && new_ret == ret && new_params == params {
                    ty
                } else {
                    self.func(new_recv, new_ret, new_params)
                }
            }

            Term::Record { fields, bases } => {
                let new_fields: Vec<(Symbol, Ty)> = fields
                    .iter()
                    .map(|&(id, t)| (id, self.derive(t, fresh)))
                    .collect();
                let new_bases: Vec<(Symbol, Ty)> = bases
                    .iter()
                    .map(|&(id, t)| (id, self.derive(t, fresh)))
                    .collect();

                if new_fields == fields && new_bases == bases {
                    ty
                } else {
                    self.record(new_fields, new_bases)
                }
            }
        }
    }
}

impl Default for TermCtx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_identity() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);

        let a = ctx.pointer(global, int);
        let b = ctx.pointer(global, int);
        assert_eq!(a, b);
        assert_eq!(ctx.term(a), ctx.term(b));
    }

    #[test]
    fn test_different_structure_different_handle() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);
        let group = ctx.region(Region::Group);

        assert_ne!(ctx.pointer(global, int), ctx.pointer(group, int));
        assert_ne!(ctx.pointer(global, int), ctx.reference(global, int));
    }

    #[test]
    fn test_one_term_per_region_tag() {
        let mut ctx = TermCtx::new();

        assert_eq!(ctx.region(Region::Private), ctx.region(Region::Private));
        assert_ne!(ctx.region(Region::Private), ctx.region(Region::Constant));
    }

    #[test]
    #[should_panic(expected = "unspecified region")]
    fn test_unspecified_region_panics() {
        let mut ctx = TermCtx::new();
        ctx.region(Region::Unspecified);
    }

    #[test]
    fn test_slots_are_fresh() {
        let mut ctx = TermCtx::new();

        let a = ctx.slot();
        let b = ctx.slot();
        assert_ne!(a, b);
        assert!(ctx.term(a).is_slot());
        assert_eq!(ctx.stats().slots, 2);
    }

    #[test]
    fn test_scalar_names_deduplicate() {
        let mut ctx = TermCtx::new();

        assert_eq!(ctx.scalar_named("Float"), ctx.scalar_named("Float"));
        assert_ne!(ctx.scalar_named("Float"), ctx.scalar_named("Int"));
    }

    #[test]
    #[should_panic(expected = "does not belong to this context")]
    fn test_foreign_handle_panics() {
        let mut big = TermCtx::new();
        for i in 0..10 {
            big.scalar_named(&format!("T{}", i));
        }
        let foreign = big.scalar_named("T9");

        let small = TermCtx::new();
        small.term(foreign);
    }

    #[test]
    fn test_is_solved_leaves() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);
        let slot = ctx.slot();

        assert!(ctx.is_solved(int));
        assert!(ctx.is_solved(global));
        assert!(!ctx.is_solved(slot));
    }

    #[test]
    fn test_is_solved_compound() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);
        let slot = ctx.slot();

        let solved_ptr = ctx.pointer(global, int);
        let unsolved_ptr = ctx.pointer(slot, int);

        assert!(ctx.is_solved(solved_ptr));
        assert!(!ctx.is_solved(unsolved_ptr));

        let seq = ctx.seq(unsolved_ptr);
        assert!(!ctx.is_solved(seq));
    }

    #[test]
    fn test_is_solved_record_requires_all_fields() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);
        let slot = ctx.slot();
        let solved_ptr = ctx.pointer(global, int);
        let unsolved_ptr = ctx.pointer(slot, int);

        let a = ctx.names_mut().intern("a");
        let b = ctx.names_mut().intern("b");

        let record = ctx.record(vec![(a, solved_ptr), (b, unsolved_ptr)], vec![]);
        assert!(!ctx.is_solved(record));

        let solved = ctx.record(vec![(a, solved_ptr), (b, solved_ptr)], vec![]);
        assert!(ctx.is_solved(solved));
    }

    #[test]
    fn test_derive_solved_term_is_identical() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);
        let ptr = ctx.pointer(global, int);
        let func = ctx.func(None, ptr, vec![int]);

        let mut fresh = HashMap::new();
        assert_eq!(ctx.derive(func, &mut fresh), func);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_derive_replaces_slots() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let slot = ctx.slot();
        let ptr = ctx.pointer(slot, int);

        let mut fresh = HashMap::new();
        let derived = ctx.derive(ptr, &mut fresh);

        assert_ne!(derived, ptr);
        assert_eq!(fresh.len(), 1);

        let replacement = fresh[&slot];
        assert_ne!(replacement, slot);
        assert!(ctx.term(replacement).is_slot());
    }

    #[test]
    fn test_derive_reuses_one_replacement_per_slot() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let slot = ctx.slot();
        let a = ctx.pointer(slot, int);
        let b = ctx.reference(slot, int);
        let func = ctx.func(None, a, vec![b]);

        let mut fresh = HashMap::new();
        let derived = ctx.derive(func, &mut fresh);

        assert_eq!(fresh.len(), 1);
        let Term::Func { ret, params, .. } = ctx.term(derived).clone() else {
            panic!("derived term should still be a function");
        };
        let Term::Qual { region: r1, .. } = ctx.term(ret) else {
            panic!("return should still be qualified");
        };
        let Term::Qual { region: r2, .. } = ctx.term(params[0]) else {
            panic!("param should still be qualified");
        };
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_derive_shares_solved_subtrees() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let global = ctx.region(Region::Global);
        let solved_ptr = ctx.pointer(global, int);
        let slot = ctx.slot();
        let unsolved_ptr = ctx.pointer(slot, int);
        let func = ctx.func(None, solved_ptr, vec![unsolved_ptr]);

        let mut fresh = HashMap::new();
        let derived = ctx.derive(func, &mut fresh);

        assert_ne!(derived, func);
        let Term::Func { ret, .. } = ctx.term(derived) else {
            panic!("derived term should still be a function");
        };
        // The fully solved return subtree is the same term, not a copy.
        assert_eq!(*ret, solved_ptr);
    }
}
