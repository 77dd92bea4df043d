//! Constraint solving for region inference.
//!
//! The unifier accepts equality obligations between interned terms and
//! solves them to a substitution over region slots. Solving is a strict
//! worklist loop: pop a constraint, then either bind a slot, compare two
//! concrete regions, or decompose a compound pair into child constraints
//! pushed back onto the worklist.
//!
//! Compound pairs are always decomposed, never compared structurally:
//! interning makes two not-yet-equal polymorphic instances distinct
//! handles even when they denote the same unresolved shape, so only the
//! region leaves can decide anything.
//!
//! The first pair of distinct concrete regions forced together aborts the
//! scope; remaining constraints are not processed and the partial
//! substitution must not be used.

use std::collections::HashSet;

use strata_log::{debug, error, trace};

use crate::context::TermCtx;
use crate::error::{RegionConflict, Result};
use crate::span::{Span, Trace};
use crate::types::{Operand, Term, Ty};

use super::subst::Subst;

/// An equality obligation between two terms.
///
/// Each side carries its own provenance chain; children produced by
/// decomposition inherit both chains, and substitution redirects prepend
/// the binding's chain to the side it substituted.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Left term.
    pub lhs: Ty,
    /// Right term.
    pub rhs: Ty,
    /// Sites that forced the left side.
    pub lhs_trace: Trace,
    /// Sites that forced the right side.
    pub rhs_trace: Trace,
}

/// A deduplicated, insertion-ordered constraint worklist.
///
/// The vector is both the record of accepted constraints and the
/// worklist: a cursor marks how far solving has advanced, and
/// decomposition appends behind it. Deduplication keys on the unordered
/// handle pair, so `(x, y)` and `(y, x)` are one constraint.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    items: Vec<Constraint>,
    seen: HashSet<(Ty, Ty)>,
    cursor: usize,
}

impl ConstraintSet {
    fn key(a: Ty, b: Ty) -> (Ty, Ty) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Inserts a constraint unless it is trivial (`lhs == rhs`) or its
    /// unordered pair is already present. Returns whether it was added.
    pub fn insert(&mut self, lhs: Ty, rhs: Ty, lhs_trace: Trace, rhs_trace: Trace) -> bool {
        if lhs == rhs {
            return false;
        }
        if !self.seen.insert(Self::key(lhs, rhs)) {
            return false;
        }
        self.items.push(Constraint {
            lhs,
            rhs,
            lhs_trace,
            rhs_trace,
        });
        true
    }

    /// Pops the next unprocessed constraint.
    fn pop(&mut self) -> Option<Constraint> {
        let constraint = self.items.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(constraint)
    }

    /// Total accepted constraints, processed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when no constraint was ever accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Constraints not yet processed.
    fn pending(&self) -> usize {
        self.items.len() - self.cursor
    }

    /// A copy with the worklist rewound to the start.
    fn snapshot(&self) -> Self {
        Self {
            items: self.items.clone(),
            seen: self.seen.clone(),
            cursor: 0,
        }
    }
}

/// The unification engine for one inference scope.
///
/// A unifier owns its constraint set and substitution. Function-local
/// solving uses child scopes: [`Unifier::scope`] snapshots the parent's
/// accumulated constraints into an independent unifier with a fresh
/// substitution, so per-function results never leak between scopes.
///
/// # Example
///
/// ```
/// use strata_infer::{Region, TermCtx, Unifier};
///
/// let mut ctx = TermCtx::new();
/// let mut unifier = Unifier::new();
///
/// let v = ctx.slot();
/// let global = ctx.region(Region::Global);
/// unifier.constrain(v, global, None);
///
/// unifier.solve(&ctx).unwrap();
/// assert_eq!(unifier.canonicalize(&mut ctx, v), global);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unifier {
    constraints: ConstraintSet,
    subst: Subst,
}

impl Unifier {
    /// Creates an empty unifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: ConstraintSet::default(),
            subst: Subst::new(),
        }
    }

    /// Creates a child scope: the accumulated constraints are copied, the
    /// substitution starts fresh.
    ///
    /// The child is fully independent afterwards; neither constraints nor
    /// bindings flow back to the parent.
    #[must_use]
    pub fn scope(&self) -> Unifier {
        Unifier {
            constraints: self.constraints.snapshot(),
            subst: Subst::new(),
        }
    }

    /// Number of accepted constraints.
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// The current substitution.
    #[must_use]
    pub fn subst(&self) -> &Subst {
        &self.subst
    }

    /// Records an equality obligation between two terms.
    ///
    /// Identical handles are already equal and are never recorded, and a
    /// pair already present (in either order) is not recorded twice.
    pub fn constrain(&mut self, a: Ty, b: Ty, site: Option<Span>) {
        let trace = Trace::from_site(site);
        if self.constraints.insert(a, b, trace.clone(), trace) {
            trace!("constraint {} = {}", a, b);
        }
    }

    /// Records the obligations implied by equating two usage-site
    /// operands: a region equality when both sides have backing storage,
    /// plus the value-type equality.
    pub fn constrain_operands(&mut self, a: &Operand, b: &Operand, site: Option<Span>) {
        if let (Some(ra), Some(rb)) = (a.region(), b.region()) {
            self.constrain(ra, rb, site);
        }
        self.constrain(a.ty(), b.ty(), site);
    }

    /// Solves all pending constraints.
    ///
    /// Returns the first region conflict encountered; remaining
    /// constraints are left unprocessed and the substitution must not be
    /// trusted after an error.
    pub fn solve(&mut self, ctx: &TermCtx) -> Result<()> {
        debug!("solving {} pending constraints", self.constraints.pending());

        while let Some(constraint) = self.constraints.pop() {
            self.step(ctx, constraint)?;
        }
        Ok(())
    }

    fn step(&mut self, ctx: &TermCtx, c: Constraint) -> Result<()> {
        let lhs = ctx.term(c.lhs).clone();
        let rhs = ctx.term(c.rhs).clone();

        match (&lhs, &rhs) {
            (Term::Slot(_), _) => {
                self.bind(ctx, c.lhs, c.lhs_trace, c.rhs, c.rhs_trace);
                Ok(())
            }

            (_, Term::Slot(_)) => {
                self.bind(ctx, c.rhs, c.rhs_trace, c.lhs, c.lhs_trace);
                Ok(())
            }

            (Term::Region(left), Term::Region(right)) => {
                if left == right {
                    return Ok(());
                }
                let conflict = RegionConflict::new(*left, *right, c.lhs_trace, c.rhs_trace);
                error!("{}", conflict);
                Err(conflict)
            }

            _ => {
                // Compound pair: decompose into child constraints. The
                // children inherit both provenance chains.
                let mut pairs = Vec::new();
                let compatible = Term::zip(&lhs, &rhs, |x, y| pairs.push((x, y)));
                if !compatible {
                    panic!(
                        "constraint between incompatible shapes: {} vs {}",
                        ctx.display(c.lhs),
                        ctx.display(c.rhs)
                    );
                }
                for (x, y) in pairs {
                    self.constraints
                        .insert(x, y, c.lhs_trace.clone(), c.rhs_trace.clone());
                }
                Ok(())
            }
        }
    }

    /// Binds the unsolved `slot` against `other`.
    ///
    /// If either side already has a binding, the constraint is redirected
    /// through it rather than overwriting: the derived constraint carries
    /// the binding's accumulated chain joined with the incoming one.
    fn bind(&mut self, ctx: &TermCtx, slot: Ty, slot_trace: Trace, other: Ty, other_trace: Trace) {
        if let Some(binding) = self.subst.lookup(slot) {
            let (bound, bound_trace) = (binding.ty, binding.trace.clone());
            self.constraints
                .insert(bound, other, bound_trace.join(&slot_trace), other_trace);
            return;
        }

        if let Some(binding) = self.subst.lookup(other) {
            let (bound, bound_trace) = (binding.ty, binding.trace.clone());
            self.constraints
                .insert(slot, bound, slot_trace, bound_trace.join(&other_trace));
            return;
        }

        debug!("binding {} to {}", ctx.display(slot), ctx.display(other));
        self.subst.bind(slot, other, slot_trace.join(&other_trace));
    }

    /// Resolves `ty` to its most-solved form under the current
    /// substitution.
    ///
    /// Slots are followed through the substitution chain until an unbound
    /// slot or a concrete term; compound terms are rebuilt through the
    /// context's intern operations, so the result is interned and
    /// comparable by handle. Idempotent: a canonical term maps to itself.
    pub fn canonicalize(&mut self, ctx: &mut TermCtx, ty: Ty) -> Ty {
        let resolved = self.subst.resolve(ty);
        let term = ctx.term(resolved).clone();

        match term {
            Term::Slot(_) | Term::Region(_) | Term::Scalar(_) => resolved,

            Term::Qual {
                region,
                elem,
                reference,
            } => {
                let new_region = self.canonicalize(ctx, region);
                let new_elem = self.canonicalize(ctx, elem);
                if new_region == region && new_elem == elem {
                    resolved
                } else if reference {
                    ctx.reference(new_region, new_elem)
                } else {
                    ctx.pointer(new_region, new_elem)
                }
            }

            Term::Seq(elem) => {
                let new_elem = self.canonicalize(ctx, elem);
                if new_elem == elem {
                    resolved
                } else {
                    ctx.seq(new_elem)
                }
            }

            Term::Func { recv, ret, params } => {
                let new_recv = recv.map(|r| self.canonicalize(ctx, r));
                let new_ret = self.canonicalize(ctx, ret);
                let new_params: Vec<Ty> = params
                    .iter()
                    .map(|&p| self.canonicalize(ctx, p))
                    .collect();

                if new_recv == recv && new_ret == ret && new_params == params {
                    resolved
                } else {
                    ctx.func(new_recv, new_ret, new_params)
                }
            }

            Term::Record { fields, bases } => {
                let new_fields: Vec<_> = fields
                    .iter()
                    .map(|&(id, t)| (id, self.canonicalize(ctx, t)))
                    .collect();
                let new_bases: Vec<_> = bases
                    .iter()
                    .map(|&(id, t)| (id, self.canonicalize(ctx, t)))
                    .collect();

                if new_fields == fields && new_bases == bases {
                    resolved
                } else {
                    ctx.record(new_fields, new_bases)
                }
            }
        }
    }
}
