//! The slot substitution.
//!
//! Maps unsolved region slots to the terms unification bound them to,
//! with the provenance trace that justified each binding.
//!
//! # Design
//!
//! Binding chains (`slot -> slot -> ... -> term`) arise when slots are
//! unified with each other before either meets a concrete region.
//! [`Subst::resolve`] follows the chain to its representative and
//! compresses the path so later lookups are a single hop; compression
//! folds the traces along the path into each repointed binding, so no
//! provenance is lost to the shortcut.

use std::collections::HashMap;

use crate::span::Trace;
use crate::types::Ty;

/// A recorded binding: the bound term plus the chain of sites that
/// forced the equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The term the slot was bound to.
    pub ty: Ty,
    /// Why the slot was bound.
    pub trace: Trace,
}

/// Substitution from unsolved slots to terms.
///
/// Only slot handles ever appear as keys. A slot is bound at most once;
/// constraining a bound slot again redirects through the binding instead
/// of overwriting it (see the unifier's bind step).
#[derive(Debug, Clone, Default)]
pub struct Subst {
    bindings: HashMap<Ty, Binding>,
}

impl Subst {
    /// Creates an empty substitution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Number of bound slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Looks up the direct binding of a slot, if any.
    #[must_use]
    pub fn lookup(&self, slot: Ty) -> Option<&Binding> {
        self.bindings.get(&slot)
    }

    /// Records `slot -> ty`.
    ///
    /// The slot must be unbound; rebinding is the unifier's redirect
    /// path, never an overwrite.
    pub fn bind(&mut self, slot: Ty, ty: Ty, trace: Trace) {
        debug_assert!(slot != ty, "slot cannot be bound to itself");
        let previous = self.bindings.insert(slot, Binding { ty, trace });
        debug_assert!(previous.is_none(), "slot bound twice");
    }

    /// Follows the binding chain from `ty` to its representative: the
    /// first term that is not a bound slot.
    ///
    /// Compresses the visited path: every slot on it is repointed at the
    /// representative with its accumulated trace, making the next lookup
    /// one hop.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        let mut current = ty;
        let mut path = Vec::new();

        while let Some(binding) = self.bindings.get(&current) {
            path.push(current);
            current = binding.ty;
        }

        // Repoint the path back to front, folding traces outward so each
        // compressed binding keeps the full chain that justified it.
        let mut accumulated = Trace::empty();
        for &slot in path.iter().rev() {
            let binding = self
                .bindings
                .get_mut(&slot)
                .expect("path entries are bound");
            accumulated = binding.trace.join(&accumulated);
            binding.ty = current;
            binding.trace = accumulated.clone();
        }

        current
    }
}
