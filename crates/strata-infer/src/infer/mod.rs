//! The unification engine.
//!
//! This module implements constraint solving for region inference:
//!
//! - **Subst**: the slot substitution with path compression
//! - **Unifier**: the constraint worklist, the solve loop, per-scope
//!   child unifiers, and canonicalization

pub mod subst;
pub mod unify;

pub use subst::{Binding, Subst};
pub use unify::{Constraint, ConstraintSet, Unifier};
