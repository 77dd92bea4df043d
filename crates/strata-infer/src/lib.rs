//! Strata memory-region inference.
//!
//! Storage locations in Strata carry a memory-region qualifier (`global`,
//! `group`, `private`, `constant`) that source code may leave unspecified.
//! This crate infers the concrete region behind every unspecified
//! qualifier from usage alone: the front end mirrors the program's static
//! types as interned *terms*, records an equality constraint wherever two
//! terms must denote the same region (assignments, returns, argument
//! binding, casts), and the unifier solves the constraints to a
//! substitution or reports the first pair of regions forced together that
//! disagree.
//!
//! # Architecture
//!
//! - [`types`]: the term lattice — a closed sum of region leaves, scalars,
//!   region-qualified pointers/references, sequences, functions, records
//! - [`context`]: the interning context ([`TermCtx`]) — hash-consed term
//!   storage, fresh region slots, let-polymorphic re-instantiation
//! - [`infer`]: the unifier — constraint worklist, path-compressed
//!   substitution, canonicalization, per-scope child solving
//! - [`error`]: region conflicts with provenance chains for both sides
//!
//! # Example
//!
//! ```
//! use strata_infer::{Region, TermCtx, Unifier};
//!
//! let mut ctx = TermCtx::new();
//! let mut unifier = Unifier::new();
//!
//! // let x: *_ Int = some_global_ptr;
//! let int = ctx.scalar_named("Int");
//! let unknown = ctx.slot();
//! let global = ctx.region(Region::Global);
//! let lhs = ctx.pointer(unknown, int);
//! let rhs = ctx.pointer(global, int);
//!
//! unifier.constrain(lhs, rhs, None);
//! unifier.solve(&ctx).unwrap();
//!
//! assert_eq!(unifier.canonicalize(&mut ctx, unknown), global);
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod infer;
pub mod span;
pub mod types;

pub use context::TermCtx;
pub use error::{RegionConflict, Result};
pub use infer::{Subst, Unifier};
pub use span::{Span, Spanned, Trace};
pub use types::{Operand, Region, Term, Ty};
