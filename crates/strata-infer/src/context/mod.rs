//! The interning context.
//!
//! One [`TermCtx`] exists per compilation unit. It is the single source of
//! truth for "does this exact term already exist": every constructor
//! hash-conses, fresh region slots come from here, and let-polymorphic
//! re-instantiation of solved terms goes through [`TermCtx::derive`].

pub mod intern;

pub use intern::{CtxStats, TermCtx};
