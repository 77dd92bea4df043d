//! Term rendering for diagnostics and logs.
//!
//! Rendering needs the owning context: handles must be dereferenced and
//! scalar/field symbols resolved through the name interner. Unsolved slots
//! print as `?N` where `N` is the slot's store index, a stable debug-only
//! identifier.

use std::fmt;

use crate::context::TermCtx;

use super::term::{Term, Ty};

/// A term bound to its context for display.
///
/// # Example
///
/// ```
/// use strata_infer::{Region, TermCtx};
///
/// let mut ctx = TermCtx::new();
/// let int = ctx.scalar_named("Int");
/// let global = ctx.region(Region::Global);
/// let ptr = ctx.pointer(global, int);
///
/// assert_eq!(format!("{}", ctx.display(ptr)), "*global Int");
/// ```
pub struct DisplayTerm<'a> {
    ty: Ty,
    ctx: &'a TermCtx,
}

impl<'a> DisplayTerm<'a> {
    /// Binds a term handle to its context.
    pub fn new(ty: Ty, ctx: &'a TermCtx) -> Self {
        Self { ty, ctx }
    }
}

impl fmt::Display for DisplayTerm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_term(self.ty, f)
    }
}

impl DisplayTerm<'_> {
    fn fmt_term(&self, ty: Ty, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ctx.term(ty) {
            Term::Slot(id) => write!(f, "?{}", id),

            Term::Region(region) => f.write_str(region.keyword()),

            Term::Scalar(sym) => {
                let name = self.ctx.names().resolve(*sym).unwrap_or("?");
                f.write_str(name)
            }

            Term::Qual {
                region,
                elem,
                reference,
            } => {
                f.write_str(if *reference { "&" } else { "*" })?;
                self.fmt_term(*region, f)?;
                write!(f, " ")?;
                self.fmt_term(*elem, f)
            }

            Term::Seq(elem) => {
                write!(f, "[")?;
                self.fmt_term(*elem, f)?;
                write!(f, "]")
            }

            Term::Func { recv, ret, params } => {
                if let Some(recv) = recv {
                    self.fmt_term(*recv, f)?;
                    write!(f, ".")?;
                }
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.fmt_term(*param, f)?;
                }
                write!(f, ") -> ")?;
                self.fmt_term(*ret, f)
            }

            Term::Record { fields, bases } => {
                write!(f, "{{")?;
                let mut first = true;
                for (id, _) in bases {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    let name = self.ctx.names().resolve(*id).unwrap_or("?");
                    write!(f, "..{}", name)?;
                }
                for (id, ty) in fields {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    let name = self.ctx.names().resolve(*id).unwrap_or("?");
                    write!(f, "{}: ", name)?;
                    self.fmt_term(*ty, f)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl TermCtx {
    /// Creates a display wrapper for a term of this context.
    pub fn display(&self, ty: Ty) -> DisplayTerm<'_> {
        DisplayTerm::new(ty, self)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::TermCtx;
    use crate::types::Region;

    #[test]
    fn test_display_region_and_slot() {
        let mut ctx = TermCtx::new();

        let global = ctx.region(Region::Global);
        assert_eq!(format!("{}", ctx.display(global)), "global");

        let slot = ctx.slot();
        let rendered = format!("{}", ctx.display(slot));
        assert!(rendered.starts_with('?'));
    }

    #[test]
    fn test_display_scalar() {
        let mut ctx = TermCtx::new();

        let float = ctx.scalar_named("Float");
        assert_eq!(format!("{}", ctx.display(float)), "Float");
    }

    #[test]
    fn test_display_qual() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let group = ctx.region(Region::Group);
        let ptr = ctx.pointer(group, int);
        let reference = ctx.reference(group, int);

        assert_eq!(format!("{}", ctx.display(ptr)), "*group Int");
        assert_eq!(format!("{}", ctx.display(reference)), "&group Int");
    }

    #[test]
    fn test_display_seq() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let seq = ctx.seq(int);
        assert_eq!(format!("{}", ctx.display(seq)), "[Int]");
    }

    #[test]
    fn test_display_func() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let bool_ = ctx.scalar_named("Bool");
        let func = ctx.func(None, bool_, vec![int, int]);

        assert_eq!(format!("{}", ctx.display(func)), "(Int, Int) -> Bool");
    }

    #[test]
    fn test_display_method() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let recv = ctx.scalar_named("Buffer");
        let func = ctx.func(Some(recv), int, vec![]);

        assert_eq!(format!("{}", ctx.display(func)), "Buffer.() -> Int");
    }

    #[test]
    fn test_display_record() {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let len = ctx.names_mut().intern("len");
        let base = ctx.names_mut().intern("Shape");

        let base_record = ctx.record(vec![(len, int)], vec![]);
        let record = ctx.record(vec![(len, int)], vec![(base, base_record)]);

        assert_eq!(format!("{}", ctx.display(record)), "{..Shape, len: Int}");
    }
}
