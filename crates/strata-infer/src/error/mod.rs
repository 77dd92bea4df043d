//! Region inference errors.
//!
//! The engine has exactly one expected failure: two concrete regions
//! forced equal by transitive constraints. Everything else that can go
//! wrong (foreign handles, malformed terms, constraints between
//! incompatible shapes) is a violated internal invariant and panics.

use std::fmt;

use crate::span::Trace;
use crate::types::Region;

/// Two concrete regions forced equal by transitive constraints.
///
/// Detected only at the leaf comparison step of unification, never
/// inferred indirectly. Each side carries the chain of source sites that
/// forced it to its region; the chains are preserved through compound
/// decomposition and substitution redirects.
///
/// A conflict is a hard failure for the enclosing scope: the unifier
/// stops at the first one, and the scope's partial substitution must not
/// be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConflict {
    left: Region,
    right: Region,
    left_trace: Trace,
    right_trace: Trace,
}

impl RegionConflict {
    /// Creates a conflict between two concrete regions.
    #[must_use]
    pub fn new(left: Region, right: Region, left_trace: Trace, right_trace: Trace) -> Self {
        debug_assert!(left.is_concrete() && right.is_concrete());
        debug_assert!(left != right);
        Self {
            left,
            right,
            left_trace,
            right_trace,
        }
    }

    /// The two regions that disagree.
    #[must_use]
    pub fn regions(&self) -> (Region, Region) {
        (self.left, self.right)
    }

    /// The chain of sites that forced the left side to its region.
    #[must_use]
    pub fn left_trace(&self) -> &Trace {
        &self.left_trace
    }

    /// The chain of sites that forced the right side to its region.
    #[must_use]
    pub fn right_trace(&self) -> &Trace {
        &self.right_trace
    }

    /// Renders the conflict with one site per line for both chains.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self);
        out.push_str(&format!("  `{}` forced at:\n", self.left));
        for site in self.left_trace.sites() {
            out.push_str(&format!("    {}\n", site));
        }
        out.push_str(&format!("  `{}` forced at:\n", self.right));
        for site in self.right_trace.sites() {
            out.push_str(&format!("    {}\n", site));
        }
        out
    }
}

impl fmt::Display for RegionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conflicting memory regions: `{}` vs `{}`",
            self.left, self.right
        )
    }
}

impl std::error::Error for RegionConflict {}

/// A result type for region inference operations.
pub type Result<T> = std::result::Result<T, RegionConflict>;
