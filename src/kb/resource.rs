//! Linear Resource
//!
//! A stored fact plus the bookkeeping flags the engine needs to consume it
//! exactly once per branch and restore it on backtracking.

use crate::symbols::SymbolId;
use crate::term::Term;

/// How many times a resource may be used before it is spent.
///
/// Ordinal values matter here: `Persistent` and `Exponential` are the
/// persistence levels at which `consumed` must remain permanently `false`
/// (`SPEC_FULL.md` §3, "For persistence-level ≥ 2, consumed must remain
/// 0"), so the discriminants below are chosen to preserve that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Persistence {
    /// Consumed exactly once; absence at derivation end is a failure.
    Linear = 0,
    /// Consumed at most once; absence at derivation end is not an error.
    LinearOptional = 1,
    /// Never consumed; reusable arbitrarily many times (`!A`).
    Exponential = 2,
    /// Never consumed; a clone-wrapped assertion.
    Persistent = 3,
}

impl Persistence {
    /// Resources at this level or above are never marked consumed.
    pub fn is_reusable(self) -> bool {
        matches!(self, Persistence::Exponential | Persistence::Persistent)
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Persistence::LinearOptional)
    }
}

/// Opaque, stable identity for a resource within one knowledge base.
/// Assigned in insertion order; never reused, even after deallocation, so a
/// stale handle reliably fails lookups instead of aliasing a newer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u64);

/// A fact stored in the knowledge base, with its consumption bookkeeping.
#[derive(Debug, Clone)]
pub struct LinearResource {
    pub id: ResourceId,
    pub fact: Term,
    pub persistence: Persistence,
    pub consumed: bool,
    pub deallocated: bool,
    /// Estimated byte size, for budgeting only; never consulted for
    /// correctness.
    pub memory_size: u16,
    /// Provenance tag (e.g. the rule or assertion site that produced it).
    pub allocation_site: SymbolId,
}

impl LinearResource {
    pub fn new(
        id: ResourceId,
        fact: Term,
        persistence: Persistence,
        allocation_site: SymbolId,
    ) -> Self {
        LinearResource {
            id,
            memory_size: estimate_size(&fact),
            fact,
            persistence,
            consumed: false,
            deallocated: false,
            allocation_site,
        }
    }

    /// True if this resource may still be matched: not deallocated, and
    /// (for non-reusable persistence levels) not yet consumed.
    pub fn is_available(&self) -> bool {
        if self.deallocated {
            return false;
        }
        self.persistence.is_reusable() || !self.consumed
    }
}

/// Rough, non-authoritative size estimate used only for memory budgeting.
fn estimate_size(term: &Term) -> u16 {
    fn go(term: &Term, acc: &mut u32) {
        *acc += 8;
        if let Term::Compound { args, .. } = term {
            for a in args {
                go(a, acc);
            }
        }
        if let Term::Clone(inner) = term {
            go(inner, acc);
        }
    }
    let mut acc = 0u32;
    go(term, &mut acc);
    acc.min(u32::from(u16::MAX)) as u16
}
