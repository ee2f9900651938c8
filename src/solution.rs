//! Solution Collector
//!
//! An [`EnhancedSolutionList`] is an append-only sequence of solutions, each
//! a substitution filtered down to the query's free variables with every
//! term fully resolved (applied to fixpoint, `Clone` unwrapped for
//! display). Deduplication key: the multiset of `(VarId, canonical-term)`
//! pairs after normalization.

use crate::subst::Substitution;
use crate::symbols::VarId;
use crate::term::Term;

/// One fully-resolved binding set, restricted to a query's free variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    bindings: Vec<(VarId, Term)>,
}

impl Solution {
    /// Builds a solution from `subst`, keeping only `query_vars`, resolving
    /// each to a fixpoint, and unwrapping any top-level `Clone` markers so
    /// the displayed value is the plain term a caller expects.
    pub fn project(subst: &Substitution, query_vars: &[VarId]) -> Self {
        let mut bindings: Vec<(VarId, Term)> = query_vars
            .iter()
            .map(|v| (*v, unwrap_clone(subst.apply(&Term::Var(*v)))))
            .collect();
        bindings.sort_by_key(|(v, _)| v.0);
        Solution { bindings }
    }

    pub fn get(&self, var: VarId) -> Option<&Term> {
        self.bindings.iter().find(|(v, _)| *v == var).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Term)> {
        self.bindings.iter().map(|(v, t)| (*v, t))
    }

    /// Deduplication key: the bindings, already sorted by `VarId`, making
    /// two solutions with the same multiset of `(VarId, term)` pairs
    /// compare equal regardless of original substitution order.
    fn dedup_key(&self) -> &[(VarId, Term)] {
        &self.bindings
    }
}

fn unwrap_clone(term: Term) -> Term {
    match term {
        Term::Clone(inner) => unwrap_clone(*inner),
        other => other,
    }
}

/// An append-only, deduplicated sequence of [`Solution`]s.
#[derive(Debug, Clone, Default)]
pub struct EnhancedSolutionList {
    solutions: Vec<Solution>,
}

impl EnhancedSolutionList {
    pub fn new() -> Self {
        EnhancedSolutionList::default()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Appends `solution` unless an equal one (by dedup key) is already
    /// present. Returns whether it was newly added.
    pub fn push(&mut self, solution: Solution) -> bool {
        if self
            .solutions
            .iter()
            .any(|s| s.dedup_key() == solution.dedup_key())
        {
            return false;
        }
        self.solutions.push(solution);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    pub fn as_slice(&self) -> &[Solution] {
        &self.solutions
    }
}
