//! Substitution
//!
//! An ordered sequence of `VarId -> Term` bindings, bounded by
//! [`Limits::max_vars`](crate::config::Limits::max_vars). A variable appears
//! at most once; no binding's right-hand side contains its own left-hand
//! variable (occurs check at insertion).

use thiserror::Error;

use crate::symbols::VarId;
use crate::term::Term;

/// Errors raised while building or applying a substitution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubstError {
    /// Binding `var` to `term` would create `var := ..var..`.
    #[error("occurs check failed: {var} occurs in its own binding")]
    OccursCheck { var: VarId },

    /// The substitution already holds `max_vars` bindings.
    #[error("substitution exhausted: cannot bind {var}, limit is {max_vars} variables")]
    CapacityExceeded { var: VarId, max_vars: usize },
}

pub type SubstResult<T> = Result<T, SubstError>;

/// A finite, ordered mapping from variable ids to terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: Vec<(VarId, Term)>,
    max_vars: usize,
}

impl Substitution {
    /// An empty substitution bounded by `max_vars` bindings.
    pub fn new(max_vars: usize) -> Self {
        Substitution {
            bindings: Vec::new(),
            max_vars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// The term currently bound to `var`, if any (one hop, not chased).
    pub fn get(&self, var: VarId) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, t)| t)
    }

    fn contains(&self, var: VarId) -> bool {
        self.bindings.iter().any(|(v, _)| *v == var)
    }

    /// Appends a new binding `var -> term`. No-op-safe: if `var` is already
    /// bound this fails rather than silently overwriting, since a
    /// substitution is meant to grow monotonically within one derivation.
    pub fn add_binding(&mut self, var: VarId, term: Term) -> SubstResult<()> {
        if term.occurs(var) && term != Term::Var(var) {
            return Err(SubstError::OccursCheck { var });
        }
        self.add_binding_raw(var, term)
    }

    /// Appends a binding without the occurs check. Crate-private: the only
    /// caller is [`crate::unify::unify_terms`], which is documented to skip
    /// the occurs check when matching a goal against an already-asserted
    /// resource. Every other path must go through [`Substitution::add_binding`].
    pub(crate) fn add_binding_raw(&mut self, var: VarId, term: Term) -> SubstResult<()> {
        if self.contains(var) {
            // Re-binding an already-bound variable is a caller bug, not a
            // branch failure; replace in place rather than duplicate.
            if let Some(slot) = self.bindings.iter_mut().find(|(v, _)| *v == var) {
                slot.1 = term;
            }
            return Ok(());
        }
        if self.bindings.len() >= self.max_vars {
            return Err(SubstError::CapacityExceeded {
                var,
                max_vars: self.max_vars,
            });
        }
        self.bindings.push((var, term));
        Ok(())
    }

    /// Recursively rewrites `term` under this substitution, chasing
    /// variable chains to a fixpoint. This is the only operation authorized
    /// to look through [`Term::Clone`] — callers that need the persistent
    /// marker preserved should match on `Term::Clone` before calling
    /// `apply` on the inner term themselves.
    pub fn apply(&self, term: &Term) -> Term {
        self.apply_bounded(term, self.bindings.len() + 1)
    }

    fn apply_bounded(&self, term: &Term, fuel: usize) -> Term {
        match term {
            Term::Var(v) => match self.get(*v) {
                Some(bound) if fuel > 0 => self.apply_bounded(bound, fuel - 1),
                // fuel exhausted means a cycle slipped past add_binding's
                // occurs check (e.g. a chain X->Y, Y->X); stop rather than
                // recurse forever.
                Some(bound) => bound.clone(),
                None => Term::Var(*v),
            },
            Term::Atom(s) => Term::Atom(*s),
            Term::Integer(i) => Term::Integer(*i),
            Term::Compound { functor, args } => Term::Compound {
                functor: *functor,
                args: args.iter().map(|a| self.apply_bounded(a, fuel)).collect(),
            },
            Term::Clone(inner) => Term::Clone(Box::new(self.apply_bounded(inner, fuel))),
        }
    }

    /// Composes `self` with `other`: rewrite every RHS of `self` under
    /// `other`, then append each binding of `other` whose LHS is absent
    /// from `self`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result = Substitution::new(self.max_vars.max(other.max_vars));
        for (v, t) in &self.bindings {
            let rewritten = other.apply(t);
            result.bindings.push((*v, rewritten));
        }
        for (v, t) in &other.bindings {
            if !result.contains(*v) {
                result.bindings.push((*v, t.clone()));
            }
        }
        result
    }

    /// Projects this substitution onto `vars`, producing a new substitution
    /// containing only those bindings (terms left unresolved — callers
    /// typically `apply` first if they want fully-resolved values).
    pub fn filter(&self, vars: &[VarId]) -> Substitution {
        let mut result = Substitution::new(self.max_vars);
        for (v, t) in &self.bindings {
            if vars.contains(v) {
                result.bindings.push((*v, t.clone()));
            }
        }
        result
    }

    /// Order-insensitive structural equality after applying each
    /// substitution to every bound term's fixpoint.
    pub fn equal(&self, other: &Substitution) -> bool {
        if self.bindings.len() != other.bindings.len() {
            return false;
        }
        for (v, t) in &self.bindings {
            let lhs = self.apply(t);
            match other.get(*v) {
                Some(rhs_term) => {
                    if lhs != other.apply(rhs_term) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Term)> {
        self.bindings.iter().map(|(v, t)| (*v, t))
    }
}
