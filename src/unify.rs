//! Unifier
//!
//! Robinson-style first-order unification with occurs check over
//! [`Term`] and [`Substitution`].
//!
//! Two entry points are exposed, and the distinction between them is
//! load-bearing (see `SPEC_FULL.md` §9, resolved question (a)):
//!
//! - [`unify`] is canonical and occurs-checked; it is the only function
//!   used to bind goal variables against rule heads and productions, where
//!   occurs-check safety actually matters because the bound term can
//!   itself contain fresh rule variables.
//! - [`unify_terms`] is a relaxed variant used exclusively when matching a
//!   goal against a stored resource: it is transparent to `Clone` on
//!   *either* side without recursing through full reapplication, and it
//!   skips the occurs check, since a stored resource was already
//!   well-formed when it was asserted and re-checking it on every match
//!   attempt is wasted work on the hot path of the engine.

use crate::subst::{SubstError, Substitution};
use crate::symbols::VarId;
use crate::term::Term;

/// Why a unification attempt failed. Not an error in the §7 sense — this is
/// an ordinary branch failure the engine is expected to recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifyFailure {
    OccursCheck { var: VarId },
    FunctorMismatch,
    ArityMismatch,
    AtomMismatch,
    IntegerMismatch,
    KindMismatch,
    CapacityExceeded,
}

impl From<SubstError> for UnifyFailure {
    fn from(e: SubstError) -> Self {
        match e {
            SubstError::OccursCheck { var } => UnifyFailure::OccursCheck { var },
            SubstError::CapacityExceeded { .. } => UnifyFailure::CapacityExceeded,
        }
    }
}

pub type UnifyResult<T> = Result<T, UnifyFailure>;

/// Canonical, occurs-checked unification. Leaves `subst` unchanged on
/// failure: the substitution handed in is only mutated once the whole
/// derivation is known to succeed, since the caller threads it by value
/// through this function's `Substitution` return type rather than `&mut`.
pub fn unify(a: &Term, b: &Term, subst: &Substitution) -> UnifyResult<Substitution> {
    let mut next = subst.clone();
    unify_step(a, b, subst, &mut next)?;
    Ok(next)
}

fn unify_step(
    a: &Term,
    b: &Term,
    base: &Substitution,
    acc: &mut Substitution,
) -> UnifyResult<()> {
    let a = acc.apply(a);
    let b = acc.apply(b);

    if let Term::Clone(inner) = &a {
        return unify_step(inner, &b, base, acc);
    }
    if let Term::Clone(inner) = &b {
        return unify_step(&a, inner, base, acc);
    }

    match (&a, &b) {
        (Term::Var(x), Term::Var(y)) if x == y => Ok(()),
        (Term::Var(x), Term::Var(y)) => {
            // Younger (higher-numbered) variable is bound to the older one,
            // giving every pair of variables a canonical orientation.
            if x.0 > y.0 {
                acc.add_binding(*x, Term::Var(*y)).map_err(Into::into)
            } else {
                acc.add_binding(*y, Term::Var(*x)).map_err(Into::into)
            }
        }
        (Term::Var(x), other) | (other, Term::Var(x)) => {
            acc.add_binding(*x, other.clone()).map_err(Into::into)
        }
        (Term::Atom(x), Term::Atom(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(UnifyFailure::AtomMismatch)
            }
        }
        (Term::Integer(x), Term::Integer(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(UnifyFailure::IntegerMismatch)
            }
        }
        (
            Term::Compound {
                functor: f1,
                args: a1,
            },
            Term::Compound {
                functor: f2,
                args: a2,
            },
        ) => {
            if f1 != f2 {
                return Err(UnifyFailure::FunctorMismatch);
            }
            if a1.len() != a2.len() {
                return Err(UnifyFailure::ArityMismatch);
            }
            for (x, y) in a1.iter().zip(a2.iter()) {
                unify_step(x, y, base, acc)?;
            }
            Ok(())
        }
        _ => Err(UnifyFailure::KindMismatch),
    }
}

/// Relaxed, `Clone`-transparent unification with no occurs check, used for
/// matching a goal against a stored resource (see module docs).
pub fn unify_terms(a: &Term, b: &Term, subst: &Substitution) -> UnifyResult<Substitution> {
    let mut next = subst.clone();
    unify_terms_step(a, b, &mut next)?;
    Ok(next)
}

fn unify_terms_step(a: &Term, b: &Term, acc: &mut Substitution) -> UnifyResult<()> {
    let a = acc.apply(a);
    let b = acc.apply(b);
    let a = unwrap_clone(&a);
    let b = unwrap_clone(&b);

    match (a, b) {
        (Term::Var(x), Term::Var(y)) if x == y => Ok(()),
        (Term::Var(x), Term::Var(y)) => {
            if x.0 > y.0 {
                acc.add_binding_raw(x, Term::Var(y)).map_err(Into::into)
            } else {
                acc.add_binding_raw(y, Term::Var(x)).map_err(Into::into)
            }
        }
        (Term::Var(x), other) | (other, Term::Var(x)) => {
            acc.add_binding_raw(x, other).map_err(Into::into)
        }
        (Term::Atom(x), Term::Atom(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(UnifyFailure::AtomMismatch)
            }
        }
        (Term::Integer(x), Term::Integer(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(UnifyFailure::IntegerMismatch)
            }
        }
        (
            Term::Compound {
                functor: f1,
                args: a1,
            },
            Term::Compound {
                functor: f2,
                args: a2,
            },
        ) => {
            if f1 != f2 {
                return Err(UnifyFailure::FunctorMismatch);
            }
            if a1.len() != a2.len() {
                return Err(UnifyFailure::ArityMismatch);
            }
            for (x, y) in a1.iter().zip(a2.iter()) {
                unify_terms_step(x, y, acc)?;
            }
            Ok(())
        }
        _ => Err(UnifyFailure::KindMismatch),
    }
}

fn unwrap_clone(t: &Term) -> Term {
    match t {
        Term::Clone(inner) => unwrap_clone(inner),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Interner;

    #[test]
    fn unify_atoms_equal() {
        let mut i = Interner::new();
        let a = i.intern("coin").unwrap();
        let s = Substitution::new(16);
        assert!(unify(&Term::Atom(a), &Term::Atom(a), &s).is_ok());
    }

    #[test]
    fn unify_atoms_mismatch_fails() {
        let mut i = Interner::new();
        let a = i.intern("coin").unwrap();
        let b = i.intern("candy").unwrap();
        let s = Substitution::new(16);
        assert_eq!(
            unify(&Term::Atom(a), &Term::Atom(b), &s),
            Err(UnifyFailure::AtomMismatch)
        );
    }

    #[test]
    fn unify_var_binds() {
        let mut i = Interner::new();
        let x = i.fresh_var(Some("X"));
        let s = Substitution::new(16);
        let result = unify(&Term::Var(x), &Term::Integer(7), &s).unwrap();
        assert_eq!(result.apply(&Term::Var(x)), Term::Integer(7));
    }

    #[test]
    fn unify_var_var_orients_to_older() {
        let mut i = Interner::new();
        let x = i.fresh_var(None); // VarId(0)
        let y = i.fresh_var(None); // VarId(1), younger
        let s = Substitution::new(16);
        let result = unify(&Term::Var(y), &Term::Var(x), &s).unwrap();
        // younger (y) bound to older (x)
        assert_eq!(result.get(y), Some(&Term::Var(x)));
        assert_eq!(result.get(x), None);
    }

    #[test]
    fn unify_occurs_check_fails() {
        let mut i = Interner::new();
        let x = i.fresh_var(Some("X"));
        let f = i.intern("f").unwrap();
        let t = Term::compound(f, vec![Term::Var(x)]);
        let s = Substitution::new(16);
        let before = s.clone();
        let result = unify(&Term::Var(x), &t, &s);
        assert_eq!(result, Err(UnifyFailure::OccursCheck { var: x }));
        assert_eq!(s, before);
    }

    #[test]
    fn unify_compound_functor_mismatch() {
        let mut i = Interner::new();
        let f = i.intern("f").unwrap();
        let g = i.intern("g").unwrap();
        let s = Substitution::new(16);
        let a = Term::compound(f, vec![Term::Integer(1)]);
        let b = Term::compound(g, vec![Term::Integer(1)]);
        assert_eq!(unify(&a, &b, &s), Err(UnifyFailure::FunctorMismatch));
    }

    #[test]
    fn unify_compound_arity_mismatch() {
        let mut i = Interner::new();
        let f = i.intern("f").unwrap();
        let s = Substitution::new(16);
        let a = Term::compound(f, vec![Term::Integer(1)]);
        let b = Term::compound(f, vec![Term::Integer(1), Term::Integer(2)]);
        assert_eq!(unify(&a, &b, &s), Err(UnifyFailure::ArityMismatch));
    }

    #[test]
    fn unify_compound_arity_zero_vs_atom_fails() {
        let mut i = Interner::new();
        let coin = i.intern("coin").unwrap();
        let s = Substitution::new(16);
        let atom = Term::Atom(coin);
        let compound = Term::compound(coin, vec![]);
        assert_eq!(unify(&atom, &compound, &s), Err(UnifyFailure::KindMismatch));
    }

    #[test]
    fn unify_leaves_substitution_unchanged_on_partial_failure() {
        let mut i = Interner::new();
        let x = i.fresh_var(Some("X"));
        let f = i.intern("f").unwrap();
        let a_sym = i.intern("a").unwrap();
        let b_sym = i.intern("b").unwrap();
        let left = Term::compound(f, vec![Term::Var(x), Term::Atom(a_sym)]);
        let right = Term::compound(f, vec![Term::Integer(1), Term::Atom(b_sym)]);
        let s = Substitution::new(16);
        let before = s.clone();
        assert!(unify(&left, &right, &s).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn unify_is_opaque_to_clone_by_recursing() {
        let mut i = Interner::new();
        let x = i.fresh_var(Some("X"));
        let s = Substitution::new(16);
        let wrapped = Term::clone_of(Term::Var(x));
        let result = unify(&wrapped, &Term::Integer(9), &s).unwrap();
        assert_eq!(result.apply(&Term::Var(x)), Term::Integer(9));
    }

    #[test]
    fn unify_terms_skips_occurs_check() {
        let mut i = Interner::new();
        let x = i.fresh_var(Some("X"));
        let f = i.intern("f").unwrap();
        // unify rejects X = f(X); unify_terms accepts the same pair because
        // it is documented to skip the occurs check on this fast path.
        let t = Term::compound(f, vec![Term::Var(x)]);
        let s = Substitution::new(16);
        assert!(unify(&Term::Var(x), &t, &s).is_err());
        assert!(unify_terms(&Term::Var(x), &t, &s).is_ok());
    }

    #[test]
    fn unify_terms_is_transparent_to_clone_on_either_side() {
        let mut i = Interner::new();
        let coin = i.intern("coin").unwrap();
        let s = Substitution::new(16);
        let goal = Term::Atom(coin);
        let stored = Term::clone_of(Term::Atom(coin));
        assert!(unify_terms(&goal, &stored, &s).is_ok());
    }

    #[test]
    fn soundness_property_holds_for_compound_unification() {
        let mut i = Interner::new();
        let x = i.fresh_var(Some("X"));
        let y = i.fresh_var(Some("Y"));
        let f = i.intern("f").unwrap();
        let t1 = Term::compound(f, vec![Term::Var(x), Term::Integer(2)]);
        let t2 = Term::compound(f, vec![Term::Integer(1), Term::Var(y)]);
        let s = Substitution::new(16);
        let result = unify(&t1, &t2, &s).unwrap();
        assert_eq!(result.apply(&t1), result.apply(&t2));
    }
}
