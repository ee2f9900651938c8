//! Term Model
//!
//! Immutable, tagged terms: atoms, variables, integers, compounds, and
//! `Clone` wrappers marking persistent-use. Terms are value types — every
//! term-returning operation here produces an independent tree; nothing is
//! shared behind the scenes.

use std::fmt;

use crate::symbols::{Interner, SymbolId, VarId};

/// A term in the logic. See module docs for the five shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Atom(SymbolId),
    Var(VarId),
    Integer(i64),
    Compound {
        functor: SymbolId,
        args: Vec<Term>,
    },
    /// Marks its inner term as persistent-use ("banged"): never itself
    /// consumed, and transparent to its inner term during unification.
    /// `Clone(Clone(t))` is never constructed — [`Term::clone_of`] collapses
    /// nested wrappers to a single layer.
    Clone(Box<Term>),
}

impl Term {
    /// Builds a `Compound`, recording `args.len()` as the arity implicitly
    /// (arity is never stored separately from `args.len()`).
    pub fn compound(functor: SymbolId, args: Vec<Term>) -> Term {
        Term::Compound { functor, args }
    }

    /// Wraps `inner` in a persistent-use marker, collapsing `Clone(Clone(t))`
    /// to `Clone(t)`.
    pub fn clone_of(inner: Term) -> Term {
        match inner {
            Term::Clone(t) => Term::Clone(t),
            t => Term::Clone(Box::new(t)),
        }
    }

    /// Arity of a compound term; 0 for everything else (an arity-0 compound
    /// is a distinct concept from an atom, so this is not used to decide
    /// equality — see [`Term::eq`]).
    pub fn arity(&self) -> usize {
        match self {
            Term::Compound { args, .. } => args.len(),
            _ => 0,
        }
    }

    /// True if `var` occurs free anywhere within this term, looking through
    /// `Clone` wrappers. Used by the unifier's occurs check.
    pub fn occurs(&self, var: VarId) -> bool {
        match self {
            Term::Var(v) => *v == var,
            Term::Compound { args, .. } => args.iter().any(|a| a.occurs(var)),
            Term::Clone(inner) => inner.occurs(var),
            Term::Atom(_) | Term::Integer(_) => false,
        }
    }

    /// Collects the free variables of this term in first-occurrence order,
    /// with duplicates removed.
    pub fn free_vars(&self) -> Vec<VarId> {
        let mut out = Vec::new();
        self.collect_free_vars(&mut out);
        out
    }

    fn collect_free_vars(&self, out: &mut Vec<VarId>) {
        match self {
            Term::Var(v) => {
                if !out.contains(v) {
                    out.push(*v);
                }
            }
            Term::Compound { args, .. } => {
                for a in args {
                    a.collect_free_vars(out);
                }
            }
            Term::Clone(inner) => inner.collect_free_vars(out),
            Term::Atom(_) | Term::Integer(_) => {}
        }
    }

    /// Renames every variable under this term to a fresh id derived from
    /// `(original, instance)`, via `alloc`. Renaming is injective within one
    /// call as long as `alloc` is: the same `(VarId, instance)` pair must
    /// always yield the same fresh id so that repeated variable mentions in
    /// a rule body stay identified with each other after renaming.
    pub fn rename(&self, instance: u32, alloc: &mut impl FnMut(VarId, u32) -> VarId) -> Term {
        match self {
            Term::Var(v) => Term::Var(alloc(*v, instance)),
            Term::Atom(s) => Term::Atom(*s),
            Term::Integer(i) => Term::Integer(*i),
            Term::Compound { functor, args } => Term::Compound {
                functor: *functor,
                args: args.iter().map(|a| a.rename(instance, alloc)).collect(),
            },
            Term::Clone(inner) => Term::Clone(Box::new(inner.rename(instance, alloc))),
        }
    }

    /// Renders this term using `interner` to resolve symbol names, with no
    /// byte-size limit. See [`Term::render_bounded`] for a truncated form.
    pub fn render(&self, interner: &Interner) -> String {
        let mut out = String::new();
        self.write(interner, &mut out);
        out
    }

    /// Renders this term, truncating the output at `max_bytes` (on a char
    /// boundary) and appending `...` if truncation occurred. Intended for
    /// debug/introspection output where an unbounded compound could dwarf
    /// the rest of a log line.
    pub fn render_bounded(&self, interner: &Interner, max_bytes: usize) -> String {
        let full = self.render(interner);
        if full.len() <= max_bytes {
            return full;
        }
        let mut cut = max_bytes;
        while cut > 0 && !full.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &full[..cut])
    }

    fn write(&self, interner: &Interner, out: &mut String) {
        match self {
            Term::Atom(s) => out.push_str(interner.resolve(*s).unwrap_or("?")),
            Term::Var(v) => match interner.var_name(*v) {
                Some(name) => out.push_str(name),
                None => out.push_str(&v.to_string()),
            },
            Term::Integer(i) => out.push_str(&i.to_string()),
            Term::Compound { functor, args } => {
                out.push_str(interner.resolve(*functor).unwrap_or("?"));
                out.push('(');
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    a.write(interner, out);
                }
                out.push(')');
            }
            Term::Clone(inner) => {
                out.push('!');
                inner.write(interner, out);
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(s) => write!(f, "Atom({s})"),
            Term::Var(v) => write!(f, "Var({v})"),
            Term::Integer(i) => write!(f, "Integer({i})"),
            Term::Compound { functor, args } => write!(f, "Compound({functor}/{})", args.len()),
            Term::Clone(inner) => write!(f, "Clone({inner})"),
        }
    }
}
