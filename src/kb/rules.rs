//! Rule (Clause) Table
//!
//! A rule is `(head?, body[], production?)`. With a `production`, firing the
//! rule consumes each body literal's matching resource and asserts the
//! substituted production as a new linear resource (linear-logic
//! implication). Without one, the rule is a conventional Horn clause.
//!
//! Rules are indexed by the functor/arity of their `production` and,
//! separately, their `head`, so the engine does not linearly scan the whole
//! table on every goal (`SPEC_FULL.md` §9: "a performance refinement, not a
//! semantic change").

use std::collections::HashMap;

use crate::symbols::SymbolId;
use crate::term::Term;

/// A stored clause. `rename` renames every bound variable to a fresh
/// instance on firing, so one clause can be fired many times in the same
/// query without its variables colliding across instances.
#[derive(Debug, Clone)]
pub struct Rule {
    pub head: Option<Term>,
    pub body: Vec<Term>,
    pub production: Option<Term>,
    pub is_recursive: bool,
}

impl Rule {
    pub fn new(head: Option<Term>, body: Vec<Term>, production: Option<Term>) -> Self {
        let is_recursive = match (&head, &production) {
            (Some(h), _) => body.iter().any(|b| same_functor(h, b)),
            (None, Some(p)) => body.iter().any(|b| same_functor(p, b)),
            (None, None) => false,
        };
        Rule {
            head,
            body,
            production,
            is_recursive,
        }
    }
}

fn functor_of(t: &Term) -> Option<(SymbolId, usize)> {
    match t {
        Term::Atom(s) => Some((*s, 0)),
        Term::Compound { functor, args } => Some((*functor, args.len())),
        Term::Clone(inner) => functor_of(inner),
        _ => None,
    }
}

fn same_functor(a: &Term, b: &Term) -> bool {
    matches!((functor_of(a), functor_of(b)), (Some(x), Some(y)) if x == y)
}

/// A single rule slot, tagged with its insertion order for the stable,
/// reproducible enumeration `SPEC_FULL.md` §4.F requires ("rules are tried
/// in insertion order").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub usize);

/// Rule storage, indexed by the functor/arity of `production` and `head`
/// for fast dispatch, but iterated in insertion order within each index
/// bucket.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    by_production: HashMap<(SymbolId, usize), Vec<RuleId>>,
    by_head: HashMap<(SymbolId, usize), Vec<RuleId>>,
}

impl RuleTable {
    pub fn new() -> Self {
        RuleTable::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// Inserts `rule`, returning its stable [`RuleId`]. Indexed by the
    /// functor/arity of `production` (if present) and `head` (if present).
    pub fn insert(&mut self, rule: Rule) -> RuleId {
        let id = RuleId(self.rules.len());
        if let Some(p) = &rule.production {
            if let Some(key) = functor_of(p) {
                self.by_production.entry(key).or_default().push(id);
            }
        }
        if let Some(h) = &rule.head {
            if let Some(key) = functor_of(h) {
                self.by_head.entry(key).or_default().push(id);
            }
        }
        self.rules.push(rule);
        id
    }

    /// Rules whose `production` could plausibly unify with `goal`, in
    /// insertion order. The functor/arity index is a performance refinement
    /// over a full scan, not a semantic change (`SPEC_FULL.md` §9): a
    /// variable-headed `goal` has no functor to index on, so this falls
    /// back to every rule carrying a production, in insertion order.
    pub fn matching_production(&self, goal: &Term) -> Vec<RuleId> {
        match functor_of(goal) {
            Some(key) => self
                .by_production
                .get(&key)
                .cloned()
                .unwrap_or_default(),
            None => self
                .rules
                .iter()
                .enumerate()
                .filter(|(_, r)| r.production.is_some())
                .map(|(i, _)| RuleId(i))
                .collect(),
        }
    }

    /// Rules whose `head` could plausibly match `goal`, in insertion order.
    /// Falls back to a full scan over every rule carrying a head when
    /// `goal` has no functor, for the same reason as
    /// [`RuleTable::matching_production`].
    pub fn matching_head(&self, goal: &Term) -> Vec<RuleId> {
        match functor_of(goal) {
            Some(key) => self.by_head.get(&key).cloned().unwrap_or_default(),
            None => self
                .rules
                .iter()
                .enumerate()
                .filter(|(_, r)| r.head.is_some())
                .map(|(i, _)| RuleId(i))
                .collect(),
        }
    }
}
