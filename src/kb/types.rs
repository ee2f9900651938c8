//! Type and Variant Mapping
//!
//! `type_map` assigns a type name to a term's name; `variant_map` forms a
//! DAG of `variant -> parent` edges over which [`TypeRegistry::is_variant_of`]
//! is the reflexive-transitive closure.

use std::collections::HashMap;

use crate::symbols::SymbolId;
use crate::term::Term;
use crate::unify::{unify_terms, UnifyFailure};
use crate::subst::Substitution;

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    type_map: HashMap<SymbolId, SymbolId>,
    variant_map: HashMap<SymbolId, SymbolId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    pub fn add_type_mapping(&mut self, term_name: SymbolId, type_name: SymbolId) {
        self.type_map.insert(term_name, type_name);
    }

    pub fn add_union_mapping(&mut self, variant: SymbolId, parent: SymbolId) {
        self.variant_map.insert(variant, parent);
    }

    /// Looks up the type mapped to `name`, if any.
    pub fn get_term_type(&self, name: SymbolId) -> Option<SymbolId> {
        self.type_map.get(&name).copied()
    }

    /// Reflexive-transitive closure over `variant_map`: `child` is a
    /// variant of `parent` if they are equal, or `child` has a direct
    /// parent edge that is itself a variant of `parent`.
    ///
    /// Walks at most `variant_map.len() + 1` hops, which bounds the walk
    /// even if a malformed mapping introduced a cycle.
    pub fn is_variant_of(&self, child: SymbolId, parent: SymbolId) -> bool {
        if child == parent {
            return true;
        }
        let mut current = child;
        let max_hops = self.variant_map.len() + 1;
        for _ in 0..max_hops {
            match self.variant_map.get(&current) {
                Some(next) if *next == parent => return true,
                Some(next) => current = *next,
                None => return false,
            }
        }
        false
    }

    /// Attempts to unify `goal` against `fact` using [`unify_terms`]; if
    /// that fails and `goal` is an atom naming a registered type, accepts
    /// `fact` anyway when its own name's type is that type or a descendant
    /// of it in the variant DAG.
    pub fn can_unify_with_type(
        &self,
        goal: &Term,
        fact: &Term,
        subst: &Substitution,
    ) -> Result<Substitution, UnifyFailure> {
        if let Ok(result) = unify_terms(goal, fact, subst) {
            return Ok(result);
        }
        if let (Term::Atom(goal_name), Some(fact_name)) = (goal, fact_head_symbol(fact)) {
            if let Some(goal_type) = self.get_term_type(*goal_name).or(Some(*goal_name)) {
                if let Some(fact_type) = self.get_term_type(fact_name) {
                    if self.is_variant_of(fact_type, goal_type) {
                        return Ok(subst.clone());
                    }
                }
            }
        }
        Err(UnifyFailure::KindMismatch)
    }
}

fn fact_head_symbol(term: &Term) -> Option<SymbolId> {
    match term {
        Term::Atom(s) => Some(*s),
        Term::Compound { functor, .. } => Some(*functor),
        Term::Clone(inner) => fact_head_symbol(inner),
        _ => None,
    }
}
