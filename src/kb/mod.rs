//! Knowledge Base
//!
//! The mutable container of linear resources, rules, and type metadata a
//! query is resolved against: `(symbols, resources, rules, type_map,
//! variant_map, checkpoints, auto_deallocate)`.
//!
//! Resources are kept in a linked-list-like ordering (most recent first);
//! this crate uses a `Vec` with reverse-order insertion to the same
//! observable effect, since nothing outside this module depends on the
//! backing storage being a literal linked list, only on "most recent first"
//! scan order.

pub mod checkpoint;
pub mod error;
pub mod resource;
pub mod rules;
pub mod types;

use tracing::{debug, trace};

use crate::config::Limits;
use crate::symbols::{Interner, SymbolId, VarId};
use crate::term::Term;

pub use checkpoint::{Checkpoint, CheckpointStack, ConsumedEntry};
pub use error::{KbError, KbResult};
pub use resource::{LinearResource, Persistence, ResourceId};
pub use rules::{Rule, RuleId, RuleTable};
pub use types::TypeRegistry;

/// The mutable store a [`crate::engine::ResolutionEngine`] resolves queries
/// against.
#[derive(Debug)]
pub struct KnowledgeBase {
    pub(crate) symbols: Interner,
    /// Most-recent-first; index 0 is the newest resource.
    resources: Vec<LinearResource>,
    rules: RuleTable,
    types: TypeRegistry,
    checkpoints: CheckpointStack,
    pub auto_deallocate: bool,
    limits: Limits,
    next_resource_id: u64,
    /// Bumped on every assert or consume/restore. The engine's goal cache
    /// keys entries by this counter so a cached failure can never outlive
    /// the KB state it was recorded against.
    resource_generation: u64,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base with the given symbol interner and
    /// limits.
    pub fn new(symbols: Interner, limits: Limits) -> Self {
        KnowledgeBase {
            symbols,
            resources: Vec::new(),
            rules: RuleTable::new(),
            types: TypeRegistry::new(),
            checkpoints: CheckpointStack::new(),
            auto_deallocate: limits.auto_deallocate,
            limits,
            next_resource_id: 1,
            resource_generation: 0,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Monotonic counter bumped on every assertion, consumption, or
    /// restoration. Used by the engine's goal cache to invalidate memoized
    /// failures the instant the KB state they depended on changes.
    pub fn resource_generation(&self) -> u64 {
        self.resource_generation
    }

    pub fn set_auto_deallocation(&mut self, on: bool) {
        self.auto_deallocate = on;
    }

    pub fn symbols(&self) -> &Interner {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut Interner {
        &mut self.symbols
    }

    pub fn fresh_var(&mut self, name: Option<&str>) -> VarId {
        self.symbols.fresh_var(name)
    }

    // ---- Assertion -----------------------------------------------------

    fn insert_resource(
        &mut self,
        fact: Term,
        persistence: Persistence,
        allocation_site: SymbolId,
    ) -> ResourceId {
        let id = ResourceId(self.next_resource_id);
        self.next_resource_id += 1;
        let resource = LinearResource::new(id, fact, persistence, allocation_site);
        trace!(resource = id.0, ?persistence, "assert_resource");
        self.resources.insert(0, resource);
        self.resource_generation += 1;
        id
    }

    pub fn add_linear_fact(&mut self, fact: Term, allocation_site: SymbolId) -> ResourceId {
        self.insert_resource(fact, Persistence::Linear, allocation_site)
    }

    pub fn add_optional_linear_fact(
        &mut self,
        fact: Term,
        allocation_site: SymbolId,
    ) -> ResourceId {
        self.insert_resource(fact, Persistence::LinearOptional, allocation_site)
    }

    pub fn add_exponential_fact(&mut self, fact: Term, allocation_site: SymbolId) -> ResourceId {
        self.insert_resource(fact, Persistence::Exponential, allocation_site)
    }

    pub fn add_persistent_fact(&mut self, fact: Term, allocation_site: SymbolId) -> ResourceId {
        self.insert_resource(fact, Persistence::Persistent, allocation_site)
    }

    /// Inserts `rule`, failing with [`KbError::RuleTableFull`] once the
    /// table holds `limits.max_rules` rules (`SPEC_FULL.md` §7,
    /// `CapacityExceeded`: "rule table full").
    pub fn add_rule(&mut self, rule: Rule) -> KbResult<RuleId> {
        if self.rules.len() >= self.limits.max_rules {
            return Err(KbError::RuleTableFull(self.limits.max_rules));
        }
        Ok(self.rules.insert(rule))
    }

    // ---- Typing ----------------------------------------------------------

    pub fn add_type_mapping(&mut self, term: SymbolId, ty: SymbolId) {
        self.types.add_type_mapping(term, ty);
    }

    pub fn add_union_mapping(&mut self, variant: SymbolId, parent: SymbolId) {
        self.types.add_union_mapping(variant, parent);
    }

    pub fn is_variant_of(&self, child: SymbolId, parent: SymbolId) -> bool {
        self.types.is_variant_of(child, parent)
    }

    pub fn get_term_type(&self, name: SymbolId) -> Option<SymbolId> {
        self.types.get_term_type(name)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    // ---- Resource access -------------------------------------------------

    /// Resources in most-recent-first order, as the engine's scan requires.
    pub fn resources(&self) -> &[LinearResource] {
        &self.resources
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> Option<&mut LinearResource> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    /// Marks `id` consumed, deallocating it immediately if `auto_deallocate`
    /// is set and its persistence level is non-reusable.
    pub fn mark_consumed(&mut self, id: ResourceId) -> KbResult<()> {
        let auto_deallocate = self.auto_deallocate;
        let resource = self
            .resource_mut(id)
            .ok_or(KbError::UnknownResource(id.0))?;
        resource.consumed = true;
        if auto_deallocate && !resource.persistence.is_reusable() {
            resource.deallocated = true;
        }
        self.resource_generation += 1;
        debug!(resource = id.0, "resource_consumed");
        Ok(())
    }

    /// Reverses [`KnowledgeBase::mark_consumed`] on backtracking. Never
    /// un-deallocates: deallocation is terminal for a resource's visibility
    /// (`SPEC_FULL.md` §3).
    fn unmark_consumed(&mut self, id: ResourceId) {
        if let Some(r) = self.resource_mut(id) {
            r.consumed = false;
        }
        self.resource_generation += 1;
    }

    // ---- Checkpoint / restore --------------------------------------------

    /// Captures `(resource, consumed)` for every live, non-persistent
    /// resource and opens a new checkpoint.
    pub fn save_consumed_state(&mut self) {
        let entries = self
            .resources
            .iter()
            .filter(|r| !r.persistence.is_reusable())
            .map(|r| ConsumedEntry {
                id: r.id,
                was_consumed: r.consumed,
            })
            .collect();
        self.checkpoints.push(Checkpoint {
            entries,
            generation: self.resources.len(),
        });
        trace!(depth = self.checkpoints.depth(), "checkpoint_saved");
    }

    /// Restores the most recently opened checkpoint: resets every captured
    /// resource's `consumed` flag and drops resources appended since.
    pub fn restore_consumed_state(&mut self) -> KbResult<()> {
        let checkpoint = self.checkpoints.pop().ok_or(KbError::CheckpointUnderflow)?;
        // Newly appended resources live at index 0..(len - generation)
        // because insertion is most-recent-first; drop exactly those.
        let to_drop = self.resources.len().saturating_sub(checkpoint.generation);
        self.resources.drain(0..to_drop);
        self.resource_generation += 1;
        for entry in &checkpoint.entries {
            self.unmark_consumed(entry.id);
        }
        trace!(depth = self.checkpoints.depth(), "checkpoint_restored");
        Ok(())
    }

    /// Discards the most recently opened checkpoint, keeping whatever
    /// consumption and new resources happened since it was taken.
    pub fn commit_consumed_state(&mut self) -> KbResult<()> {
        if self.checkpoints.commit() {
            Ok(())
        } else {
            Err(KbError::CheckpointUnderflow)
        }
    }

    pub fn checkpoint_depth(&self) -> usize {
        self.checkpoints.depth()
    }

    /// Debug-only human-readable dump; not part of the stable contract.
    pub fn print_memory_state(&self, label: &str) -> String {
        let mut out = format!("-- {label} --\n");
        for r in &self.resources {
            out.push_str(&format!(
                "  [{}] {} consumed={} deallocated={} level={:?}\n",
                r.id.0,
                r.fact.render(&self.symbols),
                r.consumed,
                r.deallocated,
                r.persistence
            ));
        }
        out.push_str(&format!("  rules: {}\n", self.rules.len()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(Interner::new(), Limits::default())
    }

    #[test]
    fn insertion_prepends_most_recent_first() {
        let mut kb = kb();
        let coin = kb.symbols_mut().intern("coin").unwrap();
        let candy = kb.symbols_mut().intern("candy").unwrap();
        kb.add_linear_fact(Term::Atom(coin), coin);
        kb.add_linear_fact(Term::Atom(candy), candy);
        assert_eq!(kb.resources()[0].fact, Term::Atom(candy));
        assert_eq!(kb.resources()[1].fact, Term::Atom(coin));
    }

    #[test]
    fn checkpoint_restore_is_symmetric() {
        let mut kb = kb();
        let coin = kb.symbols_mut().intern("coin").unwrap();
        let id = kb.add_linear_fact(Term::Atom(coin), coin);
        kb.save_consumed_state();
        kb.mark_consumed(id).unwrap();
        assert!(kb.resource_mut(id).unwrap().consumed);
        kb.restore_consumed_state().unwrap();
        assert!(!kb.resource_mut(id).unwrap().consumed);
    }

    #[test]
    fn checkpoint_restore_drops_resources_appended_after() {
        let mut kb = kb();
        let coin = kb.symbols_mut().intern("coin").unwrap();
        let candy = kb.symbols_mut().intern("candy").unwrap();
        kb.add_linear_fact(Term::Atom(coin), coin);
        kb.save_consumed_state();
        kb.add_linear_fact(Term::Atom(candy), candy);
        assert_eq!(kb.resources().len(), 2);
        kb.restore_consumed_state().unwrap();
        assert_eq!(kb.resources().len(), 1);
    }

    #[test]
    fn commit_keeps_consumption_across_checkpoints() {
        let mut kb = kb();
        let coin = kb.symbols_mut().intern("coin").unwrap();
        let id = kb.add_linear_fact(Term::Atom(coin), coin);
        kb.save_consumed_state();
        kb.mark_consumed(id).unwrap();
        kb.commit_consumed_state().unwrap();
        assert!(kb.resource_mut(id).unwrap().consumed);
        assert_eq!(kb.checkpoint_depth(), 0);
    }

    #[test]
    fn auto_deallocate_flips_deallocated_on_consume() {
        let mut i = Interner::new();
        let coin = i.intern("coin").unwrap();
        let mut limits = Limits::default();
        limits.auto_deallocate = true;
        let mut kb = KnowledgeBase::new(i, limits);
        let id = kb.add_linear_fact(Term::Atom(coin), coin);
        kb.mark_consumed(id).unwrap();
        assert!(kb.resource_mut(id).unwrap().deallocated);
    }

    #[test]
    fn restore_without_checkpoint_errors() {
        let mut kb = kb();
        assert_eq!(
            kb.restore_consumed_state(),
            Err(KbError::CheckpointUnderflow)
        );
    }
}
