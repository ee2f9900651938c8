//! Resolution Engine
//!
//! The heart of the system: goal-directed search over the knowledge base's
//! rules and resources. A query is an ordered list of goal terms; the
//! engine proves them left to right, consuming linear resources, firing
//! rules (forward-chaining their productions), and backtracking through a
//! checkpoint at every alternative it tries.
//!
//! Two entry-point families exist, matching `SPEC_FULL.md` §4.F:
//! - Single-solution, progressive mode: [`ResolutionEngine::linear_resolve_query`]
//!   and [`ResolutionEngine::linear_resolve_query_with_substitution`]. Once
//!   the whole goal list succeeds, consumption and newly-asserted resources
//!   are committed to the knowledge base permanently.
//! - All-solutions mode: [`ResolutionEngine::linear_resolve_query_all_solutions`].
//!   Every alternative is explored from a saved checkpoint and the whole
//!   call restores the knowledge base to its pre-call state when it
//!   finishes, regardless of how many solutions were found.

pub mod error;
pub mod goal;

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::constraint::ConstraintHook;
use crate::kb::{KnowledgeBase, ResourceId, Rule};
use crate::solution::{EnhancedSolutionList, Solution};
use crate::subst::Substitution;
use crate::symbols::{SymbolId, VarId};
use crate::term::Term;
use crate::unify::{unify, UnifyFailure};

pub use error::{EngineError, EngineResult};
use goal::{GoalCache, GoalStack};

/// Internal branch-failure taxonomy (`SPEC_FULL.md` §7). Never surfaced to
/// callers: every outward-facing entry point collapses these to `false` or
/// "no more solutions".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofFailure {
    OccursCheck,
    /// A unification attempt failed for a reason other than the occurs
    /// check (functor, arity, atom, or integer mismatch).
    NoMatch,
    ResourceUnavailable,
    TypeMismatch,
    RecursionBound,
}

/// Whether the search should stop at the solution just found, or restore
/// its checkpoint and keep looking for more (all-solutions mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Stop,
    Continue,
}

type Resolved = Result<Substitution, ProofFailure>;
type BodyResolved = Result<(Substitution, Vec<ResourceId>), ProofFailure>;

fn functor_symbol(term: &Term) -> Option<SymbolId> {
    match term {
        Term::Atom(s) => Some(*s),
        Term::Compound { functor, .. } => Some(*functor),
        Term::Clone(inner) => functor_symbol(inner),
        _ => None,
    }
}

/// Renames every variable in `rule` to a fresh instance, consistently
/// within this one firing (`SPEC_FULL.md` §4.B rename semantics).
fn instantiate_rule(
    kb: &mut KnowledgeBase,
    rule: &Rule,
    instance: u32,
) -> (Option<Term>, Vec<Term>, Option<Term>) {
    let mut map: HashMap<VarId, VarId> = HashMap::new();
    let mut alloc = |orig: VarId, _inst: u32| *map.entry(orig).or_insert_with(|| kb.fresh_var(None));
    let head = rule.head.as_ref().map(|h| h.rename(instance, &mut alloc));
    let body = rule
        .body
        .iter()
        .map(|b| b.rename(instance, &mut alloc))
        .collect();
    let production = rule
        .production
        .as_ref()
        .map(|p| p.rename(instance, &mut alloc));
    (head, body, production)
}

/// Goal-directed search over one [`KnowledgeBase`], with an external
/// [`ConstraintHook`] wired in at every binding event.
pub struct ResolutionEngine<'a, H: ConstraintHook> {
    kb: &'a mut KnowledgeBase,
    hook: &'a mut H,
    goal_stack: GoalStack,
    goal_cache: GoalCache,
    next_instance: u32,
}

impl<'a, H: ConstraintHook> ResolutionEngine<'a, H> {
    pub fn new(kb: &'a mut KnowledgeBase, hook: &'a mut H) -> Self {
        let limits = kb.limits().clone();
        ResolutionEngine {
            goal_stack: GoalStack::new(limits.max_goal_stack_depth),
            goal_cache: GoalCache::new(limits.max_goal_cache_entries),
            kb,
            hook,
            next_instance: 0,
        }
    }

    pub fn kb(&self) -> &KnowledgeBase {
        self.kb
    }

    // ---- Public entry points --------------------------------------------

    /// Single-solution query; `true` iff `goals` was proved. On success,
    /// resource consumption and new productions are committed permanently.
    pub fn linear_resolve_query(&mut self, goals: &[Term]) -> EngineResult<bool> {
        Ok(self.linear_resolve_query_with_substitution(goals)?.is_some())
    }

    /// Single-solution query returning the witnessing substitution.
    pub fn linear_resolve_query_with_substitution(
        &mut self,
        goals: &[Term],
    ) -> EngineResult<Option<Substitution>> {
        debug!(goals = goals.len(), "resolve_query");
        let subst = Substitution::new(self.kb.limits().max_vars);
        let mut on_solution =
            |_: &mut Self, _: &Substitution| -> EngineResult<Continuation> { Ok(Continuation::Stop) };
        match self.prove_goals(goals, &subst, &mut on_solution)? {
            Ok(s) => Ok(Some(s)),
            Err(_) => Ok(None),
        }
    }

    /// All-solutions query, deduplicated and projected onto `query_vars`.
    /// Restores the knowledge base to its pre-call state once enumeration
    /// is exhausted: every alternative here is explored, and then undone,
    /// from a saved checkpoint.
    pub fn linear_resolve_query_all_solutions(
        &mut self,
        goals: &[Term],
        query_vars: &[VarId],
    ) -> EngineResult<EnhancedSolutionList> {
        debug!(goals = goals.len(), "resolve_query_all_solutions");
        let subst = Substitution::new(self.kb.limits().max_vars);
        let mut solutions = EnhancedSolutionList::new();
        self.kb.save_consumed_state();
        let mut on_solution = |_: &mut Self, s: &Substitution| -> EngineResult<Continuation> {
            solutions.push(Solution::project(s, query_vars));
            Ok(Continuation::Continue)
        };
        let attempt = self.prove_goals(goals, &subst, &mut on_solution);
        let _ = self.kb.restore_consumed_state();
        attempt?;
        Ok(solutions)
    }

    // ---- Core recursion ----------------------------------------------------

    fn prove_goals<F>(
        &mut self,
        goals: &[Term],
        subst: &Substitution,
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        let (goal, rest) = match goals.split_first() {
            None => {
                return match on_solution(self, subst)? {
                    Continuation::Stop => Ok(Ok(subst.clone())),
                    Continuation::Continue => Ok(Err(ProofFailure::ResourceUnavailable)),
                };
            }
            Some(pair) => pair,
        };

        let pattern = subst.apply(goal);
        let generation = self.kb.resource_generation();

        if self.goal_stack.contains(&pattern) {
            trace!("recursion_bound: pattern already open on goal stack");
            return Ok(Err(ProofFailure::RecursionBound));
        }
        if self.goal_cache.is_known_failure(&pattern, generation) {
            trace!("recursion_bound: goal cache hit");
            return Ok(Err(ProofFailure::RecursionBound));
        }
        if self.goal_stack.at_capacity() {
            warn!(depth = self.goal_stack.depth(), "goal_stack_capacity_reached");
            return Ok(Err(ProofFailure::RecursionBound));
        }

        self.goal_stack.push(pattern.clone());
        let outcome = self.attempt_goal(goal, rest, subst, on_solution);
        self.goal_stack.pop();

        let outcome = outcome?;
        if outcome.is_err() {
            self.goal_cache
                .record_failure(pattern, self.kb.resource_generation());
        }
        Ok(outcome)
    }

    fn attempt_goal<F>(
        &mut self,
        goal: &Term,
        rest: &[Term],
        subst: &Substitution,
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        if let Ok(s) = self.try_rule_production_match(goal, rest, subst, on_solution)? {
            return Ok(Ok(s));
        }
        if let Ok(s) = self.try_rule_head_match(goal, rest, subst, on_solution)? {
            return Ok(Ok(s));
        }
        self.try_direct_fact_match(goal, rest, subst, on_solution)
    }

    /// Recurses into `rest`, then commits this attempt's checkpoint on
    /// success or restores it on failure. The caller must have already
    /// performed every KB mutation (consumption, assertion) for this
    /// attempt and opened exactly one checkpoint before calling this.
    ///
    /// `rest` is always a sibling continuation here, never a re-expansion
    /// of the goal just resolved (rule-body re-expansion goes through
    /// `prove_body_then_rest` instead), so the current goal's frame is
    /// hidden from the goal stack for the duration: otherwise two
    /// occurrences of the same ground goal in one query would each see
    /// the other's still-open frame and spuriously report a recursion
    /// bound.
    fn recurse_and_finalize<F>(
        &mut self,
        new_subst: Substitution,
        rest: &[Term],
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        let hidden = self.goal_stack.pop();
        let outcome = self.prove_goals(rest, &new_subst, on_solution);
        if let Some(pattern) = hidden {
            self.goal_stack.push(pattern);
        }
        match outcome? {
            Ok(final_subst) => {
                self.kb.commit_consumed_state()?;
                Ok(Ok(final_subst))
            }
            Err(failure) => {
                self.kb.restore_consumed_state()?;
                Ok(Err(failure))
            }
        }
    }

    /// Forwards every binding present in `after` but absent from `before`
    /// to the constraint hook. A hook rejection aborts this attempt.
    fn fire_hook_for_new_bindings(
        &mut self,
        before: &Substitution,
        after: &Substitution,
    ) -> EngineResult<Result<(), ProofFailure>> {
        for (var, term) in after.iter() {
            if before.get(var).is_none() {
                if let Err(reason) = self.hook.on_bind(var, term, after) {
                    trace!(%reason, "constraint_hook_rejected_binding");
                    return Ok(Err(ProofFailure::ResourceUnavailable));
                }
            }
        }
        Ok(Ok(()))
    }

    /// Proves a rule head-match's `body` as a recursive descent (so a
    /// self-referential body is genuine recursion and stays visible to the
    /// goal stack throughout), then — only once the body is fully proved —
    /// continues into the sibling goals in `rest` with the current frame
    /// hidden, since `rest` is free to repeat the same pattern.
    ///
    /// This does not flatten `body` and `rest` into one goal list: doing so
    /// would either reopen the same false-recursion-bound on repeated
    /// sibling goals, or (if frames were hidden around the whole list)
    /// silently defeat the recursion guard for genuinely cyclic rules.
    fn prove_body_then_rest<F>(
        &mut self,
        body: &[Term],
        rest: &[Term],
        subst: &Substitution,
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        let mut rest_result: Resolved = Err(ProofFailure::NoMatch);
        let mut settled = false;
        let body_outcome = {
            let mut body_done = |engine: &mut Self,
                                  body_subst: &Substitution|
             -> EngineResult<Continuation> {
                let hidden = engine.goal_stack.pop();
                let outcome = engine.prove_goals(rest, body_subst, on_solution);
                if let Some(pattern) = hidden {
                    engine.goal_stack.push(pattern);
                }
                match outcome {
                    Ok(resolved) => {
                        let stop = resolved.is_ok();
                        rest_result = resolved;
                        settled = true;
                        Ok(if stop {
                            Continuation::Stop
                        } else {
                            Continuation::Continue
                        })
                    }
                    Err(e) => Err(e),
                }
            };
            self.prove_goals(body, subst, &mut body_done)
        };
        body_outcome?;
        if settled {
            Ok(rest_result)
        } else {
            Ok(Err(ProofFailure::ResourceUnavailable))
        }
    }

    // ---- Step 1: rule production match (linear-logic firing) --------------

    fn try_rule_production_match<F>(
        &mut self,
        goal: &Term,
        rest: &[Term],
        subst: &Substitution,
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        let goal_applied = subst.apply(goal);
        let rule_ids = self.kb.rules().matching_production(&goal_applied);
        let mut last_failure = ProofFailure::NoMatch;

        for rule_id in rule_ids {
            let rule = match self.kb.rules().get(rule_id) {
                Some(r) => r.clone(),
                None => continue,
            };
            if rule.production.is_none() {
                continue;
            }
            let instance = self.next_instance;
            self.next_instance += 1;
            let (_, body, production) = instantiate_rule(self.kb, &rule, instance);
            let production = match production {
                Some(p) => p,
                None => continue,
            };

            self.kb.save_consumed_state();
            match unify(&goal_applied, &production, subst) {
                Ok(after_head) => {
                    if let Err(failure) = self.fire_hook_for_new_bindings(subst, &after_head)? {
                        let _ = self.kb.restore_consumed_state();
                        last_failure = failure;
                        continue;
                    }
                    match self.discharge_body(&body, &after_head)? {
                        Ok((after_body, consumed_ids)) => {
                            if let Err(e) = self.mark_all_consumed(&consumed_ids) {
                                let _ = self.kb.restore_consumed_state();
                                return Err(e);
                            }
                            let asserted = after_body.apply(&production);
                            let site = functor_symbol(&asserted).unwrap_or(SymbolId::NULL);
                            debug!(rule = rule_id.0, "rule_production_fired");
                            let produced = self.kb.add_linear_fact(asserted, site);
                            // The production itself is what satisfies `goal`;
                            // it is consumed on the spot rather than left
                            // available for a later goal to match again.
                            if let Err(e) = self.kb.mark_consumed(produced) {
                                let _ = self.kb.restore_consumed_state();
                                return Err(e.into());
                            }
                            match self.recurse_and_finalize(after_body, rest, on_solution)? {
                                Ok(s) => return Ok(Ok(s)),
                                Err(failure) => {
                                    last_failure = failure;
                                    continue;
                                }
                            }
                        }
                        Err(failure) => {
                            let _ = self.kb.restore_consumed_state();
                            last_failure = failure;
                            continue;
                        }
                    }
                }
                Err(UnifyFailure::CapacityExceeded) => {
                    let _ = self.kb.restore_consumed_state();
                    return Err(EngineError::Capacity(
                        "substitution exhausted unifying a rule production".to_string(),
                    ));
                }
                Err(UnifyFailure::OccursCheck { .. }) => {
                    let _ = self.kb.restore_consumed_state();
                    last_failure = ProofFailure::OccursCheck;
                }
                Err(_) => {
                    let _ = self.kb.restore_consumed_state();
                    last_failure = ProofFailure::NoMatch;
                }
            }
        }
        Ok(Err(last_failure))
    }

    fn mark_all_consumed(&mut self, ids: &[ResourceId]) -> EngineResult<()> {
        for id in ids {
            self.kb.mark_consumed(*id)?;
        }
        Ok(())
    }

    /// Greedily matches each body literal (in order) against the first
    /// available resource, consuming linear matches. No backtracking across
    /// literals: a later literal's failure fails the whole discharge
    /// (`SPEC_FULL.md` §4.F, "Body discharge").
    fn discharge_body(&mut self, body: &[Term], subst: &Substitution) -> EngineResult<BodyResolved> {
        let mut current = subst.clone();
        let mut consumed_ids = Vec::new();

        for literal in body {
            let applied = current.apply(literal);
            let candidates: Vec<(ResourceId, Term, bool)> = self
                .kb
                .resources()
                .iter()
                .filter(|r| r.is_available() && !consumed_ids.contains(&r.id))
                .map(|r| (r.id, r.fact.clone(), !r.persistence.is_reusable()))
                .collect();

            let mut matched = None;
            for (id, fact, should_consume) in candidates {
                match self.kb.types().can_unify_with_type(&applied, &fact, &current) {
                    Ok(s) => {
                        matched = Some((id, should_consume, s));
                        break;
                    }
                    Err(UnifyFailure::CapacityExceeded) => {
                        return Err(EngineError::Capacity(
                            "substitution exhausted during body discharge".to_string(),
                        ));
                    }
                    Err(_) => continue,
                }
            }

            match matched {
                Some((id, should_consume, next)) => {
                    if let Err(failure) = self.fire_hook_for_new_bindings(&current, &next)? {
                        return Ok(Err(failure));
                    }
                    current = next;
                    if should_consume {
                        consumed_ids.push(id);
                    }
                }
                None => return Ok(Err(ProofFailure::ResourceUnavailable)),
            }
        }
        Ok(Ok((current, consumed_ids)))
    }

    // ---- Step 2: rule head match (Horn-clause style) -----------------------

    fn try_rule_head_match<F>(
        &mut self,
        goal: &Term,
        rest: &[Term],
        subst: &Substitution,
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        let goal_applied = subst.apply(goal);
        let rule_ids = self.kb.rules().matching_head(&goal_applied);
        let mut last_failure = ProofFailure::NoMatch;

        for rule_id in rule_ids {
            let rule = match self.kb.rules().get(rule_id) {
                Some(r) => r.clone(),
                None => continue,
            };
            // Production rules are handled exclusively by the production-match
            // path (SPEC_FULL.md §9, resolved question (c)), even if also
            // indexed by head.
            if rule.production.is_some() {
                continue;
            }
            let instance = self.next_instance;
            self.next_instance += 1;
            let (head, body, _) = instantiate_rule(self.kb, &rule, instance);
            let head = match head {
                Some(h) => h,
                None => continue,
            };

            self.kb.save_consumed_state();
            match unify(&goal_applied, &head, subst) {
                Ok(after_head) => {
                    if let Err(failure) = self.fire_hook_for_new_bindings(subst, &after_head)? {
                        let _ = self.kb.restore_consumed_state();
                        last_failure = failure;
                        continue;
                    }
                    debug!(rule = rule_id.0, "rule_head_matched");
                    match self.prove_body_then_rest(&body, rest, &after_head, on_solution)? {
                        Ok(s) => {
                            self.kb.commit_consumed_state()?;
                            return Ok(Ok(s));
                        }
                        Err(failure) => {
                            let _ = self.kb.restore_consumed_state();
                            last_failure = failure;
                            continue;
                        }
                    }
                }
                Err(UnifyFailure::CapacityExceeded) => {
                    let _ = self.kb.restore_consumed_state();
                    return Err(EngineError::Capacity(
                        "substitution exhausted unifying a rule head".to_string(),
                    ));
                }
                Err(UnifyFailure::OccursCheck { .. }) => {
                    let _ = self.kb.restore_consumed_state();
                    last_failure = ProofFailure::OccursCheck;
                }
                Err(_) => {
                    let _ = self.kb.restore_consumed_state();
                    last_failure = ProofFailure::NoMatch;
                }
            }
        }
        Ok(Err(last_failure))
    }

    // ---- Step 3: direct fact match -----------------------------------------

    fn try_direct_fact_match<F>(
        &mut self,
        goal: &Term,
        rest: &[Term],
        subst: &Substitution,
        on_solution: &mut F,
    ) -> EngineResult<Resolved>
    where
        F: FnMut(&mut Self, &Substitution) -> EngineResult<Continuation>,
    {
        let goal_applied = subst.apply(goal);
        let candidates: Vec<(ResourceId, Term, bool)> = self
            .kb
            .resources()
            .iter()
            .filter(|r| r.is_available())
            .map(|r| (r.id, r.fact.clone(), !r.persistence.is_reusable()))
            .collect();
        let mut last_failure = ProofFailure::ResourceUnavailable;

        for (id, fact, should_consume) in candidates {
            self.kb.save_consumed_state();
            match self.kb.types().can_unify_with_type(&goal_applied, &fact, subst) {
                Ok(trial) => {
                    if let Err(failure) = self.fire_hook_for_new_bindings(subst, &trial)? {
                        let _ = self.kb.restore_consumed_state();
                        last_failure = failure;
                        continue;
                    }
                    if should_consume {
                        if let Err(e) = self.kb.mark_consumed(id) {
                            let _ = self.kb.restore_consumed_state();
                            return Err(e.into());
                        }
                    }
                    match self.recurse_and_finalize(trial, rest, on_solution)? {
                        Ok(s) => return Ok(Ok(s)),
                        Err(failure) => {
                            last_failure = failure;
                            continue;
                        }
                    }
                }
                Err(UnifyFailure::CapacityExceeded) => {
                    let _ = self.kb.restore_consumed_state();
                    return Err(EngineError::Capacity(
                        "substitution exhausted matching a fact".to_string(),
                    ));
                }
                Err(UnifyFailure::OccursCheck { .. }) => {
                    let _ = self.kb.restore_consumed_state();
                    last_failure = ProofFailure::OccursCheck;
                }
                Err(_) => {
                    let _ = self.kb.restore_consumed_state();
                    last_failure = ProofFailure::TypeMismatch;
                }
            }
        }
        Ok(Err(last_failure))
    }
}
