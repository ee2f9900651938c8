//! External Constraint Hook
//!
//! A thin interface to an external numeric solver. The resolution engine
//! treats the implementor as a trusted collaborator: it is invoked at most
//! once per logical binding event, *after* the substitution has been
//! extended but *before* the search resumes, so it never observes partial
//! unification state (`SPEC_FULL.md` §9).
//!
//! The constraint store itself — arithmetic over reals, its own solving
//! loop, termination — is out of scope for this core; only the callback
//! boundary is specified here.

use crate::subst::Substitution;
use crate::symbols::VarId;
use crate::term::Term;

/// Implemented by an external constraint store. `on_bind` may itself bind
/// further variables through `env`, which is why it receives the live
/// substitution rather than a snapshot.
pub trait ConstraintHook {
    /// Called once per binding event with the variable just bound, the term
    /// it was bound to, and the substitution the binding landed in.
    ///
    /// Returning `Err` aborts the current branch as a [`ResourceUnavailable`]-style
    /// failure; the engine does not interpret the error further.
    fn on_bind(&mut self, var: VarId, term: &Term, env: &Substitution) -> Result<(), String>;
}

/// A hook that does nothing; the default when no external solver is wired
/// in. Keeps callers from having to special-case "no hook configured".
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl ConstraintHook for NoopHook {
    fn on_bind(&mut self, _var: VarId, _term: &Term, _env: &Substitution) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<VarId>);

    impl ConstraintHook for Recorder {
        fn on_bind(&mut self, var: VarId, _term: &Term, _env: &Substitution) -> Result<(), String> {
            self.0.push(var);
            Ok(())
        }
    }

    #[test]
    fn noop_hook_never_fails() {
        let mut hook = NoopHook;
        let s = Substitution::new(8);
        assert!(hook.on_bind(VarId(0), &Term::Integer(1), &s).is_ok());
    }

    #[test]
    fn custom_hook_observes_binding_events() {
        let mut hook = Recorder(Vec::new());
        let s = Substitution::new(8);
        hook.on_bind(VarId(3), &Term::Integer(1), &s).unwrap();
        assert_eq!(hook.0, vec![VarId(3)]);
    }
}
