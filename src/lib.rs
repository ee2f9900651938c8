//! # linelogic
//!
//! An execution core for a functional-logic runtime with linear-logic
//! resource semantics: terms, unification, a linear knowledge base, and a
//! goal-directed resolution engine.
//!
//! ## Pipeline Architecture
//!
//! ```text
//! Query (ordered goal terms)
//!     |
//! [Resolution Engine]              -- goal-directed search
//!     |
//!     |-- rule production match    -- forward-chain body discharge
//!     |-- rule head match          -- Horn-clause recursive descent
//!     `-- direct fact match        -- type-directed resource scan
//!     |
//! [Knowledge Base]                 -- linear / persistent resources, rules
//!     |                               checkpoint stack for backtracking
//!     |
//! [Unification + Substitution]     -- occurs-checked binding, composition
//!     |
//! [Constraint Hook]                -- external solver callback on bind
//!     |
//! [Solution Collector]             -- projected, deduplicated solutions
//! ```
//!
//! ## Module Organization
//!
//! | Module | Component | Purpose |
//! |--------|-----------|---------|
//! | `symbols` | A | Symbol and variable interning |
//! | `term` | B | The term representation |
//! | `subst` | C | Substitutions |
//! | `unify` | D | Unification (`unify`, `unify_terms`) |
//! | `kb` | E | The knowledge base: resources, rules, types, checkpoints |
//! | `engine` | F | The resolution engine (the heart of the system) |
//! | `constraint` | G | The external constraint hook |
//! | `solution` | H | The solution collector |
//! | `config` | - | Hierarchical `Limits` configuration |
//! | `error` | - | The crate-level `CoreError` aggregate |
//!
//! ## Usage
//!
//! ```
//! use linelogic::config::Limits;
//! use linelogic::constraint::NoopHook;
//! use linelogic::engine::ResolutionEngine;
//! use linelogic::kb::KnowledgeBase;
//! use linelogic::symbols::Interner;
//! use linelogic::term::Term;
//!
//! let mut interner = Interner::new();
//! let coin = interner.intern("coin").unwrap();
//! let mut kb = KnowledgeBase::new(interner, Limits::default());
//! kb.add_linear_fact(Term::Atom(coin), coin);
//!
//! let mut hook = NoopHook;
//! let mut engine = ResolutionEngine::new(&mut kb, &mut hook);
//! assert!(engine.linear_resolve_query(&[Term::Atom(coin)]).unwrap());
//! assert!(!engine.linear_resolve_query(&[Term::Atom(coin)]).unwrap());
//! ```

pub mod config;
pub mod constraint;
pub mod engine;
pub mod error;
pub mod kb;
pub mod solution;
pub mod subst;
pub mod symbols;
pub mod term;
pub mod unify;

pub use config::Limits;
pub use constraint::{ConstraintHook, NoopHook};
pub use engine::{EngineError, EngineResult, ResolutionEngine};
pub use error::{CoreError, CoreResult};
pub use kb::{KbError, KnowledgeBase, Persistence, ResourceId, Rule};
pub use solution::{EnhancedSolutionList, Solution};
pub use subst::{SubstError, Substitution};
pub use symbols::{Interner, SymbolError, SymbolId, VarId};
pub use term::Term;
pub use unify::{unify, unify_terms, UnifyFailure};
