//! Crate-Level Error
//!
//! [`CoreError`] composes every subsystem's error type via `#[from]`, for
//! callers that just want to know *whether* an operation failed, not which
//! layer it failed in. Subsystems that distinguish finer-grained outcomes
//! (the resolution engine's own branch-failure taxonomy, in particular)
//! keep their own error type and only reach this one at the outermost
//! driver-facing calls.

use thiserror::Error;

use crate::engine::EngineError;
use crate::kb::KbError;
use crate::subst::SubstError;
use crate::symbols::SymbolError;

/// The crate's top-level error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("symbol table: {0}")]
    Symbol(#[from] SymbolError),

    #[error("substitution: {0}")]
    Subst(#[from] SubstError),

    #[error("knowledge base: {0}")]
    Kb(#[from] KbError),

    #[error("resolution engine: {0}")]
    Engine(#[from] EngineError),
}

pub type CoreResult<T> = Result<T, CoreError>;
