//! Resolution Engine Errors
//!
//! Only [`EngineError::Capacity`] and [`EngineError::Malformed`] ever
//! surface out of the engine's public entry points (`SPEC_FULL.md` §7): the
//! other error kinds named in the taxonomy — occurs-check failure,
//! resource-unavailable, type-mismatch, recursion-bound — are ordinary
//! branch failures the search recovers from and are represented internally
//! by [`ProofFailure`](super::ProofFailure), never by this enum.

use thiserror::Error;

use crate::kb::KbError;
use crate::subst::SubstError;
use crate::symbols::SymbolError;

/// Errors the resolution engine surfaces to its caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A substitution, symbol table, or rule table ran out of room.
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// A null term, inconsistent arity, or CLONE cycle reached the engine.
    /// Always an implementation bug upstream of the engine, never a user
    /// query failure.
    #[error("malformed input: {0}")]
    Malformed(String),
}

impl From<SubstError> for EngineError {
    fn from(e: SubstError) -> Self {
        EngineError::Capacity(e.to_string())
    }
}

impl From<SymbolError> for EngineError {
    fn from(e: SymbolError) -> Self {
        EngineError::Capacity(e.to_string())
    }
}

impl From<KbError> for EngineError {
    fn from(e: KbError) -> Self {
        match e {
            KbError::RuleTableFull(_) => EngineError::Capacity(e.to_string()),
            other => EngineError::Malformed(other.to_string()),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
