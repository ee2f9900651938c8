//! Knowledge Base Errors

use thiserror::Error;

use crate::symbols::SymbolError;

/// Errors raised by [`super::KnowledgeBase`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KbError {
    /// Interning a symbol or variable name overflowed the symbol table.
    #[error("symbol error: {0}")]
    Symbol(#[from] SymbolError),

    /// The rule table is full.
    #[error("rule table exhausted: limit is {0} rules")]
    RuleTableFull(usize),

    /// A checkpoint was restored with no matching `save_consumed_state`.
    #[error("checkpoint stack underflow: no checkpoint to restore")]
    CheckpointUnderflow,

    /// A resource handle did not refer to a live resource in this KB.
    #[error("resource handle {0} is not live in this knowledge base")]
    UnknownResource(u64),
}

pub type KbResult<T> = Result<T, KbError>;
