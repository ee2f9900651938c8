//! Symbol and Variable Interner
//!
//! Maps atom/functor names to compact [`SymbolId`]s and hands out fresh
//! [`VarId`]s for query variables. Interning is canonical: two names intern
//! to the same id iff they are byte-for-byte equal.
//!
//! The counter for fresh variable ids is scoped to a single [`Interner`]
//! instance (and so to a single knowledge base), not to the process — two
//! independent interners can and will allocate overlapping `VarId`s.

use std::collections::HashMap;

use thiserror::Error;

/// Maximum number of distinct symbols a single interner can hold.
pub const MAX_SYMBOLS: usize = 65_535;

/// Errors raised by the interner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolError {
    /// The symbol table is full; no more names can be interned.
    #[error("symbol table exhausted: cannot intern '{0}', limit is {MAX_SYMBOLS}")]
    TableFull(String),

    /// A [`SymbolId`] that does not correspond to any interned name.
    #[error("symbol id {0} is not interned")]
    UnknownSymbol(SymbolId),
}

pub type SymbolResult<T> = Result<T, SymbolError>;

/// A compact, canonical identifier for an interned atom or functor name.
///
/// `0` is reserved for [`SymbolId::NULL`] and is never returned by
/// [`Interner::intern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u16);

impl SymbolId {
    /// Reserved id meaning "no symbol" / an uninitialized slot.
    pub const NULL: SymbolId = SymbolId(0);
    pub const TRUE: SymbolId = SymbolId(1);
    pub const FALSE: SymbolId = SymbolId(2);
    pub const NIL: SymbolId = SymbolId(3);
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A monotonically allocated identifier for a logic variable.
///
/// Variable *identity* is the id; a name is informational only and is used
/// solely to let `fresh_var` return the same id for repeated mentions of a
/// named variable within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub u16);

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_{}", self.0)
    }
}

/// Canonical symbol/variable table for one knowledge base.
#[derive(Debug, Clone)]
pub struct Interner {
    names: Vec<String>,
    by_name: HashMap<String, SymbolId>,
    var_names: Vec<Option<String>>,
    var_by_name: HashMap<String, VarId>,
    next_var: u32,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates an interner pre-seeded with the built-in symbols `true`,
    /// `false`, and `nil` at their fixed ids.
    pub fn new() -> Self {
        let mut me = Interner {
            names: vec![String::new(); 4],
            by_name: HashMap::new(),
            var_names: Vec::new(),
            var_by_name: HashMap::new(),
            next_var: 0,
        };
        me.names[SymbolId::NULL.0 as usize] = "\0null".to_string();
        me.names[SymbolId::TRUE.0 as usize] = "true".to_string();
        me.names[SymbolId::FALSE.0 as usize] = "false".to_string();
        me.names[SymbolId::NIL.0 as usize] = "nil".to_string();
        me.by_name.insert("true".to_string(), SymbolId::TRUE);
        me.by_name.insert("false".to_string(), SymbolId::FALSE);
        me.by_name.insert("nil".to_string(), SymbolId::NIL);
        me
    }

    /// Interns `name`, returning its canonical id. Idempotent.
    pub fn intern(&mut self, name: &str) -> SymbolResult<SymbolId> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        if self.names.len() >= MAX_SYMBOLS {
            return Err(SymbolError::TableFull(name.to_string()));
        }
        let id = SymbolId(self.names.len() as u16);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolves a [`SymbolId`] back to its interned name. Total on valid ids.
    pub fn resolve(&self, id: SymbolId) -> SymbolResult<&str> {
        self.names
            .get(id.0 as usize)
            .map(String::as_str)
            .ok_or(SymbolError::UnknownSymbol(id))
    }

    /// Returns a fresh [`VarId`], or the existing one if `name` is `Some`
    /// and was already interned as a variable name.
    pub fn fresh_var(&mut self, name: Option<&str>) -> VarId {
        if let Some(name) = name {
            if let Some(id) = self.var_by_name.get(name) {
                return *id;
            }
        }
        let id = VarId(self.next_var as u16);
        self.next_var += 1;
        self.var_names.push(name.map(str::to_string));
        if let Some(name) = name {
            self.var_by_name.insert(name.to_string(), id);
        }
        id
    }

    /// Name a caller previously supplied for `var`, if any.
    pub fn var_name(&self, var: VarId) -> Option<&str> {
        self.var_names.get(var.0 as usize).and_then(Option::as_deref)
    }

    /// Number of distinct variables allocated so far.
    pub fn var_count(&self) -> usize {
        self.next_var as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut i = Interner::new();
        let a = i.intern("coin").unwrap();
        let b = i.intern("coin").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, i.intern("candy").unwrap());
    }

    #[test]
    fn builtins_are_preseeded() {
        let mut i = Interner::new();
        assert_eq!(i.intern("true").unwrap(), SymbolId::TRUE);
        assert_eq!(i.intern("false").unwrap(), SymbolId::FALSE);
        assert_eq!(i.intern("nil").unwrap(), SymbolId::NIL);
    }

    #[test]
    fn resolve_round_trips() {
        let mut i = Interner::new();
        let id = i.intern("edge").unwrap();
        assert_eq!(i.resolve(id).unwrap(), "edge");
    }

    #[test]
    fn resolve_unknown_symbol_errors() {
        let i = Interner::new();
        assert_eq!(
            i.resolve(SymbolId(9999)),
            Err(SymbolError::UnknownSymbol(SymbolId(9999)))
        );
    }

    #[test]
    fn fresh_var_reuses_named_variable() {
        let mut i = Interner::new();
        let x1 = i.fresh_var(Some("X"));
        let x2 = i.fresh_var(Some("X"));
        let y = i.fresh_var(Some("Y"));
        let anon = i.fresh_var(None);
        assert_eq!(x1, x2);
        assert_ne!(x1, y);
        assert_ne!(x1, anon);
        assert_eq!(i.var_name(x1), Some("X"));
    }
}
