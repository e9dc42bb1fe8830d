//! Scope stack.
//!
//! A LIFO of frames, each holding one symbol table. One stack exists
//! per analyzed function; name resolution walks the innermost frame
//! outward. The global table is searched by the analyzer after the
//! stack comes up empty.

use zlc_util::Symbol;

use crate::symtab::{Entry, SymbolTable, VarSymbol};

/// Stack of scope frames.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<SymbolTable>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new innermost frame.
    pub fn push_frame(&mut self) {
        self.frames.push(SymbolTable::new());
    }

    /// Closes the innermost frame, returning its table.
    pub fn pop_frame(&mut self) -> Option<SymbolTable> {
        self.frames.pop()
    }

    /// The innermost frame.
    pub fn top(&self) -> Option<&SymbolTable> {
        self.frames.last()
    }

    /// Declares a variable in the innermost frame.
    ///
    /// Returns false when the name already exists in that frame.
    pub fn declare(&mut self, var: VarSymbol) -> bool {
        match self.frames.last_mut() {
            Some(frame) => frame.insert(var.name, Entry::Var(var)),
            None => false,
        }
    }

    /// True when the name is declared in the innermost frame.
    pub fn declared_in_top(&self, name: Symbol) -> bool {
        self.frames
            .last()
            .map(|frame| frame.contains(name))
            .unwrap_or(false)
    }

    /// True when any frame declares the name.
    pub fn contains(&self, name: Symbol) -> bool {
        self.frames.iter().any(|frame| frame.contains(name))
    }

    /// Resolves a variable, innermost frame first.
    pub fn lookup(&self, name: Symbol) -> Option<&VarSymbol> {
        for frame in self.frames.iter().rev() {
            if let Some(Entry::Var(var)) = frame.get(name) {
                return Some(var);
            }
        }
        None
    }

    /// Resolves a variable mutably, innermost frame first.
    pub fn lookup_mut(&mut self, name: Symbol) -> Option<&mut VarSymbol> {
        let index = self
            .frames
            .iter()
            .rposition(|frame| frame.contains(name))?;
        self.frames[index].var_mut(name)
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
