//! zlc-sem - Semantic analyzer.
//!
//! Walks the AST produced by `zlc-par` and enforces the static rules
//! of the language: name resolution over a layered scope stack, type
//! checking with literal-only numeric promotion, nullability
//! propagation, element-bind handling, call signatures (user functions
//! and the closed `ifj.*` builtin set), return shapes, and usage
//! analysis.
//!
//! Analysis is abortive: the first violation is returned as a
//! `CompileError` and classifies the whole compilation.
//!
//! Functions are analyzed lazily on first call and memoized, so a
//! call into a function declared later in the file type-checks against
//! its real signature; bodies nobody calls are still analyzed before
//! the final usage pass.

mod analysis;
pub mod builtins;
pub mod scope;
pub mod symtab;

#[cfg(test)]
mod edge_cases;

pub use analysis::{analyze, Analyzer};
