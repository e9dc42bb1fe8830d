//! Diagnostic collection.
//!
//! The `Handler` accumulates diagnostics during a compilation and
//! remembers the *first* error kind it saw. Later reports never
//! overwrite that kind, so the earliest (lowest-layer) diagnosis is
//! the one that decides the exit code even if further errors are
//! reported on the way out.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::{CompileError, ErrorKind, Span};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// A failure; compilation cannot succeed.
    Error,

    /// A non-fatal observation.
    Warning,

    /// Additional context for a preceding diagnostic.
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single human-readable message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            span,
        }
    }

    pub fn warning(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{}: {} ({})", self.level, self.message, span),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// Collects diagnostics and tracks the sticky first error kind.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    first_error: Cell<Option<ErrorKind>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a classified error.
    ///
    /// The diagnostic is always appended; the error *kind* is recorded
    /// only if no error kind has been recorded yet.
    pub fn report(&self, error: &CompileError) {
        self.set_error(error.kind);
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::error(error.to_string(), error.span));
    }

    /// Records an error kind without a message.
    ///
    /// First write wins: once the kind is non-empty it never changes.
    pub fn set_error(&self, kind: ErrorKind) {
        if self.first_error.get().is_none() {
            self.first_error.set(Some(kind));
        }
    }

    /// Appends a warning.
    pub fn warn(&self, message: impl Into<String>, span: Option<Span>) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::warning(message, span));
    }

    /// The first error kind reported, if any.
    pub fn first_error(&self) -> Option<ErrorKind> {
        self.first_error.get()
    }

    /// Returns true if any error has been reported.
    pub fn has_errors(&self) -> bool {
        self.first_error.get().is_some()
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the collected diagnostics, leaving the handler empty.
    ///
    /// The sticky error kind is *not* reset; it stays valid for the
    /// lifetime of the compilation.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Writes every collected diagnostic to the given sink.
    pub fn emit_to(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        for diagnostic in self.diagnostics.borrow().iter() {
            writeln!(out, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_error_wins() {
        let handler = Handler::new();
        handler.set_error(ErrorKind::Lexical);
        handler.set_error(ErrorKind::Syntax);
        handler.set_error(ErrorKind::Internal);
        assert_eq!(handler.first_error(), Some(ErrorKind::Lexical));
    }

    #[test]
    fn test_report_collects_and_sticks() {
        let handler = Handler::new();
        assert!(!handler.has_errors());

        handler.report(&CompileError::new(ErrorKind::TypeCompat, "mismatch"));
        handler.report(&CompileError::new(ErrorKind::Syntax, "late report"));

        assert_eq!(handler.first_error(), Some(ErrorKind::TypeCompat));
        assert_eq!(handler.len(), 2);
    }

    #[test]
    fn test_warnings_do_not_set_error() {
        let handler = Handler::new();
        handler.warn("unused suffix", None);
        assert!(!handler.has_errors());
        assert_eq!(handler.len(), 1);
    }

    #[test]
    fn test_take_keeps_sticky_kind() {
        let handler = Handler::new();
        handler.report(&CompileError::new(ErrorKind::Return, "missing value"));
        let drained = handler.take();
        assert_eq!(drained.len(), 1);
        assert!(handler.is_empty());
        assert_eq!(handler.first_error(), Some(ErrorKind::Return));
    }

    fn arb_kind() -> impl Strategy<Value = ErrorKind> {
        prop_oneof![
            Just(ErrorKind::Lexical),
            Just(ErrorKind::Syntax),
            Just(ErrorKind::Undefined),
            Just(ErrorKind::Params),
            Just(ErrorKind::Redefinition),
            Just(ErrorKind::Return),
            Just(ErrorKind::TypeCompat),
            Just(ErrorKind::TypeInference),
            Just(ErrorKind::UnusedVar),
            Just(ErrorKind::OtherSemantic),
            Just(ErrorKind::Internal),
        ]
    }

    proptest! {
        /// For any sequence of reports, the recorded kind is the first.
        #[test]
        fn prop_stickiness(kinds in proptest::collection::vec(arb_kind(), 1..16)) {
            let handler = Handler::new();
            for kind in &kinds {
                handler.set_error(*kind);
            }
            prop_assert_eq!(handler.first_error(), Some(kinds[0]));
        }
    }
}
