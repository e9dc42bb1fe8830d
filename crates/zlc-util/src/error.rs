//! The error taxonomy.
//!
//! Every way a compilation can fail maps to one of eleven numeric
//! categories, which double as the process exit code. Fallible phase
//! functions return `Result<T, CompileError>`; an error propagates
//! upward unchanged, so the first (lowest-layer) classification is the
//! one the driver reports.

use thiserror::Error;

use crate::Span;

/// Classification of a compilation failure.
///
/// The discriminants are the process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid lexeme in the source text.
    Lexical,

    /// Token stream does not match the grammar.
    Syntax,

    /// Use of an undefined function or variable.
    Undefined,

    /// Wrong number/type of call arguments, wrong return value type,
    /// or a discarded non-void return value.
    Params,

    /// Redefinition of a name, or write to a constant.
    Redefinition,

    /// Missing or excess expression in a return statement.
    Return,

    /// Type incompatibility in an expression or assignment.
    TypeCompat,

    /// The type of a declaration cannot be inferred.
    TypeInference,

    /// A variable is never used, or a mutable variable is never
    /// reassigned, within its scope.
    UnusedVar,

    /// Any other semantic violation (e.g. an uncalled function).
    OtherSemantic,

    /// Internal failure independent of the input program.
    Internal,
}

impl ErrorKind {
    /// Returns the process exit code for this kind.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Lexical => 1,
            ErrorKind::Syntax => 2,
            ErrorKind::Undefined => 3,
            ErrorKind::Params => 4,
            ErrorKind::Redefinition => 5,
            ErrorKind::Return => 6,
            ErrorKind::TypeCompat => 7,
            ErrorKind::TypeInference => 8,
            ErrorKind::UnusedVar => 9,
            ErrorKind::OtherSemantic => 10,
            ErrorKind::Internal => 99,
        }
    }

    /// Short human-readable name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Undefined => "undefined name",
            ErrorKind::Params => "parameter error",
            ErrorKind::Redefinition => "redefinition error",
            ErrorKind::Return => "return error",
            ErrorKind::TypeCompat => "type error",
            ErrorKind::TypeInference => "type inference error",
            ErrorKind::UnusedVar => "unused variable",
            ErrorKind::OtherSemantic => "semantic error",
            ErrorKind::Internal => "internal error",
        }
    }
}

/// A classified compilation failure with a human-readable message.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}: {message}", .kind.as_str())]
pub struct CompileError {
    /// Failure category; determines the exit code.
    pub kind: ErrorKind,

    /// Explanation for the user.
    pub message: String,

    /// Source location, when one is known.
    pub span: Option<Span>,
}

impl CompileError {
    /// Creates an error of the given kind without a location.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Creates an error of the given kind at a location.
    pub fn at(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span: Some(span),
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

/// Result alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, CompileError>;
