//! AST node definitions.
//!
//! The parser produces one [`Program`] per compilation. Every node
//! carries the span of its introducing token so later phases can
//! attach locations to diagnostics.

use std::fmt;

use zlc_util::{Span, Symbol};

/// A data type of the source language.
///
/// `Slice` is the byte-slice type `[]u8`, used as the string type.
/// Nullability is tracked separately wherever it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// No annotation; the type is inferred from the initializer.
    Unspecified,
    Void,
    I32,
    F64,
    U8,
    Slice,
}

impl DataType {
    /// Returns true for the arithmetic types `i32` and `f64`.
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::I32 | DataType::F64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Unspecified => write!(f, "<unspecified>"),
            DataType::Void => write!(f, "void"),
            DataType::I32 => write!(f, "i32"),
            DataType::F64 => write!(f, "f64"),
            DataType::U8 => write!(f, "u8"),
            DataType::Slice => write!(f, "[]u8"),
        }
    }
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
}

impl BinOp {
    /// Left-binding precedence; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div => 4,
            BinOp::Add | BinOp::Sub => 3,
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => 2,
            BinOp::Eq | BinOp::NotEq => 1,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::NotEq)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
        };
        f.write_str(text)
    }
}

/// A whole source file.
#[derive(Debug, Clone)]
pub struct Program {
    /// The import alias bound by the prolog (usually `ifj`).
    pub alias: Symbol,

    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}

/// Top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Function(FnDecl),
    Var(VarDecl),
}

/// Function declaration.
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: Symbol,
    pub params: Vec<Param>,

    /// Declared return type.
    pub ret: DataType,

    /// True when the return type is marked `?`.
    pub nullable: bool,

    pub body: Block,
    pub span: Span,
}

/// Function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: DataType,
    pub nullable: bool,
    pub span: Span,
}

/// Variable or constant declaration.
///
/// Top-level declarations and declaration statements share this node.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Symbol,

    /// Declared type; `Unspecified` requests inference.
    pub declared: DataType,

    /// True when the declared type is marked `?`.
    pub nullable: bool,

    /// `const` vs `var`.
    pub is_const: bool,

    /// Initializer; mandatory in the grammar.
    pub init: Expr,

    pub span: Span,
}

/// Brace-delimited statement sequence.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// Statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    Decl(VarDecl),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),

    /// Expression statement; only calls are allowed by the grammar.
    Call(CallExpr),
}

/// Assignment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignTarget {
    /// A named variable.
    Name(Symbol),

    /// The discard sink `_`; evaluates the value and drops it.
    Discard,
}

/// Assignment statement.
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

/// `if` statement with optional element-bind and else block.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,

    /// `|name|` non-null unwrap binding visible in the then block.
    pub bind: Option<Symbol>,

    pub then_block: Block,
    pub else_block: Option<Block>,
    pub span: Span,
}

/// `while` statement with optional element-bind.
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub bind: Option<Symbol>,
    pub body: Block,
    pub span: Span,
}

/// `return` statement.
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Function call, either user-defined or an `ifj.*` builtin.
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Callee name. Builtin calls through the import alias are stored
    /// with the canonical `ifj.` prefix regardless of the alias.
    pub name: Symbol,

    /// True when the call went through the import alias.
    pub builtin: bool,

    pub args: Vec<Expr>,
    pub span: Span,
}

/// Binary operation.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// Expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64, Span),
    Float(f64, Span),
    Str(Symbol, Span),
    Null(Span),
    Ident(Symbol, Span),
    Call(CallExpr),
    Binary(BinaryExpr),
}

impl Expr {
    /// The source location of the expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(_, span)
            | Expr::Float(_, span)
            | Expr::Str(_, span)
            | Expr::Null(span)
            | Expr::Ident(_, span) => *span,
            Expr::Call(call) => call.span,
            Expr::Binary(binary) => binary.span,
        }
    }

    /// Returns true for literal leaves (including `null`).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expr::Int(..) | Expr::Float(..) | Expr::Str(..) | Expr::Null(..)
        )
    }
}
