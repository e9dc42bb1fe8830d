//! zlc-par - Parser (syntactic analyzer).
//!
//! Predictive recursive descent with one token of lookahead, except
//! for expressions which use an operator-precedence algorithm (see
//! `expr`). The parser pulls tokens from the lexer on demand and
//! builds the AST defined in [`ast`].
//!
//! Grammar outline:
//!
//! ```text
//! program     = prolog { top-decl } EOF ;
//! prolog      = "const" IDENT "=" "@import" "(" "ifj24.zig" ")" ";" ;
//! top-decl    = fn-decl | var-decl ;
//! fn-decl     = "pub" "fn" IDENT "(" params ")" [ "?" ] ret-type block ;
//! ret-type    = "void" | "i32" | "f64" | "u8" | "[]" "u8" ;
//! params      = [ param { "," param } [ "," ] ] ;
//! param       = IDENT ":" [ "?" ] type ;
//! var-decl    = ( "const" | "var" ) IDENT [ ":" [ "?" ] type ] "=" expr ";" ;
//! block       = "{" { statement } "}" ;
//! statement   = if | while | var-decl | return | assign-or-call ;
//! if          = "if" "(" expr ")" [ "|" IDENT "|" ] block [ "else" block ] ;
//! while       = "while" "(" expr ")" [ "|" IDENT "|" ] block ;
//! return      = "return" [ expr ] ";" ;
//! ```
//!
//! A lexical error surfaces through the parser unchanged; every other
//! failure here is classified as `Syntax`.

pub mod ast;
mod expr;

#[cfg(test)]
mod edge_cases;

use zlc_lex::{Lexer, Token};
use zlc_util::{CompileError, ErrorKind, Result, Span, Symbol};

use crate::ast::*;

/// Parses a complete source text into a [`Program`].
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(Lexer::new(source))?.parse()
}

/// The parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    /// One-token lookahead.
    current: Token,

    /// Span of `current`.
    span: Span,

    /// Import alias bound by the prolog; dummy until the prolog parsed.
    alias: Symbol,
}

impl<'a> Parser<'a> {
    /// Creates a parser and primes the lookahead token.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        let span = lexer.token_span();
        Ok(Self {
            lexer,
            current,
            span,
            alias: Symbol::intern(""),
        })
    }

    /// Parses the whole program.
    pub fn parse(mut self) -> Result<Program> {
        let alias = self.parse_prolog()?;
        self.alias = alias;

        let mut decls = Vec::new();
        while !self.current.is_eof() {
            match self.current {
                Token::Pub => decls.push(Decl::Function(self.parse_fn_decl()?)),
                Token::Const => decls.push(Decl::Var(self.parse_var_decl(true)?)),
                Token::Var => decls.push(Decl::Var(self.parse_var_decl(false)?)),
                _ => {
                    return Err(self.syntax_error(format!(
                        "expected declaration, found {}",
                        self.current
                    )));
                },
            }
        }

        Ok(Program { alias, decls })
    }

    // =========================================================================
    // TOKEN PLUMBING
    // =========================================================================

    /// Moves the lookahead to the next token.
    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        self.span = self.lexer.token_span();
        Ok(())
    }

    /// Consumes `expected` or fails with a syntax error.
    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.current == expected {
            self.advance()
        } else {
            Err(self.syntax_error(format!(
                "expected {}, found {}",
                expected, self.current
            )))
        }
    }

    /// Consumes an identifier and returns its name.
    fn expect_ident(&mut self) -> Result<Symbol> {
        match self.current {
            Token::Ident(name) => {
                self.advance()?;
                Ok(name)
            },
            _ => Err(self.syntax_error(format!(
                "expected identifier, found {}",
                self.current
            ))),
        }
    }

    /// Consumes the token if it matches; returns whether it did.
    fn eat(&mut self, token: Token) -> Result<bool> {
        if self.current == token {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>) -> CompileError {
        CompileError::at(ErrorKind::Syntax, message, self.span)
    }

    pub(crate) fn current_token(&self) -> &Token {
        &self.current
    }

    pub(crate) fn current_span(&self) -> Span {
        self.span
    }

    pub(crate) fn import_alias(&self) -> Symbol {
        self.alias
    }

    pub(crate) fn step(&mut self) -> Result<()> {
        self.advance()
    }

    // =========================================================================
    // PROLOG
    // =========================================================================

    /// Parses the mandatory prolog
    /// `const ID = @import("ifj24.zig");` and returns the alias.
    fn parse_prolog(&mut self) -> Result<Symbol> {
        self.expect(Token::Const)?;
        let alias = self.expect_ident()?;
        self.expect(Token::Assign)?;
        self.expect(Token::Import)?;
        self.expect(Token::LParen)?;
        match self.current {
            Token::Str(path) if path.as_str() == "ifj24.zig" => self.advance()?,
            _ => {
                return Err(self.syntax_error(
                    "prolog must import exactly \"ifj24.zig\"",
                ));
            },
        }
        self.expect(Token::RParen)?;
        self.expect(Token::Semicolon)?;
        Ok(alias)
    }

    // =========================================================================
    // DECLARATIONS
    // =========================================================================

    /// Parses `pub fn NAME(params) [?] RETTYPE block`.
    fn parse_fn_decl(&mut self) -> Result<FnDecl> {
        let span = self.span;
        self.expect(Token::Pub)?;
        self.expect(Token::Fn)?;
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        let nullable = self.eat(Token::Question)?;
        let ret = self.parse_return_type()?;
        let body = self.parse_block()?;
        Ok(FnDecl {
            name,
            params,
            ret,
            nullable,
            body,
            span,
        })
    }

    /// Parses a comma-separated parameter list up to and including the
    /// closing parenthesis. A trailing comma is tolerated.
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        loop {
            if self.eat(Token::RParen)? {
                break;
            }
            let span = self.span;
            let name = self.expect_ident()?;
            self.expect(Token::Colon)?;
            let (ty, nullable) = self.parse_type()?;
            params.push(Param {
                name,
                ty,
                nullable,
                span,
            });
            if !self.eat(Token::Comma)? {
                self.expect(Token::RParen)?;
                break;
            }
        }
        Ok(params)
    }

    /// Parses a value type: `i32`, `f64`, `u8` or `[]u8`, with an
    /// optional leading `?`.
    fn parse_type(&mut self) -> Result<(DataType, bool)> {
        let nullable = self.eat(Token::Question)?;
        let ty = match self.current {
            Token::I32 => DataType::I32,
            Token::F64 => DataType::F64,
            Token::U8 => DataType::U8,
            Token::Slice => {
                self.advance()?;
                if self.current != Token::U8 {
                    return Err(self.syntax_error(format!(
                        "expected 'u8' after '[]', found {}",
                        self.current
                    )));
                }
                DataType::Slice
            },
            _ => {
                return Err(self.syntax_error(format!(
                    "expected type, found {}",
                    self.current
                )));
            },
        };
        self.advance()?;
        Ok((ty, nullable))
    }

    /// Parses a function return type; like [`Self::parse_type`] but
    /// also admits `void`. The `?` has already been consumed by the
    /// caller.
    fn parse_return_type(&mut self) -> Result<DataType> {
        if self.current == Token::Void {
            self.advance()?;
            return Ok(DataType::Void);
        }
        let (ty, nullable) = self.parse_type()?;
        if nullable {
            // `?` belongs before the whole return type and was parsed
            // by parse_fn_decl; a second one is not valid.
            return Err(self.syntax_error("unexpected '?' in return type"));
        }
        Ok(ty)
    }

    /// Parses `const|var NAME [: [?] TYPE] = expr ;`.
    ///
    /// The introducing keyword is still the current token.
    fn parse_var_decl(&mut self, is_const: bool) -> Result<VarDecl> {
        let span = self.span;
        self.advance()?; // const / var
        let name = self.expect_ident()?;

        let (declared, nullable) = if self.eat(Token::Colon)? {
            self.parse_type()?
        } else {
            (DataType::Unspecified, false)
        };

        self.expect(Token::Assign)?;
        let init = self.parse_expression()?;
        self.expect(Token::Semicolon)?;

        Ok(VarDecl {
            name,
            declared,
            nullable,
            is_const,
            init,
            span,
        })
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    /// Parses `{ statement* }`.
    fn parse_block(&mut self) -> Result<Block> {
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.eat(Token::RBrace)? {
            if self.current.is_eof() {
                return Err(self.syntax_error("unexpected end of input in block"));
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(Block { stmts })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.current {
            Token::If => self.parse_if().map(Stmt::If),
            Token::While => self.parse_while().map(Stmt::While),
            Token::Const => self.parse_var_decl(true).map(Stmt::Decl),
            Token::Var => self.parse_var_decl(false).map(Stmt::Decl),
            Token::Return => self.parse_return().map(Stmt::Return),
            Token::Ident(name) => self.parse_ident_statement(name),
            Token::Underscore => {
                let span = self.span;
                self.advance()?;
                self.expect(Token::Assign)?;
                let value = self.parse_expression()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Assign(AssignStmt {
                    target: AssignTarget::Discard,
                    value,
                    span,
                }))
            },
            _ => Err(self.syntax_error(format!(
                "expected statement, found {}",
                self.current
            ))),
        }
    }

    /// Parses `if (expr) [|name|] block [else block]`.
    fn parse_if(&mut self) -> Result<IfStmt> {
        let span = self.span;
        self.advance()?; // if
        self.expect(Token::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let bind = self.parse_element_bind()?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(Token::Else)? {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(IfStmt {
            cond,
            bind,
            then_block,
            else_block,
            span,
        })
    }

    /// Parses `while (expr) [|name|] block`.
    fn parse_while(&mut self) -> Result<WhileStmt> {
        let span = self.span;
        self.advance()?; // while
        self.expect(Token::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let bind = self.parse_element_bind()?;
        let body = self.parse_block()?;
        Ok(WhileStmt {
            cond,
            bind,
            body,
            span,
        })
    }

    /// Parses the optional `|name|` element-bind.
    fn parse_element_bind(&mut self) -> Result<Option<Symbol>> {
        if !self.eat(Token::Pipe)? {
            return Ok(None);
        }
        let name = self.expect_ident()?;
        self.expect(Token::Pipe)?;
        Ok(Some(name))
    }

    /// Parses `return [expr] ;`.
    fn parse_return(&mut self) -> Result<ReturnStmt> {
        let span = self.span;
        self.advance()?; // return
        let value = if self.current == Token::Semicolon {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semicolon)?;
        Ok(ReturnStmt { value, span })
    }

    /// Parses an identifier-led statement: assignment, user call, or
    /// builtin call through the import alias.
    fn parse_ident_statement(&mut self, name: Symbol) -> Result<Stmt> {
        let span = self.span;
        self.advance()?; // identifier
        match self.current {
            Token::Assign => {
                self.advance()?;
                let value = self.parse_expression()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Assign(AssignStmt {
                    target: AssignTarget::Name(name),
                    value,
                    span,
                }))
            },
            Token::LParen => {
                let call = self.parse_call_args(name, false, span)?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Call(call))
            },
            Token::Dot => {
                let call = self.parse_qualified_call(name, span)?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Call(call))
            },
            _ => Err(self.syntax_error(format!(
                "expected '=', '(' or '.', found {}",
                self.current
            ))),
        }
    }

    /// Parses `.METHOD(args)` after the import alias.
    ///
    /// The stored callee name is canonicalized to `ifj.METHOD` so the
    /// later phases match a single spelling whatever the alias is.
    pub(crate) fn parse_qualified_call(
        &mut self,
        qualifier: Symbol,
        span: Span,
    ) -> Result<CallExpr> {
        if qualifier != self.import_alias() {
            return Err(self.syntax_error(format!(
                "'{}' is not the import alias; only '{}.*' calls are valid",
                qualifier,
                self.import_alias()
            )));
        }
        self.advance()?; // '.'
        let method = self.expect_ident()?;
        let name = Symbol::intern(&format!("ifj.{}", method));
        self.parse_call_args(name, true, span)
    }

    /// Parses `(arg, ...)`; the current token is the open parenthesis.
    pub(crate) fn parse_call_args(
        &mut self,
        name: Symbol,
        builtin: bool,
        span: Span,
    ) -> Result<CallExpr> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.eat(Token::RParen)? {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(Token::Comma)? {
                    self.expect(Token::RParen)?;
                    break;
                }
            }
        }
        Ok(CallExpr {
            name,
            builtin,
            args,
            span,
        })
    }
}
