//! Expression parsing (shunting yard).
//!
//! Expressions are parsed with an operator-precedence algorithm over
//! two stacks kept separately typed: a scalar operator stack and an
//! AST operand stack. Incoming operands are pushed; an incoming
//! operator first reduces every stacked operator of greater or equal
//! precedence (all operators are left-associative), then pushes
//! itself. A closing parenthesis reduces to its matching sentinel.
//!
//! Precedence (high to low): `* /`, `+ -`, `< <= > >=`, `== !=`.
//!
//! An expression ends at `;` or `,`, or at a `)` that would close a
//! parenthesis the expression did not open (the caller consumes it).

use zlc_lex::Token;
use zlc_util::{Result, Span};

use crate::ast::{BinOp, BinaryExpr, Expr};
use crate::Parser;

/// Operator-stack entry: an operator or an open-parenthesis sentinel.
#[derive(Debug, Clone, Copy)]
enum StackOp {
    Op(BinOp, Span),
    Paren(Span),
}

fn binop_of(token: &Token) -> Option<BinOp> {
    match token {
        Token::Plus => Some(BinOp::Add),
        Token::Minus => Some(BinOp::Sub),
        Token::Star => Some(BinOp::Mul),
        Token::Slash => Some(BinOp::Div),
        Token::Lt => Some(BinOp::Lt),
        Token::LtEq => Some(BinOp::LtEq),
        Token::Gt => Some(BinOp::Gt),
        Token::GtEq => Some(BinOp::GtEq),
        Token::Eq => Some(BinOp::Eq),
        Token::NotEq => Some(BinOp::NotEq),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// Parses one expression, leaving the terminator in the stream.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr> {
        let mut operators: Vec<StackOp> = Vec::new();
        let mut operands: Vec<Expr> = Vec::new();

        // Number of open parentheses this expression owns.
        let mut depth: usize = 0;

        // True when the next token must be an operand.
        let mut expect_operand = true;

        loop {
            let token = *self.current_token();
            match token {
                Token::Semicolon | Token::Comma => break,

                Token::RParen => {
                    if depth == 0 {
                        break;
                    }
                    if expect_operand {
                        return Err(self.syntax_error("expected expression before ')'"));
                    }
                    Self::reduce_to_paren(&mut operators, &mut operands)
                        .map_err(|msg| self.syntax_error(msg))?;
                    depth -= 1;
                    self.step()?;
                },

                Token::LParen if expect_operand => {
                    operators.push(StackOp::Paren(self.current_span()));
                    depth += 1;
                    self.step()?;
                },

                _ => {
                    if let Some(op) = binop_of(&token) {
                        if expect_operand {
                            return Err(self.syntax_error(format!(
                                "expected expression, found {}",
                                token
                            )));
                        }
                        let span = self.current_span();
                        while let Some(StackOp::Op(top, top_span)) =
                            operators.last().copied()
                        {
                            if top.precedence() >= op.precedence() {
                                operators.pop();
                                Self::reduce(top, top_span, &mut operands)
                                    .map_err(|msg| self.syntax_error(msg))?;
                            } else {
                                break;
                            }
                        }
                        operators.push(StackOp::Op(op, span));
                        expect_operand = true;
                        self.step()?;
                    } else if expect_operand {
                        operands.push(self.parse_operand()?);
                        expect_operand = false;
                    } else {
                        return Err(self.syntax_error(format!(
                            "expected operator or end of expression, found {}",
                            token
                        )));
                    }
                },
            }
        }

        if expect_operand {
            return Err(self.syntax_error("expected expression"));
        }

        while let Some(entry) = operators.pop() {
            match entry {
                StackOp::Op(op, span) => {
                    Self::reduce(op, span, &mut operands)
                        .map_err(|msg| self.syntax_error(msg))?;
                },
                StackOp::Paren(_) => {
                    return Err(self.syntax_error("unmatched '(' in expression"));
                },
            }
        }

        match (operands.pop(), operands.is_empty()) {
            (Some(expr), true) => Ok(expr),
            _ => Err(self.syntax_error("malformed expression")),
        }
    }

    /// Parses a single operand: literal, `null`, identifier, call,
    /// or builtin call through the import alias. Parenthesized
    /// sub-expressions are handled by the main loop.
    fn parse_operand(&mut self) -> Result<Expr> {
        let span = self.current_span();
        let token = *self.current_token();
        match token {
            Token::Int(value) => {
                self.step()?;
                Ok(Expr::Int(value, span))
            },
            Token::Float(value) => {
                self.step()?;
                Ok(Expr::Float(value, span))
            },
            Token::Str(value) => {
                self.step()?;
                Ok(Expr::Str(value, span))
            },
            Token::Null => {
                self.step()?;
                Ok(Expr::Null(span))
            },
            Token::Ident(name) => {
                self.step()?;
                match self.current_token() {
                    Token::LParen => {
                        let call = self.parse_call_args(name, false, span)?;
                        Ok(Expr::Call(call))
                    },
                    Token::Dot => {
                        let call = self.parse_qualified_call(name, span)?;
                        Ok(Expr::Call(call))
                    },
                    _ => Ok(Expr::Ident(name, span)),
                }
            },
            _ => Err(self.syntax_error(format!(
                "expected expression, found {}",
                token
            ))),
        }
    }

    /// Pops two operands and builds a binary node.
    fn reduce(op: BinOp, span: Span, operands: &mut Vec<Expr>) -> std::result::Result<(), String> {
        let rhs = operands.pop().ok_or("operator is missing its operand")?;
        let lhs = operands.pop().ok_or("operator is missing its operand")?;
        let span = lhs.span().to(rhs.span()).to(span);
        operands.push(Expr::Binary(BinaryExpr {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }));
        Ok(())
    }

    /// Reduces until the nearest parenthesis sentinel, popping it.
    fn reduce_to_paren(
        operators: &mut Vec<StackOp>,
        operands: &mut Vec<Expr>,
    ) -> std::result::Result<(), String> {
        loop {
            match operators.pop() {
                Some(StackOp::Op(op, span)) => Self::reduce(op, span, operands)?,
                Some(StackOp::Paren(_)) => return Ok(()),
                None => return Err("unmatched ')' in expression".to_string()),
            }
        }
    }
}
