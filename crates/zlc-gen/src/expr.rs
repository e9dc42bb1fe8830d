//! Expression emission.
//!
//! Expressions are evaluated depth-first onto the interpreter's data
//! stack: left operand, right operand, then the operator's stack
//! instruction. Builtin calls lower to dedicated sequences; user
//! calls push their arguments in reverse index order and `CALL`.

use zlc_par::ast::*;

use crate::instr::{escape_string, hex_float};
use crate::Generator;
use zlc_util::Result;

impl<'ast> Generator<'ast> {
    /// Evaluates an expression onto the data stack.
    ///
    /// Calls to `ifj.write` and to void user functions push nothing.
    pub(crate) fn gen_expr(&mut self, expr: &'ast Expr) -> Result<()> {
        match expr {
            Expr::Int(value, _) => {
                self.emit(format!("PUSHS int@{}", value));
                Ok(())
            },
            Expr::Float(value, _) => {
                self.emit(format!("PUSHS float@{}", hex_float(*value)));
                Ok(())
            },
            Expr::Str(value, _) => {
                self.emit(format!("PUSHS string@{}", escape_string(value.as_str())));
                Ok(())
            },
            Expr::Null(_) => {
                self.emit("PUSHS nil@nil");
                Ok(())
            },
            Expr::Ident(name, _) => {
                let source = self.var_ref(*name);
                self.emit(format!("PUSHS {}", source));
                Ok(())
            },
            Expr::Binary(binary) => self.gen_binary(binary),
            Expr::Call(call) => self.gen_call(call),
        }
    }

    fn gen_binary(&mut self, binary: &'ast BinaryExpr) -> Result<()> {
        if binary.op == BinOp::Div {
            return self.gen_division(binary);
        }

        self.gen_expr(&binary.lhs)?;
        self.gen_expr(&binary.rhs)?;
        match binary.op {
            BinOp::Add => self.emit("ADDS"),
            BinOp::Sub => self.emit("SUBS"),
            BinOp::Mul => self.emit("MULS"),
            BinOp::Lt => self.emit("LTS"),
            BinOp::Gt => self.emit("GTS"),
            BinOp::LtEq => {
                self.emit("GTS");
                self.emit("NOTS");
            },
            BinOp::GtEq => {
                self.emit("LTS");
                self.emit("NOTS");
            },
            BinOp::Eq => self.emit("EQS"),
            BinOp::NotEq => {
                self.emit("EQS");
                self.emit("NOTS");
            },
            BinOp::Div => {},
        }
        Ok(())
    }

    /// Division with runtime operand typing.
    ///
    /// Each operand's dynamic type is inspected with `TYPE`; an int
    /// operand next to a float one is promoted with `INT2FLOATS`
    /// before `DIVS`, and the quotient is converted back with
    /// `FLOAT2INTS` only when both operands were ints.
    fn gen_division(&mut self, binary: &'ast BinaryExpr) -> Result<()> {
        self.gen_expr(&binary.lhs)?;
        self.gen_expr(&binary.rhs)?;

        let id = self.next_id();
        let rhs = self.fresh("div_rhs");
        let rhs_type = self.fresh("div_rhs_type");
        let lhs = self.fresh("div_lhs");
        let lhs_type = self.fresh("div_lhs_type");

        self.emit(format!("POPS LF@{}", rhs));
        self.emit(format!("TYPE LF@{} LF@{}", rhs_type, rhs));
        self.emit(format!("POPS LF@{}", lhs));
        self.emit(format!("TYPE LF@{} LF@{}", lhs_type, lhs));

        self.emit(format!("PUSHS LF@{}", lhs));
        self.emit(format!(
            "JUMPIFEQ div_lhs_float_{} LF@{} string@float",
            id, lhs_type
        ));
        self.emit("INT2FLOATS");
        self.emit(format!("LABEL div_lhs_float_{}", id));

        self.emit(format!("PUSHS LF@{}", rhs));
        self.emit(format!(
            "JUMPIFEQ div_rhs_float_{} LF@{} string@float",
            id, rhs_type
        ));
        self.emit("INT2FLOATS");
        self.emit(format!("LABEL div_rhs_float_{}", id));

        self.emit("DIVS");

        self.emit(format!(
            "JUMPIFEQ div_keep_float_{} LF@{} string@float",
            id, lhs_type
        ));
        self.emit(format!(
            "JUMPIFEQ div_keep_float_{} LF@{} string@float",
            id, rhs_type
        ));
        self.emit("FLOAT2INTS");
        self.emit(format!("LABEL div_keep_float_{}", id));
        Ok(())
    }

    /// Emits a call, builtin or user-defined.
    pub(crate) fn gen_call(&mut self, call: &'ast CallExpr) -> Result<()> {
        if !call.builtin {
            // Arguments go on the stack last-index first, so the
            // callee pops them in declaration order.
            for arg in call.args.iter().rev() {
                self.gen_expr(arg)?;
            }
            self.emit(format!("CALL {}", call.name));
            return Ok(());
        }

        match call.name.as_str() {
            "ifj.write" => self.gen_write(call),
            "ifj.readstr" => self.gen_read(call, "string"),
            "ifj.readi32" => self.gen_read(call, "int"),
            "ifj.readf64" => self.gen_read(call, "float"),
            "ifj.i2f" => {
                self.gen_arg(call, 0)?;
                self.emit("INT2FLOATS");
                Ok(())
            },
            "ifj.f2i" => {
                self.gen_arg(call, 0)?;
                self.emit("FLOAT2INTS");
                Ok(())
            },
            "ifj.string" => self.gen_arg(call, 0),
            "ifj.length" => self.gen_length(call),
            "ifj.concat" => self.gen_concat(call),
            "ifj.substring" => self.gen_substring(call),
            "ifj.strcmp" => self.gen_strcmp(call),
            "ifj.ord" => self.gen_ord(call),
            "ifj.chr" => self.gen_chr(call),
            other => Err(Self::internal_error(format!(
                "unknown builtin '{}' reached the generator",
                other
            ))),
        }
    }

    fn gen_arg(&mut self, call: &'ast CallExpr, index: usize) -> Result<()> {
        match call.args.get(index) {
            Some(arg) => self.gen_expr(arg),
            None => Err(Self::internal_error(format!(
                "builtin '{}' is missing argument {}",
                call.name, index
            ))),
        }
    }

    /// `ifj.write(x)`: literals and identifiers are written directly;
    /// computed values go through a temporary.
    fn gen_write(&mut self, call: &'ast CallExpr) -> Result<()> {
        let Some(arg) = call.args.first() else {
            return Err(Self::internal_error("ifj.write without argument"));
        };
        match arg {
            Expr::Int(value, _) => self.emit(format!("WRITE int@{}", value)),
            Expr::Float(value, _) => self.emit(format!("WRITE float@{}", hex_float(*value))),
            Expr::Str(value, _) => {
                self.emit(format!("WRITE string@{}", escape_string(value.as_str())));
            },
            Expr::Null(_) => self.emit("WRITE nil@nil"),
            Expr::Ident(name, _) => {
                let source = self.var_ref(*name);
                self.emit(format!("WRITE {}", source));
            },
            _ => {
                self.gen_expr(arg)?;
                let tmp = self.fresh("write");
                self.emit(format!("POPS LF@{}", tmp));
                self.emit(format!("WRITE LF@{}", tmp));
            },
        }
        Ok(())
    }

    /// `ifj.read*()` in expression context: read into a temporary and
    /// push it. (Reads directly into a declaration or assignment
    /// target are handled by the store fast path.)
    fn gen_read(&mut self, _call: &'ast CallExpr, ty: &str) -> Result<()> {
        let tmp = self.fresh("read");
        self.emit(format!("READ LF@{} {}", tmp, ty));
        self.emit(format!("PUSHS LF@{}", tmp));
        Ok(())
    }

    fn gen_length(&mut self, call: &'ast CallExpr) -> Result<()> {
        let result = self.fresh("length");
        if let Some(Expr::Ident(name, _)) = call.args.first() {
            let source = self.var_ref(*name);
            self.emit(format!("STRLEN LF@{} {}", result, source));
        } else {
            self.gen_arg(call, 0)?;
            let input = self.fresh("length_in");
            self.emit(format!("POPS LF@{}", input));
            self.emit(format!("STRLEN LF@{} LF@{}", result, input));
        }
        self.emit(format!("PUSHS LF@{}", result));
        Ok(())
    }

    fn gen_concat(&mut self, call: &'ast CallExpr) -> Result<()> {
        self.gen_arg(call, 0)?;
        self.gen_arg(call, 1)?;
        let right = self.fresh("concat_b");
        let left = self.fresh("concat_a");
        let result = self.fresh("concat");
        self.emit(format!("POPS LF@{}", right));
        self.emit(format!("POPS LF@{}", left));
        self.emit(format!("CONCAT LF@{} LF@{} LF@{}", result, left, right));
        self.emit(format!("PUSHS LF@{}", result));
        Ok(())
    }

    /// `ifj.substring(s, i, j)`: appends `GETCHAR`ed bytes from `i`
    /// up to `j` (exclusive) onto an empty accumulator.
    fn gen_substring(&mut self, call: &'ast CallExpr) -> Result<()> {
        self.gen_arg(call, 0)?;
        self.gen_arg(call, 1)?;
        self.gen_arg(call, 2)?;

        let id = self.next_id();
        let high = self.fresh("sub_j");
        let index = self.fresh("sub_i");
        let source = self.fresh("sub_s");
        let ch = self.fresh("sub_char");
        let result = self.fresh("sub_result");

        self.emit(format!("POPS LF@{}", high));
        self.emit(format!("POPS LF@{}", index));
        self.emit(format!("POPS LF@{}", source));
        self.emit(format!("MOVE LF@{} string@", result));

        self.emit(format!("LABEL substring_loop_start_{}", id));
        self.emit(format!("PUSHS LF@{}", index));
        self.emit(format!("PUSHS LF@{}", high));
        self.emit("LTS");
        self.emit("PUSHS bool@false");
        self.emit(format!("JUMPIFEQS substring_loop_end_{}", id));
        self.emit(format!("GETCHAR LF@{} LF@{} LF@{}", ch, source, index));
        self.emit(format!("CONCAT LF@{} LF@{} LF@{}", result, result, ch));
        self.emit(format!("ADD LF@{} LF@{} int@1", index, index));
        self.emit(format!("JUMP substring_loop_start_{}", id));
        self.emit(format!("LABEL substring_loop_end_{}", id));

        self.emit(format!("PUSHS LF@{}", result));
        Ok(())
    }

    /// `ifj.strcmp(a, b)`: -1 / 0 / 1 through a branch ladder.
    fn gen_strcmp(&mut self, call: &'ast CallExpr) -> Result<()> {
        self.gen_arg(call, 0)?;
        self.gen_arg(call, 1)?;

        let id = self.next_id();
        let right = self.fresh("cmp_b");
        let left = self.fresh("cmp_a");
        let less = self.fresh("cmp_lt");
        let result = self.fresh("cmp_result");

        self.emit(format!("POPS LF@{}", right));
        self.emit(format!("POPS LF@{}", left));
        self.emit(format!("PUSHS LF@{}", left));
        self.emit(format!("PUSHS LF@{}", right));
        self.emit(format!("JUMPIFEQS strcmp_equal_{}", id));
        self.emit(format!("LT LF@{} LF@{} LF@{}", less, left, right));
        self.emit(format!("PUSHS LF@{}", less));
        self.emit("PUSHS bool@true");
        self.emit(format!("JUMPIFNEQS strcmp_greater_{}", id));
        self.emit(format!("MOVE LF@{} int@-1", result));
        self.emit(format!("JUMP strcmp_end_{}", id));
        self.emit(format!("LABEL strcmp_equal_{}", id));
        self.emit(format!("MOVE LF@{} int@0", result));
        self.emit(format!("JUMP strcmp_end_{}", id));
        self.emit(format!("LABEL strcmp_greater_{}", id));
        self.emit(format!("MOVE LF@{} int@1", result));
        self.emit(format!("LABEL strcmp_end_{}", id));
        self.emit(format!("PUSHS LF@{}", result));
        Ok(())
    }

    fn gen_ord(&mut self, call: &'ast CallExpr) -> Result<()> {
        self.gen_arg(call, 0)?;
        self.gen_arg(call, 1)?;
        let index = self.fresh("ord_i");
        let source = self.fresh("ord_s");
        let result = self.fresh("ord");
        self.emit(format!("POPS LF@{}", index));
        self.emit(format!("POPS LF@{}", source));
        self.emit(format!("STRI2INT LF@{} LF@{} LF@{}", result, source, index));
        self.emit(format!("PUSHS LF@{}", result));
        Ok(())
    }

    fn gen_chr(&mut self, call: &'ast CallExpr) -> Result<()> {
        self.gen_arg(call, 0)?;
        let value = self.fresh("chr_n");
        let result = self.fresh("chr");
        self.emit(format!("POPS LF@{}", value));
        self.emit(format!("INT2CHAR LF@{} LF@{}", result, value));
        self.emit(format!("PUSHS LF@{}", result));
        Ok(())
    }
}
