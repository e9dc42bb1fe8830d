//! zlc-gen - IFJcode24 generator.
//!
//! Walks an analyzed AST and emits the textual stack-machine code the
//! accompanying interpreter consumes. Generation only runs after
//! semantic analysis succeeded, so the walker treats rule violations
//! as internal errors.
//!
//! Layout of one function:
//!
//! ```text
//! LABEL name
//! CREATEFRAME
//! PUSHFRAME
//! DEFVAR LF@...        ; every local, hoisted
//! POPS LF@param_0      ; parameters, in declaration order
//! ...body...
//! POPFRAME
//! RETURN               ; EXIT int@0 in main
//! ```
//!
//! Every local name a function will ever touch (user locals, element
//! binds, temporaries) is recorded while the body is emitted into a
//! side buffer, then defined up front when the function is assembled.
//! No `DEFVAR` ever appears inside a loop, so re-entering a loop
//! never re-defines a name.
//!
//! `return` leaves the function where it stands: value push (if any),
//! then `POPFRAME` and `RETURN` (`EXIT int@0` in `main`).

mod expr;
pub mod instr;


use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use zlc_par::ast::*;
use zlc_util::{CompileError, ErrorKind, Result, Symbol};

use crate::instr::{escape_string, hex_float};

/// Generates IFJcode24 for a whole program.
pub fn generate(program: &Program) -> Result<String> {
    Generator::new(program).run()
}

/// The generator.
pub struct Generator<'ast> {
    program: &'ast Program,

    /// Names living in the global frame (`GF@`).
    globals: FxHashSet<Symbol>,

    /// Finished output.
    out: String,

    /// Body of the function currently being emitted.
    body: String,

    /// Local names to define when the current function is assembled,
    /// in first-touch order.
    locals: IndexSet<String>,

    /// Declared types of locals, used to coerce stored literals.
    local_types: IndexMap<String, DataType>,

    /// Source of unique suffixes for temporaries and labels.
    counter: u32,
}

impl<'ast> Generator<'ast> {
    pub fn new(program: &'ast Program) -> Self {
        let globals = program
            .decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Var(var) => Some(var.name),
                Decl::Function(_) => None,
            })
            .collect();
        Self {
            program,
            globals,
            out: String::new(),
            body: String::new(),
            locals: IndexSet::new(),
            local_types: IndexMap::new(),
            counter: 0,
        }
    }

    /// Emits the whole program.
    pub fn run(mut self) -> Result<String> {
        self.out.push_str(".IFJcode24\n");
        self.emit_global_section()?;
        self.out.push_str("JUMP main\n\n");

        let program = self.program;
        for decl in &program.decls {
            if let Decl::Function(func) = decl {
                self.gen_function(func)?;
            }
        }
        Ok(self.out)
    }

    /// Defines and initializes top-level variables before `JUMP main`.
    ///
    /// Literal initializers become direct `MOVE`s; anything else is
    /// evaluated inside a scratch frame so temporaries have a home.
    fn emit_global_section(&mut self) -> Result<()> {
        let program = self.program;
        let global_decls: Vec<&VarDecl> = program
            .decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Var(var) => Some(var),
                Decl::Function(_) => None,
            })
            .collect();
        if global_decls.is_empty() {
            return Ok(());
        }

        for decl in &global_decls {
            self.out.push_str(&format!("DEFVAR GF@{}\n", decl.name));
        }

        let mut complex = Vec::new();
        for decl in &global_decls {
            let target = format!("GF@{}", decl.name);
            match Self::literal_operand_typed(&decl.init, decl.declared) {
                Some(operand) => {
                    self.out.push_str(&format!("MOVE {} {}\n", target, operand));
                },
                None => complex.push(*decl),
            }
        }

        if !complex.is_empty() {
            self.body.clear();
            self.locals.clear();
            for decl in complex {
                self.gen_store(&format!("GF@{}", decl.name), &decl.init, decl.declared)?;
            }
            self.out.push_str("CREATEFRAME\nPUSHFRAME\n");
            let locals = std::mem::take(&mut self.locals);
            for name in &locals {
                self.out.push_str(&format!("DEFVAR LF@{}\n", name));
            }
            let body = std::mem::take(&mut self.body);
            self.out.push_str(&body);
            self.out.push_str("POPFRAME\n");
        }
        Ok(())
    }

    /// Emits one function.
    fn gen_function(&mut self, func: &'ast FnDecl) -> Result<()> {
        self.body.clear();
        self.locals.clear();
        self.local_types.clear();
        let is_main = func.name.as_str() == "main";

        // Parameters: arguments were pushed in reverse index order at
        // the call site, so forward-order pops receive them correctly.
        for param in &func.params {
            self.define_local(param.name.as_str());
            self.local_types
                .insert(param.name.as_str().to_string(), param.ty);
            self.emit(format!("POPS LF@{}", param.name));
        }

        self.gen_block(&func.body, is_main)?;

        self.out.push_str(&format!("LABEL {}\n", func.name));
        self.out.push_str("CREATEFRAME\nPUSHFRAME\n");
        let locals = std::mem::take(&mut self.locals);
        for name in &locals {
            self.out.push_str(&format!("DEFVAR LF@{}\n", name));
        }
        let body = std::mem::take(&mut self.body);
        self.out.push_str(&body);
        if is_main {
            self.out.push_str("POPFRAME\nEXIT int@0\n");
        } else {
            self.out.push_str("POPFRAME\nRETURN\n");
        }
        self.out.push('\n');
        Ok(())
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn gen_block(&mut self, block: &'ast Block, is_main: bool) -> Result<()> {
        for stmt in &block.stmts {
            self.gen_stmt(stmt, is_main)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &'ast Stmt, is_main: bool) -> Result<()> {
        match stmt {
            Stmt::Decl(decl) => {
                self.define_local(decl.name.as_str());
                if decl.declared != DataType::Unspecified {
                    self.local_types
                        .insert(decl.name.as_str().to_string(), decl.declared);
                }
                let target = self.var_ref(decl.name);
                self.gen_store(&target, &decl.init, decl.declared)
            },
            Stmt::Assign(assign) => self.gen_assign(assign),
            Stmt::If(if_stmt) => self.gen_if(if_stmt, is_main),
            Stmt::While(while_stmt) => self.gen_while(while_stmt, is_main),
            Stmt::Return(ret) => self.gen_return(ret, is_main),
            Stmt::Call(call) => self.gen_call(call),
        }
    }

    fn gen_assign(&mut self, assign: &'ast AssignStmt) -> Result<()> {
        match assign.target {
            AssignTarget::Discard => {
                self.gen_expr(&assign.value)?;
                if self.pushes_value(&assign.value) {
                    let sink = self.fresh("discard");
                    self.emit(format!("POPS LF@{}", sink));
                }
                Ok(())
            },
            AssignTarget::Name(name) => {
                let declared = self
                    .local_types
                    .get(name.as_str())
                    .copied()
                    .unwrap_or(DataType::Unspecified);
                let target = self.var_ref(name);
                self.gen_store(&target, &assign.value, declared)
            },
        }
    }

    /// Stores the value of `expr` into `target`.
    ///
    /// Literals and the read builtins skip the stack; everything else
    /// is evaluated and popped. `declared` coerces numeric literals
    /// stored into a slot of the other numeric type.
    fn gen_store(&mut self, target: &str, expr: &'ast Expr, declared: DataType) -> Result<()> {
        if let Some(operand) = Self::literal_operand_typed(expr, declared) {
            self.emit(format!("MOVE {} {}", target, operand));
            return Ok(());
        }

        if let Expr::Call(call) = expr {
            if call.builtin {
                match call.name.as_str() {
                    "ifj.readstr" => {
                        self.emit(format!("READ {} string", target));
                        return Ok(());
                    },
                    "ifj.readi32" => {
                        self.emit(format!("READ {} int", target));
                        return Ok(());
                    },
                    "ifj.readf64" => {
                        self.emit(format!("READ {} float", target));
                        return Ok(());
                    },
                    "ifj.string" => {
                        if let Some(Expr::Str(value, _)) = call.args.first() {
                            self.emit(format!(
                                "MOVE {} string@{}",
                                target,
                                escape_string(value.as_str())
                            ));
                            return Ok(());
                        }
                    },
                    "ifj.length" => {
                        if let Some(Expr::Ident(name, _)) = call.args.first() {
                            let source = self.var_ref(*name);
                            self.emit(format!("STRLEN {} {}", target, source));
                            return Ok(());
                        }
                    },
                    "ifj.concat" => {
                        if let (Some(Expr::Ident(a, _)), Some(Expr::Ident(b, _))) =
                            (call.args.first(), call.args.get(1))
                        {
                            let left = self.var_ref(*a);
                            let right = self.var_ref(*b);
                            self.emit(format!("CONCAT {} {} {}", target, left, right));
                            return Ok(());
                        }
                    },
                    _ => {},
                }
            }
        }

        self.gen_expr(expr)?;
        self.emit(format!("POPS {}", target));
        Ok(())
    }

    fn gen_if(&mut self, if_stmt: &'ast IfStmt, is_main: bool) -> Result<()> {
        let id = self.next_id();
        let else_label = format!("else_block_{}", id);
        let end_label = format!("end_block_{}", id);

        self.gen_condition(&if_stmt.cond, if_stmt.bind, &else_label)?;
        self.gen_block(&if_stmt.then_block, is_main)?;
        self.emit(format!("JUMP {}", end_label));
        self.emit(format!("LABEL {}", else_label));
        if let Some(else_block) = &if_stmt.else_block {
            self.gen_block(else_block, is_main)?;
        }
        self.emit(format!("LABEL {}", end_label));
        Ok(())
    }

    fn gen_while(&mut self, while_stmt: &'ast WhileStmt, is_main: bool) -> Result<()> {
        let id = self.next_id();
        let start_label = format!("while_start_{}", id);
        let end_label = format!("while_end_{}", id);

        self.emit(format!("LABEL {}", start_label));
        self.gen_condition(&while_stmt.cond, while_stmt.bind, &end_label)?;
        self.gen_block(&while_stmt.body, is_main)?;
        self.emit(format!("JUMP {}", start_label));
        self.emit(format!("LABEL {}", end_label));
        Ok(())
    }

    /// Evaluates a condition and jumps to `exit_label` when it fails.
    ///
    /// A literal or identifier condition is compared against `nil@nil`
    /// (null means exit); any computed condition is compared against
    /// `bool@false`. With an element-bind the condition value is
    /// parked in a temporary so the binding can be `MOVE`d from it,
    /// whatever shape the condition expression has.
    fn gen_condition(
        &mut self,
        cond: &'ast Expr,
        bind: Option<Symbol>,
        exit_label: &str,
    ) -> Result<()> {
        match bind {
            Some(bind_name) => {
                self.define_local(bind_name.as_str());
                let tmp = self.fresh("cond");
                self.gen_expr(cond)?;
                self.emit(format!("POPS LF@{}", tmp));
                self.emit(format!("PUSHS LF@{}", tmp));
                self.emit("PUSHS nil@nil");
                self.emit(format!("JUMPIFEQS {}", exit_label));
                self.emit(format!("MOVE LF@{} LF@{}", bind_name, tmp));
            },
            None => {
                self.gen_expr(cond)?;
                match cond {
                    Expr::Ident(..)
                    | Expr::Int(..)
                    | Expr::Float(..)
                    | Expr::Str(..)
                    | Expr::Null(..) => {
                        self.emit("PUSHS nil@nil");
                    },
                    _ => {
                        self.emit("PUSHS bool@false");
                    },
                }
                self.emit(format!("JUMPIFEQS {}", exit_label));
            },
        }
        Ok(())
    }

    fn gen_return(&mut self, ret: &'ast ReturnStmt, is_main: bool) -> Result<()> {
        if let Some(value) = &ret.value {
            if let Expr::Ident(name, _) = value {
                let source = self.var_ref(*name);
                self.emit(format!("PUSHS {}", source));
            } else {
                self.gen_expr(value)?;
            }
        }
        self.emit("POPFRAME");
        if is_main {
            self.emit("EXIT int@0");
        } else {
            self.emit("RETURN");
        }
        Ok(())
    }

    // =========================================================================
    // SHARED HELPERS
    // =========================================================================

    /// Records a name for hoisted definition.
    pub(crate) fn define_local(&mut self, name: &str) {
        self.locals.insert(name.to_string());
    }

    /// Returns a fresh temporary name with the given stem, already
    /// recorded for definition.
    pub(crate) fn fresh(&mut self, stem: &str) -> String {
        let name = format!("tmp_{}_{}", stem, self.counter);
        self.counter += 1;
        self.locals.insert(name.clone());
        name
    }

    /// Allocates a unique label/temporary suffix.
    pub(crate) fn next_id(&mut self) -> u32 {
        let id = self.counter;
        self.counter += 1;
        id
    }

    /// Frame-qualified reference to a variable.
    ///
    /// A name defined anywhere in the current function shadows a
    /// global of the same name; function locals share one flat frame.
    pub(crate) fn var_ref(&self, name: Symbol) -> String {
        if self.locals.contains(name.as_str()) {
            format!("LF@{}", name)
        } else if self.globals.contains(&name) {
            format!("GF@{}", name)
        } else {
            format!("LF@{}", name)
        }
    }

    /// Appends one instruction line to the current body buffer.
    pub(crate) fn emit(&mut self, line: impl AsRef<str>) {
        self.body.push_str(line.as_ref());
        self.body.push('\n');
    }

    /// Renders a literal expression as an operand, coercing numeric
    /// literals to the declared slot type. Returns None for
    /// non-literal expressions.
    fn literal_operand_typed(expr: &Expr, declared: DataType) -> Option<String> {
        match expr {
            Expr::Int(value, _) => {
                if declared == DataType::F64 {
                    Some(format!("float@{}", hex_float(*value as f64)))
                } else {
                    Some(format!("int@{}", value))
                }
            },
            Expr::Float(value, _) => {
                if declared == DataType::I32 {
                    Some(format!("int@{}", *value as i64))
                } else {
                    Some(format!("float@{}", hex_float(*value)))
                }
            },
            Expr::Str(value, _) => Some(format!("string@{}", escape_string(value.as_str()))),
            Expr::Null(_) => Some("nil@nil".to_string()),
            _ => None,
        }
    }

    /// Whether evaluating the expression leaves a value on the data
    /// stack. Calls to `ifj.write` and to void user functions do not.
    fn pushes_value(&self, expr: &Expr) -> bool {
        let Expr::Call(call) = expr else {
            return true;
        };
        if call.builtin {
            return call.name.as_str() != "ifj.write";
        }
        match self.fn_return_type(call.name) {
            Some(ret) => ret != DataType::Void,
            None => true,
        }
    }

    /// Declared return type of a user function.
    fn fn_return_type(&self, name: Symbol) -> Option<DataType> {
        self.program.decls.iter().find_map(|decl| match decl {
            Decl::Function(func) if func.name == name => Some(func.ret),
            _ => None,
        })
    }

    pub(crate) fn internal_error(message: impl Into<String>) -> CompileError {
        CompileError::new(ErrorKind::Internal, message)
    }
}
