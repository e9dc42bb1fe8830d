//! The semantic analysis pass.

use zlc_par::ast::*;
use zlc_util::{CompileError, ErrorKind, Result, Symbol};

use crate::builtins;
use crate::scope::ScopeStack;
use crate::symtab::{Entry, FuncSymbol, SymbolTable, VarSymbol};

/// Analyzes a whole program, returning the first violation found.
pub fn analyze(program: &Program) -> Result<()> {
    Analyzer::new(program).run()
}

/// Literal payload of an expression, when the expression is a literal
/// leaf. Promotion rules only ever apply to direct literals, never to
/// values that merely originated from one.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lit {
    None,
    Int(i64),
    Float(f64),
    Str,
    Null,
}

/// The analyzed type of an expression.
#[derive(Debug, Clone, Copy)]
struct ExprType {
    ty: DataType,
    nullable: bool,
    lit: Lit,
}

impl ExprType {
    fn new(ty: DataType) -> Self {
        Self {
            ty,
            nullable: false,
            lit: Lit::None,
        }
    }

    fn is_null(&self) -> bool {
        matches!(self.lit, Lit::Null)
    }

    fn is_int_literal(&self) -> bool {
        matches!(self.lit, Lit::Int(_))
    }
}

/// Whether a value of type `found` may be stored into a slot declared
/// as `expected` (declaration, assignment, argument or return slot).
///
/// Implicit conversions exist only for direct literals: an i32 literal
/// fits an f64 slot, and an f64 literal with an integral value in i32
/// range fits an i32 slot.
fn store_compatible(expected: DataType, expected_nullable: bool, found: ExprType) -> bool {
    if found.is_null() {
        return expected_nullable;
    }
    if found.ty == expected {
        return !(found.nullable && !expected_nullable);
    }
    match found.lit {
        Lit::Int(_) if expected == DataType::F64 => true,
        Lit::Float(value) if expected == DataType::I32 => {
            value.fract() == 0.0
                && value >= f64::from(i32::MIN)
                && value <= f64::from(i32::MAX)
        },
        _ => false,
    }
}

/// Per-function analysis state.
struct FnCtx {
    ret: DataType,
    ret_nullable: bool,
    is_main: bool,
    has_return: bool,
}

/// The analyzer.
pub struct Analyzer<'ast> {
    program: &'ast Program,

    /// Top-level functions and variables.
    global: SymbolTable,
}

impl<'ast> Analyzer<'ast> {
    pub fn new(program: &'ast Program) -> Self {
        Self {
            program,
            global: SymbolTable::new(),
        }
    }

    /// Runs the whole analysis.
    pub fn run(mut self) -> Result<()> {
        self.collect_functions()?;

        let program = self.program;

        // Top-level variable declarations, in source order. The scope
        // stack stays empty here; declarations land in the global
        // table.
        let mut top_scopes = ScopeStack::new();
        for decl in &program.decls {
            if let Decl::Var(var_decl) = decl {
                self.process_declaration(var_decl, &mut top_scopes)?;
            }
        }

        // Analyze every function, in declaration order. Calls trigger
        // callee analysis early; the memo keeps each body single-pass.
        for index in 0..program.decls.len() {
            if matches!(program.decls[index], Decl::Function(_)) {
                self.analyze_function(index)?;
            }
        }

        self.finish()
    }

    /// Pre-pass: register every function in the global table.
    fn collect_functions(&mut self) -> Result<()> {
        let program = self.program;
        for (index, decl) in program.decls.iter().enumerate() {
            if let Decl::Function(f) = decl {
                let symbol = FuncSymbol {
                    name: f.name,
                    ret: f.ret,
                    nullable: f.nullable,
                    used: false,
                    has_return: false,
                    initialized: false,
                    decl_index: index,
                };
                if !self.global.insert(f.name, Entry::Func(symbol)) {
                    return Err(CompileError::at(
                        ErrorKind::Redefinition,
                        format!("function '{}' is defined twice", f.name),
                        f.span,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validates the entry function: `main` exists, returns `void`,
    /// and takes no parameters.
    fn check_main(&self) -> Result<()> {
        let main = Symbol::intern("main");
        let Some(Entry::Func(symbol)) = self.global.get(main) else {
            return Err(CompileError::new(
                ErrorKind::Undefined,
                "program has no 'main' function",
            ));
        };
        let program = self.program;
        let Decl::Function(decl) = &program.decls[symbol.decl_index] else {
            return Err(CompileError::new(
                ErrorKind::Internal,
                "function symbol does not point at a function",
            ));
        };
        if symbol.ret != DataType::Void || symbol.nullable {
            return Err(CompileError::at(
                ErrorKind::Params,
                "'main' must return void",
                decl.span,
            ));
        }
        if !decl.params.is_empty() {
            return Err(CompileError::at(
                ErrorKind::Params,
                "'main' takes no parameters",
                decl.span,
            ));
        }
        Ok(())
    }

    /// Analyzes the function at `decl_index`, once.
    fn analyze_function(&mut self, decl_index: usize) -> Result<()> {
        let program = self.program;
        let Decl::Function(decl) = &program.decls[decl_index] else {
            return Ok(());
        };

        match self.global.get_mut(decl.name) {
            Some(Entry::Func(symbol)) => {
                if symbol.initialized {
                    return Ok(());
                }
                // Set before descending so recursive calls terminate.
                symbol.initialized = true;
            },
            _ => {
                return Err(CompileError::new(
                    ErrorKind::Internal,
                    "function disappeared from the global table",
                ));
            },
        }

        let mut scopes = ScopeStack::new();

        // Parameter frame. Parameters are constants; an unused
        // parameter is not a violation, so this frame is not scanned.
        scopes.push_frame();
        for param in &decl.params {
            let symbol = VarSymbol {
                name: param.name,
                ty: param.ty,
                is_const: true,
                nullable: param.nullable,
                used: false,
                reassigned: false,
            };
            if !scopes.declare(symbol) {
                return Err(CompileError::at(
                    ErrorKind::Redefinition,
                    format!("duplicate parameter '{}'", param.name),
                    param.span,
                ));
            }
        }

        let mut ctx = FnCtx {
            ret: decl.ret,
            ret_nullable: decl.nullable,
            is_main: decl.name.as_str() == "main",
            has_return: false,
        };

        self.analyze_block(&decl.body, &mut scopes, &mut ctx)?;
        scopes.pop_frame();

        if decl.ret != DataType::Void && !decl.nullable && !ctx.is_main && !ctx.has_return {
            return Err(CompileError::at(
                ErrorKind::Return,
                format!("function '{}' can finish without returning a value", decl.name),
                decl.span,
            ));
        }

        if let Some(Entry::Func(symbol)) = self.global.get_mut(decl.name) {
            symbol.has_return = ctx.has_return;
        }
        Ok(())
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    /// Analyzes a block in a fresh frame, then applies the usage rules
    /// to everything the frame declared.
    fn analyze_block(
        &mut self,
        block: &'ast Block,
        scopes: &mut ScopeStack,
        ctx: &mut FnCtx,
    ) -> Result<()> {
        scopes.push_frame();
        for stmt in &block.stmts {
            self.analyze_stmt(stmt, scopes, ctx)?;
        }
        let frame = scopes.pop_frame().unwrap_or_default();
        Self::scan_frame(&frame)
    }

    fn analyze_stmt(
        &mut self,
        stmt: &'ast Stmt,
        scopes: &mut ScopeStack,
        ctx: &mut FnCtx,
    ) -> Result<()> {
        match stmt {
            Stmt::Decl(decl) => self.process_declaration(decl, scopes),
            Stmt::Assign(assign) => self.process_assignment(assign, scopes),
            Stmt::If(if_stmt) => self.analyze_if(if_stmt, scopes, ctx),
            Stmt::While(while_stmt) => self.analyze_while(while_stmt, scopes, ctx),
            Stmt::Return(ret) => self.analyze_return(ret, scopes, ctx),
            Stmt::Call(call) => {
                let result = self.evaluate_call(call, scopes)?;
                if result.ty != DataType::Void {
                    return Err(CompileError::at(
                        ErrorKind::Params,
                        format!(
                            "return value of '{}' is discarded; assign it to '_'",
                            call.name
                        ),
                        call.span,
                    ));
                }
                Ok(())
            },
        }
    }

    /// Processes a `var`/`const` declaration, local or top-level.
    fn process_declaration(
        &mut self,
        decl: &'ast VarDecl,
        scopes: &mut ScopeStack,
    ) -> Result<()> {
        let redefined = if scopes.depth() == 0 {
            self.global.contains(decl.name)
        } else {
            scopes.declared_in_top(decl.name)
        };
        if redefined {
            return Err(CompileError::at(
                ErrorKind::Redefinition,
                format!("'{}' is already declared in this scope", decl.name),
                decl.span,
            ));
        }

        let init = self.type_of(&decl.init, scopes)?;

        if init.is_null() && !decl.nullable {
            return Err(CompileError::at(
                ErrorKind::TypeInference,
                format!("cannot infer a type for '{}' from null", decl.name),
                decl.span,
            ));
        }

        let (ty, nullable) = if decl.declared == DataType::Unspecified {
            if init.ty == DataType::Unspecified {
                return Err(CompileError::at(
                    ErrorKind::TypeInference,
                    format!("cannot infer a type for '{}'", decl.name),
                    decl.span,
                ));
            }
            (init.ty, decl.nullable || init.nullable)
        } else {
            if !store_compatible(decl.declared, decl.nullable, init) {
                return Err(CompileError::at(
                    ErrorKind::TypeCompat,
                    format!(
                        "cannot initialize '{}: {}' from a value of type {}",
                        decl.name, decl.declared, init.ty
                    ),
                    decl.span,
                ));
            }
            (decl.declared, decl.nullable)
        };

        let symbol = VarSymbol {
            name: decl.name,
            ty,
            is_const: decl.is_const,
            nullable,
            used: false,
            reassigned: false,
        };
        if scopes.depth() == 0 {
            self.global.insert(decl.name, Entry::Var(symbol));
        } else {
            scopes.declare(symbol);
        }
        Ok(())
    }

    /// Processes an assignment to a name or to the discard sink.
    fn process_assignment(
        &mut self,
        assign: &'ast AssignStmt,
        scopes: &mut ScopeStack,
    ) -> Result<()> {
        let name = match assign.target {
            AssignTarget::Discard => {
                // The sink evaluates the value for its type and effects
                // and binds nothing.
                self.type_of(&assign.value, scopes)?;
                return Ok(());
            },
            AssignTarget::Name(name) => name,
        };

        let target = scopes.lookup(name).copied().or_else(|| {
            match self.global.get(name) {
                Some(Entry::Var(var)) => Some(*var),
                _ => None,
            }
        });

        let Some(target) = target else {
            if matches!(self.global.get(name), Some(Entry::Func(_))) {
                return Err(CompileError::at(
                    ErrorKind::Redefinition,
                    format!("cannot assign to function '{}'", name),
                    assign.span,
                ));
            }
            return Err(CompileError::at(
                ErrorKind::Undefined,
                format!("assignment to undefined variable '{}'", name),
                assign.span,
            ));
        };

        if target.is_const {
            return Err(CompileError::at(
                ErrorKind::Redefinition,
                format!("cannot assign to constant '{}'", name),
                assign.span,
            ));
        }

        let value = self.type_of(&assign.value, scopes)?;
        if !store_compatible(target.ty, target.nullable, value) {
            return Err(CompileError::at(
                ErrorKind::TypeCompat,
                format!(
                    "cannot assign a value of type {} to '{}: {}'",
                    value.ty, name, target.ty
                ),
                assign.span,
            ));
        }

        if let Some(var) = scopes.lookup_mut(name) {
            var.used = true;
            var.reassigned = true;
        } else if let Some(var) = self.global.var_mut(name) {
            var.used = true;
            var.reassigned = true;
        }
        Ok(())
    }

    fn analyze_if(
        &mut self,
        if_stmt: &'ast IfStmt,
        scopes: &mut ScopeStack,
        ctx: &mut FnCtx,
    ) -> Result<()> {
        let bound = self.analyze_condition(&if_stmt.cond, if_stmt.bind, scopes)?;
        self.analyze_block(&if_stmt.then_block, scopes, ctx)?;
        if bound {
            let frame = scopes.pop_frame().unwrap_or_default();
            Self::scan_frame(&frame)?;
        }
        if let Some(else_block) = &if_stmt.else_block {
            // The element-bind is not visible in the else block.
            self.analyze_block(else_block, scopes, ctx)?;
        }
        Ok(())
    }

    fn analyze_while(
        &mut self,
        while_stmt: &'ast WhileStmt,
        scopes: &mut ScopeStack,
        ctx: &mut FnCtx,
    ) -> Result<()> {
        let bound = self.analyze_condition(&while_stmt.cond, while_stmt.bind, scopes)?;
        self.analyze_block(&while_stmt.body, scopes, ctx)?;
        if bound {
            let frame = scopes.pop_frame().unwrap_or_default();
            Self::scan_frame(&frame)?;
        }
        Ok(())
    }

    /// Types a condition and, with an element-bind, opens a frame
    /// holding the non-null binding. Returns whether a frame was
    /// opened (the caller pops and scans it after the guarded block).
    ///
    /// Without a bind the condition must be a non-nullable i32 (the
    /// comparison operators produce one). With a bind the condition
    /// must be nullable; the binding is a constant with the non-null
    /// version of the condition's type.
    fn analyze_condition(
        &mut self,
        cond: &'ast Expr,
        bind: Option<Symbol>,
        scopes: &mut ScopeStack,
    ) -> Result<bool> {
        let cond_type = self.type_of(cond, scopes)?;
        match bind {
            None => {
                if cond_type.ty != DataType::I32 || cond_type.nullable {
                    return Err(CompileError::at(
                        ErrorKind::TypeCompat,
                        format!("condition must be i32, found {}", cond_type.ty),
                        cond.span(),
                    ));
                }
                Ok(false)
            },
            Some(name) => {
                if !cond_type.nullable {
                    return Err(CompileError::at(
                        ErrorKind::TypeCompat,
                        "element bind requires a nullable condition",
                        cond.span(),
                    ));
                }
                if cond_type.ty == DataType::Unspecified {
                    return Err(CompileError::at(
                        ErrorKind::TypeInference,
                        format!("cannot infer a type for binding '{}'", name),
                        cond.span(),
                    ));
                }
                scopes.push_frame();
                scopes.declare(VarSymbol {
                    name,
                    ty: cond_type.ty,
                    is_const: true,
                    nullable: false,
                    used: false,
                    reassigned: false,
                });
                Ok(true)
            },
        }
    }

    fn analyze_return(
        &mut self,
        ret: &'ast ReturnStmt,
        scopes: &mut ScopeStack,
        ctx: &mut FnCtx,
    ) -> Result<()> {
        if ctx.ret == DataType::Void {
            if ret.value.is_some() {
                return Err(CompileError::at(
                    ErrorKind::Return,
                    "void function returns a value",
                    ret.span,
                ));
            }
            ctx.has_return = true;
            return Ok(());
        }

        let Some(value) = &ret.value else {
            if ctx.ret_nullable {
                // A nullable function may return without a value; the
                // result is null.
                ctx.has_return = true;
                return Ok(());
            }
            return Err(CompileError::at(
                ErrorKind::Return,
                "missing return value",
                ret.span,
            ));
        };

        let value_type = self.type_of(value, scopes)?;
        if !store_compatible(ctx.ret, ctx.ret_nullable, value_type) {
            return Err(CompileError::at(
                ErrorKind::Params,
                format!(
                    "return value has type {}, function returns {}",
                    value_type.ty, ctx.ret
                ),
                ret.span,
            ));
        }
        ctx.has_return = true;
        Ok(())
    }

    /// Usage rules for a popped frame: every variable must have been
    /// used, and every non-constant must have been reassigned.
    fn scan_frame(frame: &SymbolTable) -> Result<()> {
        for (name, entry) in frame.iter() {
            if let Entry::Var(var) = entry {
                if !var.used {
                    return Err(CompileError::new(
                        ErrorKind::UnusedVar,
                        format!("variable '{}' is never used", name),
                    ));
                }
                if !var.is_const && !var.reassigned {
                    return Err(CompileError::new(
                        ErrorKind::UnusedVar,
                        format!("variable '{}' is never reassigned; declare it const", name),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Final pass: entry function shape, then usage of globals.
    fn finish(&mut self) -> Result<()> {
        self.check_main()?;
        for (name, entry) in self.global.iter() {
            match entry {
                Entry::Func(func) => {
                    if !func.used && name.as_str() != "main" {
                        return Err(CompileError::new(
                            ErrorKind::OtherSemantic,
                            format!("function '{}' is never called", name),
                        ));
                    }
                },
                Entry::Var(var) => {
                    if !var.used {
                        return Err(CompileError::new(
                            ErrorKind::UnusedVar,
                            format!("variable '{}' is never used", name),
                        ));
                    }
                    if !var.is_const && !var.reassigned {
                        return Err(CompileError::new(
                            ErrorKind::UnusedVar,
                            format!("variable '{}' is never reassigned; declare it const", name),
                        ));
                    }
                },
            }
        }
        Ok(())
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Types an expression, marking identifier reads as uses.
    fn type_of(&mut self, expr: &'ast Expr, scopes: &mut ScopeStack) -> Result<ExprType> {
        match expr {
            Expr::Int(value, _) => Ok(ExprType {
                ty: DataType::I32,
                nullable: false,
                lit: Lit::Int(*value),
            }),
            Expr::Float(value, _) => Ok(ExprType {
                ty: DataType::F64,
                nullable: false,
                lit: Lit::Float(*value),
            }),
            Expr::Str(_, _) => Ok(ExprType {
                ty: DataType::Slice,
                nullable: false,
                lit: Lit::Str,
            }),
            Expr::Null(_) => Ok(ExprType {
                ty: DataType::Unspecified,
                nullable: true,
                lit: Lit::Null,
            }),
            Expr::Ident(name, span) => {
                if let Some(var) = scopes.lookup_mut(*name) {
                    var.used = true;
                    return Ok(ExprType {
                        ty: var.ty,
                        nullable: var.nullable,
                        lit: Lit::None,
                    });
                }
                match self.global.get_mut(*name) {
                    Some(Entry::Var(var)) => {
                        var.used = true;
                        Ok(ExprType {
                            ty: var.ty,
                            nullable: var.nullable,
                            lit: Lit::None,
                        })
                    },
                    _ => Err(CompileError::at(
                        ErrorKind::Undefined,
                        format!("use of undefined variable '{}'", name),
                        *span,
                    )),
                }
            },
            Expr::Call(call) => self.evaluate_call(call, scopes),
            Expr::Binary(binary) => self.binary_type(binary, scopes),
        }
    }

    /// Types a binary operation.
    fn binary_type(
        &mut self,
        binary: &'ast BinaryExpr,
        scopes: &mut ScopeStack,
    ) -> Result<ExprType> {
        let lhs = self.type_of(&binary.lhs, scopes)?;
        let rhs = self.type_of(&binary.rhs, scopes)?;
        let op = binary.op;

        if op.is_arithmetic() {
            let Some(ty) = Self::arithmetic_result(op, lhs, rhs) else {
                return Err(CompileError::at(
                    ErrorKind::TypeCompat,
                    format!("operator '{}' cannot combine {} and {}", op, lhs.ty, rhs.ty),
                    binary.span,
                ));
            };
            return Ok(ExprType::new(ty));
        }

        if op.is_relational() {
            // Relational comparison needs non-nullable numeric
            // operands; slices are not ordered.
            if !Self::relational_ok(lhs, rhs) {
                return Err(CompileError::at(
                    ErrorKind::TypeCompat,
                    format!("operator '{}' cannot compare {} and {}", op, lhs.ty, rhs.ty),
                    binary.span,
                ));
            }
            return Ok(ExprType::new(DataType::I32));
        }

        // Equality. Same-type operands compare (slices by value);
        // null compares against any nullable operand.
        let comparable = if lhs.is_null() && rhs.is_null() {
            true
        } else if lhs.is_null() {
            rhs.nullable
        } else if rhs.is_null() {
            lhs.nullable
        } else if lhs.ty == rhs.ty {
            true
        } else {
            // Mixed numeric comparison through a literal operand.
            (lhs.is_int_literal() && rhs.ty == DataType::F64)
                || (rhs.is_int_literal() && lhs.ty == DataType::F64)
        };
        if !comparable {
            return Err(CompileError::at(
                ErrorKind::TypeCompat,
                format!("operator '{}' cannot compare {} and {}", op, lhs.ty, rhs.ty),
                binary.span,
            ));
        }
        Ok(ExprType::new(DataType::I32))
    }

    /// Result type of an arithmetic operator, or None when the
    /// operands do not combine.
    ///
    /// Mixed i32/f64 combines only when the i32 side is a literal --
    /// except division, whose operand types are resolved at runtime
    /// by the generator, so any mixed numeric pair is accepted and
    /// statically typed f64.
    fn arithmetic_result(op: BinOp, lhs: ExprType, rhs: ExprType) -> Option<DataType> {
        if lhs.is_null() || rhs.is_null() {
            return None;
        }
        if !lhs.ty.is_numeric() || !rhs.ty.is_numeric() {
            return None;
        }
        if lhs.ty == rhs.ty {
            return Some(lhs.ty);
        }
        if op == BinOp::Div {
            return Some(DataType::F64);
        }
        if (lhs.ty == DataType::I32 && lhs.is_int_literal())
            || (rhs.ty == DataType::I32 && rhs.is_int_literal())
        {
            return Some(DataType::F64);
        }
        None
    }

    /// Whether two operands compare under a relational operator:
    /// non-nullable numeric operands of the same type, or mixed
    /// through an i32 literal.
    fn relational_ok(lhs: ExprType, rhs: ExprType) -> bool {
        if lhs.is_null() || rhs.is_null() || lhs.nullable || rhs.nullable {
            return false;
        }
        if !lhs.ty.is_numeric() || !rhs.ty.is_numeric() {
            return false;
        }
        lhs.ty == rhs.ty
            || (lhs.ty == DataType::I32 && lhs.is_int_literal())
            || (rhs.ty == DataType::I32 && rhs.is_int_literal())
    }

    /// Types a call and checks its signature.
    fn evaluate_call(
        &mut self,
        call: &'ast CallExpr,
        scopes: &mut ScopeStack,
    ) -> Result<ExprType> {
        let name = call.name.as_str();
        if call.builtin || name.starts_with("ifj.") {
            return self.evaluate_builtin_call(call, scopes);
        }

        let symbol = match self.global.get(call.name) {
            Some(Entry::Func(func)) => *func,
            Some(Entry::Var(_)) => {
                return Err(CompileError::at(
                    ErrorKind::OtherSemantic,
                    format!("'{}' is a variable, not a function", call.name),
                    call.span,
                ));
            },
            None => {
                return Err(CompileError::at(
                    ErrorKind::Undefined,
                    format!("call of undefined function '{}'", call.name),
                    call.span,
                ));
            },
        };

        if let Some(Entry::Func(func)) = self.global.get_mut(call.name) {
            func.used = true;
        }

        // Lazy initialization: analyze the callee on first use.
        if !symbol.initialized {
            self.analyze_function(symbol.decl_index)?;
        }

        let program = self.program;
        let Decl::Function(decl) = &program.decls[symbol.decl_index] else {
            return Err(CompileError::new(
                ErrorKind::Internal,
                "function symbol does not point at a function",
            ));
        };

        if call.args.len() != decl.params.len() {
            return Err(CompileError::at(
                ErrorKind::Params,
                format!(
                    "'{}' takes {} arguments, {} given",
                    call.name,
                    decl.params.len(),
                    call.args.len()
                ),
                call.span,
            ));
        }
        for (arg, param) in call.args.iter().zip(&decl.params) {
            let arg_type = self.type_of(arg, scopes)?;
            if !store_compatible(param.ty, param.nullable, arg_type) {
                return Err(CompileError::at(
                    ErrorKind::Params,
                    format!(
                        "argument '{}' of '{}' expects {}, found {}",
                        param.name, call.name, param.ty, arg_type.ty
                    ),
                    arg.span(),
                ));
            }
        }

        Ok(ExprType {
            ty: symbol.ret,
            nullable: symbol.nullable,
            lit: Lit::None,
        })
    }

    fn evaluate_builtin_call(
        &mut self,
        call: &'ast CallExpr,
        scopes: &mut ScopeStack,
    ) -> Result<ExprType> {
        let name = call.name.as_str();
        let Some(sig) = builtins::lookup(name) else {
            return Err(CompileError::at(
                ErrorKind::Undefined,
                format!("'{}' is not a builtin function", name),
                call.span,
            ));
        };

        if call.args.len() != sig.arity() {
            return Err(CompileError::at(
                ErrorKind::Params,
                format!(
                    "'{}' takes {} arguments, {} given",
                    name,
                    sig.arity(),
                    call.args.len()
                ),
                call.span,
            ));
        }

        for (index, arg) in call.args.iter().enumerate() {
            let arg_type = self.type_of(arg, scopes)?;
            if sig.any_arg {
                continue;
            }
            let expected = sig.params[index];
            if !store_compatible(expected, false, arg_type) {
                return Err(CompileError::at(
                    ErrorKind::Params,
                    format!(
                        "argument {} of '{}' expects {}, found {}",
                        index + 1,
                        name,
                        expected,
                        arg_type.ty
                    ),
                    arg.span(),
                ));
            }
        }

        Ok(ExprType {
            ty: sig.ret,
            nullable: sig.nullable,
            lit: Lit::None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_compatible_literal_promotions() {
        let int_lit = ExprType {
            ty: DataType::I32,
            nullable: false,
            lit: Lit::Int(1),
        };
        let int_value = ExprType::new(DataType::I32);
        let float_whole = ExprType {
            ty: DataType::F64,
            nullable: false,
            lit: Lit::Float(2.0),
        };
        let float_frac = ExprType {
            ty: DataType::F64,
            nullable: false,
            lit: Lit::Float(2.5),
        };

        // i32 literal fits an f64 slot; a non-literal i32 does not.
        assert!(store_compatible(DataType::F64, false, int_lit));
        assert!(!store_compatible(DataType::F64, false, int_value));

        // f64 literal fits an i32 slot only when integral.
        assert!(store_compatible(DataType::I32, false, float_whole));
        assert!(!store_compatible(DataType::I32, false, float_frac));
    }

    #[test]
    fn test_store_compatible_nullability() {
        let nullable_i32 = ExprType {
            ty: DataType::I32,
            nullable: true,
            lit: Lit::None,
        };
        let null = ExprType {
            ty: DataType::Unspecified,
            nullable: true,
            lit: Lit::Null,
        };

        assert!(store_compatible(DataType::I32, true, nullable_i32));
        assert!(!store_compatible(DataType::I32, false, nullable_i32));
        assert!(store_compatible(DataType::I32, true, null));
        assert!(!store_compatible(DataType::I32, false, null));
    }

    #[test]
    fn test_arithmetic_promotion_requires_literal() {
        let int_lit = ExprType {
            ty: DataType::I32,
            nullable: false,
            lit: Lit::Int(3),
        };
        let int_value = ExprType::new(DataType::I32);
        let float_value = ExprType::new(DataType::F64);

        assert_eq!(
            Analyzer::arithmetic_result(BinOp::Add, int_lit, float_value),
            Some(DataType::F64)
        );
        assert_eq!(
            Analyzer::arithmetic_result(BinOp::Add, int_value, float_value),
            None
        );
        assert_eq!(
            Analyzer::arithmetic_result(BinOp::Mul, int_value, int_value),
            Some(DataType::I32)
        );
    }

    #[test]
    fn test_division_accepts_mixed_operands() {
        let int_value = ExprType::new(DataType::I32);
        let float_value = ExprType::new(DataType::F64);
        assert_eq!(
            Analyzer::arithmetic_result(BinOp::Div, int_value, float_value),
            Some(DataType::F64)
        );
        assert_eq!(
            Analyzer::arithmetic_result(BinOp::Div, int_value, int_value),
            Some(DataType::I32)
        );
    }

    #[test]
    fn test_arithmetic_rejects_slices() {
        let slice = ExprType::new(DataType::Slice);
        let int_value = ExprType::new(DataType::I32);
        assert_eq!(
            Analyzer::arithmetic_result(BinOp::Add, slice, int_value),
            None
        );
    }

    #[test]
    fn test_relational_rejects_nullable_and_slices() {
        let int_value = ExprType::new(DataType::I32);
        let nullable = ExprType {
            ty: DataType::I32,
            nullable: true,
            lit: Lit::None,
        };
        let slice = ExprType::new(DataType::Slice);

        assert!(Analyzer::relational_ok(int_value, int_value));
        assert!(!Analyzer::relational_ok(nullable, int_value));
        assert!(!Analyzer::relational_ok(slice, slice));
    }
}
