//! Whole-parser edge cases.

use zlc_util::ErrorKind;

use crate::ast::*;
use crate::parse;

const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

fn parse_body(body: &str) -> Result<Program, zlc_util::CompileError> {
    parse(&format!("{}{}", PROLOG, body))
}

fn main_stmts(program: &Program) -> &[Stmt] {
    for decl in &program.decls {
        if let Decl::Function(f) = decl {
            if f.name.as_str() == "main" {
                return &f.body.stmts;
            }
        }
    }
    panic!("no main function in test program");
}

#[test]
fn test_full_program_shape() {
    let program = parse_body(
        "pub fn add(a: i32, b: i32) i32 { return a + b; }\n\
         pub fn main() void {\n\
             const x = add(1, 2);\n\
             ifj.write(x);\n\
         }\n",
    )
    .unwrap();
    assert_eq!(program.decls.len(), 2);
    let stmts = main_stmts(&program);
    assert_eq!(stmts.len(), 2);
    assert!(matches!(stmts[0], Stmt::Decl(_)));
    assert!(matches!(stmts[1], Stmt::Call(_)));
}

#[test]
fn test_nested_control_flow() {
    let program = parse_body(
        "pub fn main() void {\n\
             while (a < 10) {\n\
                 if (a == 5) {\n\
                     a = a + 1;\n\
                 } else {\n\
                     a = a + 2;\n\
                 }\n\
             }\n\
         }\n",
    )
    .unwrap();
    let stmts = main_stmts(&program);
    match &stmts[0] {
        Stmt::While(w) => {
            assert!(w.bind.is_none());
            assert_eq!(w.body.stmts.len(), 1);
            match &w.body.stmts[0] {
                Stmt::If(i) => assert!(i.else_block.is_some()),
                other => panic!("expected if, got {:?}", other),
            }
        },
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn test_while_with_element_bind() {
    let program = parse_body(
        "pub fn main() void { while (q) |v| { ifj.write(v); } }",
    )
    .unwrap();
    match &main_stmts(&program)[0] {
        Stmt::While(w) => {
            assert_eq!(w.bind.unwrap().as_str(), "v");
            assert!(matches!(w.cond, Expr::Ident(_, _)));
        },
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn test_top_level_const() {
    let program = parse_body("const limit: i32 = 100;\npub fn main() void { }").unwrap();
    match &program.decls[0] {
        Decl::Var(v) => {
            assert!(v.is_const);
            assert_eq!(v.declared, DataType::I32);
            assert!(!v.nullable);
        },
        other => panic!("expected var decl, got {:?}", other),
    }
}

#[test]
fn test_nullable_annotations() {
    let program = parse_body(
        "pub fn main() void { var q: ?i32 = null; q = 1; }",
    )
    .unwrap();
    match &main_stmts(&program)[0] {
        Stmt::Decl(d) => {
            assert!(d.nullable);
            assert_eq!(d.declared, DataType::I32);
            assert!(matches!(d.init, Expr::Null(_)));
        },
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_return_forms() {
    let program = parse_body(
        "pub fn f() i32 { return 1 + 2; }\n\
         pub fn main() void { return; }\n",
    )
    .unwrap();
    match &program.decls[0] {
        Decl::Function(f) => match &f.body.stmts[0] {
            Stmt::Return(r) => assert!(matches!(r.value, Some(Expr::Binary(_)))),
            other => panic!("expected return, got {:?}", other),
        },
        other => panic!("expected function, got {:?}", other),
    }
    match &main_stmts(&program)[0] {
        Stmt::Return(r) => assert!(r.value.is_none()),
        other => panic!("expected return, got {:?}", other),
    }
}

#[test]
fn test_call_with_expression_arguments() {
    let program = parse_body(
        "pub fn main() void { ifj.write(ifj.concat(a, b)); }",
    )
    .unwrap();
    match &main_stmts(&program)[0] {
        Stmt::Call(call) => {
            assert_eq!(call.name.as_str(), "ifj.write");
            match &call.args[0] {
                Expr::Call(inner) => {
                    assert_eq!(inner.name.as_str(), "ifj.concat");
                    assert_eq!(inner.args.len(), 2);
                },
                other => panic!("expected inner call, got {:?}", other),
            }
        },
        other => panic!("expected call, got {:?}", other),
    }
}

// =============================================================================
// REJECTIONS
// =============================================================================

#[test]
fn test_missing_pub_rejected() {
    let err = parse_body("fn main() void { }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_missing_return_type_rejected() {
    let err = parse_body("pub fn main() { }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_unclosed_block_rejected() {
    let err = parse_body("pub fn main() void { var x = 1;").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_statement_at_top_level_rejected() {
    let err = parse_body("ifj.write(1);").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_declaration_without_initializer_rejected() {
    let err = parse_body("pub fn main() void { var x: i32; }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_element_bind_without_closing_pipe_rejected() {
    let err = parse_body("pub fn main() void { if (q) |v { } }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_slice_type_requires_u8() {
    let err = parse_body("pub fn main() void { var s: []i32 = x; }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_lone_bang_rejected() {
    let err = parse_body("pub fn main() void { var x = !y; }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}
