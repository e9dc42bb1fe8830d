//! Whole-analyzer edge cases, driven through the parser.

use zlc_util::ErrorKind;

use crate::analyze;

const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

fn check(body: &str) -> Result<(), zlc_util::CompileError> {
    let source = format!("{}{}", PROLOG, body);
    let program = zlc_par::parse(&source).expect("test program must parse");
    analyze(&program)
}

fn expect_kind(body: &str, kind: ErrorKind) {
    let err = check(body).expect_err("program should be rejected");
    assert_eq!(err.kind, kind, "unexpected classification: {}", err);
}

// =============================================================================
// ACCEPTED PROGRAMS
// =============================================================================

#[test]
fn test_minimal_program() {
    check("pub fn main() void { }").unwrap();
}

#[test]
fn test_hello_world() {
    check("pub fn main() void { ifj.write(\"Hello\"); }").unwrap();
}

#[test]
fn test_literal_promotion_in_declaration() {
    check(
        "pub fn main() void { var y: f64 = 1; y = 2.5; ifj.write(y); }",
    )
    .unwrap();
}

#[test]
fn test_float_literal_to_i32_when_integral() {
    check(
        "pub fn main() void { var n: i32 = 3.0; n = 4; ifj.write(n); }",
    )
    .unwrap();
}

#[test]
fn test_while_with_element_bind() {
    check(
        "pub fn main() void {\n\
             var q: ?i32 = ifj.readi32();\n\
             while (q) |v| { ifj.write(v); q = ifj.readi32(); }\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_mixed_division_of_read_results() {
    check(
        "pub fn main() void {\n\
             var r = ifj.readi32() / ifj.readf64();\n\
             r = 0.0;\n\
             ifj.write(r);\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_call_before_declaration() {
    check(
        "pub fn main() void { const x = double(2); ifj.write(x); }\n\
         pub fn double(n: i32) i32 { return n * 2; }",
    )
    .unwrap();
}

#[test]
fn test_recursive_function() {
    check(
        "pub fn main() void { ifj.write(fact(5)); }\n\
         pub fn fact(n: i32) i32 {\n\
             if (n < 2) { return 1; } else { }\n\
             return n * fact(n - 1);\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_discard_of_non_void_call() {
    check(
        "pub fn main() void { _ = f(); }\n\
         pub fn f() i32 { return 3; }",
    )
    .unwrap();
}

#[test]
fn test_slice_equality_compares() {
    check(
        "pub fn main() void {\n\
             const a = ifj.string(\"x\");\n\
             const b = ifj.string(\"y\");\n\
             if (a == b) { } else { }\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_null_comparison_with_nullable() {
    check(
        "pub fn main() void {\n\
             var q: ?i32 = ifj.readi32();\n\
             if (q == null) { } else { }\n\
             q = null;\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_nullable_function_return_without_value() {
    check(
        "pub fn main() void {\n\
             const v = maybe();\n\
             if (v) |got| { ifj.write(got); } else { }\n\
         }\n\
         pub fn maybe() ?i32 { return; }",
    )
    .unwrap();
}

#[test]
fn test_shadowing_in_nested_scope() {
    check(
        "pub fn main() void {\n\
             const x = 1;\n\
             if (x == 1) { const x = 2; ifj.write(x); } else { }\n\
             ifj.write(x);\n\
         }",
    )
    .unwrap();
}

#[test]
fn test_global_constant_used_by_function() {
    check(
        "const limit: i32 = 10;\n\
         pub fn main() void { ifj.write(limit); }",
    )
    .unwrap();
}

// =============================================================================
// REJECTED PROGRAMS
// =============================================================================

#[test]
fn test_unused_variable() {
    expect_kind("pub fn main() void { var x: i32 = 1; }", ErrorKind::UnusedVar);
}

#[test]
fn test_never_reassigned_var() {
    expect_kind(
        "pub fn main() void { var x: i32 = 1; ifj.write(x); }",
        ErrorKind::UnusedVar,
    );
}

#[test]
fn test_redefined_function() {
    expect_kind(
        "pub fn main() void { }\npub fn main() void { }",
        ErrorKind::Redefinition,
    );
}

#[test]
fn test_redeclaration_in_same_scope() {
    expect_kind(
        "pub fn main() void { const x = 1; const x = 2; ifj.write(x); }",
        ErrorKind::Redefinition,
    );
}

#[test]
fn test_write_to_constant() {
    expect_kind(
        "pub fn main() void { const x = 1; x = 2; }",
        ErrorKind::Redefinition,
    );
}

#[test]
fn test_missing_return_value() {
    expect_kind(
        "pub fn f() i32 { return; }\n\
         pub fn main() void { _ = f(); }",
        ErrorKind::Return,
    );
}

#[test]
fn test_void_function_returning_value() {
    expect_kind(
        "pub fn main() void { return 1; }",
        ErrorKind::Return,
    );
}

#[test]
fn test_function_may_not_return() {
    expect_kind(
        "pub fn f() i32 { ifj.write(1); }\n\
         pub fn main() void { _ = f(); }",
        ErrorKind::Return,
    );
}

#[test]
fn test_non_literal_promotion_rejected() {
    expect_kind(
        "pub fn main() void { var a: i32 = 1; a = 2; var y: f64 = a; y = 1.0; ifj.write(y); }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_fractional_literal_to_i32_rejected() {
    expect_kind(
        "pub fn main() void { var n: i32 = 3.5; n = 1; ifj.write(n); }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_null_to_non_nullable_rejected() {
    expect_kind(
        "pub fn main() void { var x: i32 = null; }",
        ErrorKind::TypeInference,
    );
}

#[test]
fn test_inference_from_bare_null_rejected() {
    expect_kind(
        "pub fn main() void { var x = null; }",
        ErrorKind::TypeInference,
    );
}

#[test]
fn test_undefined_variable() {
    expect_kind(
        "pub fn main() void { ifj.write(ghost); }",
        ErrorKind::Undefined,
    );
}

#[test]
fn test_undefined_function() {
    expect_kind(
        "pub fn main() void { ghost(); }",
        ErrorKind::Undefined,
    );
}

#[test]
fn test_unknown_builtin() {
    expect_kind(
        "pub fn main() void { ifj.print(1); }",
        ErrorKind::Undefined,
    );
}

#[test]
fn test_discarded_return_value() {
    expect_kind(
        "pub fn f() i32 { return 1; }\n\
         pub fn main() void { f(); }",
        ErrorKind::Params,
    );
}

#[test]
fn test_wrong_argument_count() {
    expect_kind(
        "pub fn f(a: i32) i32 { return a; }\n\
         pub fn main() void { _ = f(1, 2); }",
        ErrorKind::Params,
    );
}

#[test]
fn test_wrong_argument_type() {
    expect_kind(
        "pub fn f(a: i32) i32 { return a; }\n\
         pub fn main() void { _ = f(\"text\"); }",
        ErrorKind::Params,
    );
}

#[test]
fn test_builtin_argument_type_checked() {
    expect_kind(
        "pub fn main() void { const n = ifj.length(42); ifj.write(n); }",
        ErrorKind::Params,
    );
}

#[test]
fn test_builtin_arity_checked() {
    expect_kind(
        "pub fn main() void { ifj.write(); }",
        ErrorKind::Params,
    );
}

#[test]
fn test_missing_main() {
    expect_kind(
        "pub fn helper() void { helper(); }",
        ErrorKind::Undefined,
    );
}

#[test]
fn test_main_with_parameters() {
    expect_kind("pub fn main(a: i32) void { ifj.write(a); }", ErrorKind::Params);
}

#[test]
fn test_main_with_return_type() {
    expect_kind(
        "pub fn main() i32 { return 0; }",
        ErrorKind::Params,
    );
}

#[test]
fn test_unused_function() {
    expect_kind(
        "pub fn main() void { }\n\
         pub fn lonely() void { }",
        ErrorKind::OtherSemantic,
    );
}

#[test]
fn test_unused_global_variable() {
    expect_kind(
        "const limit: i32 = 10;\npub fn main() void { }",
        ErrorKind::UnusedVar,
    );
}

#[test]
fn test_unused_element_bind() {
    expect_kind(
        "pub fn main() void {\n\
             var q: ?i32 = ifj.readi32();\n\
             q = null;\n\
             if (q) |v| { } else { }\n\
         }",
        ErrorKind::UnusedVar,
    );
}

#[test]
fn test_element_bind_requires_nullable() {
    expect_kind(
        "pub fn main() void { const x = 1; if (x) |v| { ifj.write(v); } }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_condition_must_be_i32() {
    expect_kind(
        "pub fn main() void { const s = ifj.string(\"a\"); if (s) { } }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_nullable_condition_without_bind_rejected() {
    expect_kind(
        "pub fn main() void { var q: ?i32 = ifj.readi32(); q = null; if (q) { } }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_relational_on_nullable_rejected() {
    expect_kind(
        "pub fn main() void {\n\
             var q: ?i32 = ifj.readi32();\n\
             q = null;\n\
             if (q < 1) { }\n\
         }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_relational_on_slices_rejected() {
    expect_kind(
        "pub fn main() void {\n\
             const a = ifj.string(\"x\");\n\
             if (a < a) { }\n\
         }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_arithmetic_on_slices_rejected() {
    expect_kind(
        "pub fn main() void { const s = ifj.string(\"a\") + ifj.string(\"b\"); ifj.write(s); }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_duplicate_parameter() {
    expect_kind(
        "pub fn f(a: i32, a: i32) i32 { return a; }\n\
         pub fn main() void { _ = f(1, 2); }",
        ErrorKind::Redefinition,
    );
}

#[test]
fn test_parameter_is_constant() {
    expect_kind(
        "pub fn f(a: i32) i32 { a = 2; return a; }\n\
         pub fn main() void { _ = f(1); }",
        ErrorKind::Redefinition,
    );
}

#[test]
fn test_nullable_stored_into_non_nullable() {
    expect_kind(
        "pub fn main() void { var x: i32 = ifj.readi32(); x = 1; ifj.write(x); }",
        ErrorKind::TypeCompat,
    );
}

#[test]
fn test_return_type_mismatch_is_params() {
    expect_kind(
        "pub fn f() i32 { return \"nope\"; }\n\
         pub fn main() void { _ = f(); }",
        ErrorKind::Params,
    );
}
