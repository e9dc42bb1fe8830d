//! End-to-end tests driving the `zlc` binary.
//!
//! Each case feeds a program on stdin (or through a file) and checks
//! the exit code and the emitted IFJcode24 stream.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

fn zlc() -> Command {
    Command::cargo_bin("zlc").expect("binary should build")
}

fn source(body: &str) -> String {
    format!("{}{}", PROLOG, body)
}

#[test]
fn test_minimum_program() {
    zlc()
        .write_stdin(source("pub fn main() void { }"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with(".IFJcode24"))
        .stdout(predicate::str::contains("LABEL main"))
        .stdout(predicate::str::contains("CREATEFRAME"))
        .stdout(predicate::str::contains("PUSHFRAME"))
        .stdout(predicate::str::contains("EXIT int@0"));
}

#[test]
fn test_hello_world() {
    zlc()
        .write_stdin(source("pub fn main() void { ifj.write(\"Hello\"); }"))
        .assert()
        .success()
        .stdout(predicate::str::contains("WRITE string@Hello"));
}

#[test]
fn test_unused_variable_exits_9() {
    zlc()
        .write_stdin(source("pub fn main() void { var x: i32 = 1; }"))
        .assert()
        .code(9)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_redefined_function_exits_5() {
    zlc()
        .write_stdin(source(
            "pub fn main() void { }\npub fn main() void { }",
        ))
        .assert()
        .code(5)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_return_without_value_exits_6() {
    zlc()
        .write_stdin(source(
            "pub fn f() i32 { return; }\n\
             pub fn main() void { _ = f(); }",
        ))
        .assert()
        .code(6)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_literal_promotion_accepted() {
    zlc()
        .write_stdin(source(
            "pub fn main() void { var y: f64 = 1; y = 0.5; ifj.write(y); }",
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("MOVE LF@y float@0x1p+0"));
}

#[test]
fn test_non_literal_promotion_exits_7() {
    zlc()
        .write_stdin(source(
            "pub fn main() void { var a: i32 = 1; var y: f64 = a; }",
        ))
        .assert()
        .code(7)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_null_to_non_nullable_exits_8() {
    zlc()
        .write_stdin(source("pub fn main() void { var x: i32 = null; }"))
        .assert()
        .code(8)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_while_with_element_bind() {
    zlc()
        .write_stdin(source(
            "pub fn main() void {\n\
                 var q: ?i32 = ifj.readi32();\n\
                 while (q) |v| { ifj.write(v); q = ifj.readi32(); }\n\
             }",
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("PUSHS nil@nil"))
        .stdout(predicate::str::contains("JUMPIFEQS while_end_"));
}

#[test]
fn test_division_of_mixed_dynamic_types() {
    zlc()
        .write_stdin(source(
            "pub fn main() void {\n\
                 var r = ifj.readi32() / ifj.readf64();\n\
                 r = 0.0;\n\
                 ifj.write(r);\n\
             }",
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("TYPE LF@"))
        .stdout(predicate::str::contains("DIVS"))
        .stdout(predicate::str::contains("INT2FLOATS"))
        .stdout(predicate::str::contains("FLOAT2INTS"));
}

#[test]
fn test_lexical_error_exits_1() {
    zlc()
        .write_stdin(source("pub fn main() void { var x = 09; }"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_syntax_error_exits_2() {
    zlc()
        .write_stdin(source("pub fn main() void { var = 3; }"))
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_prolog_exits_2() {
    zlc()
        .write_stdin("pub fn main() void { }")
        .assert()
        .code(2);
}

#[test]
fn test_input_file_argument() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{}", source("pub fn main() void { ifj.write(42); }")).unwrap();

    zlc()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("WRITE int@42"));
}

#[test]
fn test_unreadable_file_exits_99() {
    zlc()
        .arg("/definitely/not/a/real/path.zl")
        .assert()
        .code(99)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_too_many_arguments_exit_99() {
    zlc()
        .args(["one.zl", "two.zl"])
        .assert()
        .code(99)
        .stderr(predicate::str::contains("error"));
}
