//! Whole-scanner edge case and property tests.

use proptest::prelude::*;
use zlc_util::Symbol;

use crate::{Lexer, Token};

fn lex_all(source: &str) -> Result<Vec<Token>, zlc_util::CompileError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::Eof => return Ok(tokens),
            token => tokens.push(token),
        }
    }
}

#[test]
fn test_prolog_token_sequence() {
    let tokens = lex_all("const ifj = @import(\"ifj24.zig\");").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Const,
            Token::Ident(Symbol::intern("ifj")),
            Token::Assign,
            Token::Import,
            Token::LParen,
            Token::Str(Symbol::intern("ifj24.zig")),
            Token::RParen,
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_function_header_tokens() {
    let tokens = lex_all("pub fn main() void {}").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Pub,
            Token::Fn,
            Token::Ident(Symbol::intern("main")),
            Token::LParen,
            Token::RParen,
            Token::Void,
            Token::LBrace,
            Token::RBrace,
        ]
    );
}

#[test]
fn test_nullable_slice_type_tokens() {
    let tokens = lex_all("var s: ?[]u8 = null;").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Var,
            Token::Ident(Symbol::intern("s")),
            Token::Colon,
            Token::Question,
            Token::Slice,
            Token::U8,
            Token::Assign,
            Token::Null,
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_element_bind_tokens() {
    let tokens = lex_all("while (q) |v| {}").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::While,
            Token::LParen,
            Token::Ident(Symbol::intern("q")),
            Token::RParen,
            Token::Pipe,
            Token::Ident(Symbol::intern("v")),
            Token::Pipe,
            Token::LBrace,
            Token::RBrace,
        ]
    );
}

#[test]
fn test_builtin_call_tokens() {
    let tokens = lex_all("ifj.write(\"x\");").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Ident(Symbol::intern("ifj")),
            Token::Dot,
            Token::Ident(Symbol::intern("write")),
            Token::LParen,
            Token::Str(Symbol::intern("x")),
            Token::RParen,
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_no_whitespace_needed_between_tokens() {
    let tokens = lex_all("1+2*3<=x").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Int(1),
            Token::Plus,
            Token::Int(2),
            Token::Star,
            Token::Int(3),
            Token::LtEq,
            Token::Ident(Symbol::intern("x")),
        ]
    );
}

#[test]
fn test_comment_only_input() {
    assert_eq!(lex_all("// just a comment").unwrap(), vec![]);
    assert_eq!(lex_all("").unwrap(), vec![]);
}

#[test]
fn test_error_span_points_at_offender() {
    let mut lexer = Lexer::new("var x = 09;");
    lexer.next_token().unwrap(); // var
    lexer.next_token().unwrap(); // x
    lexer.next_token().unwrap(); // =
    let err = lexer.next_token().unwrap_err();
    let span = err.span.unwrap();
    assert_eq!(span.line, 1);
    assert_eq!(span.column, 9);
}

// =============================================================================
// PROPERTY: re-lexing rendered tokens preserves kinds and payloads
// =============================================================================

fn render(token: &Token) -> String {
    match token {
        Token::Ident(s) => s.as_str().to_string(),
        Token::Int(v) => v.to_string(),
        Token::Float(v) => {
            if v.fract() == 0.0 {
                format!("{:.1}", v)
            } else {
                v.to_string()
            }
        },
        Token::Str(s) => {
            let mut out = String::from("\"");
            for c in s.as_str().chars() {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    _ => out.push(c),
                }
            }
            out.push('"');
            out
        },
        Token::Const => "const".into(),
        Token::Var => "var".into(),
        Token::While => "while".into(),
        Token::Return => "return".into(),
        Token::Plus => "+".into(),
        Token::Minus => "-".into(),
        Token::Star => "*".into(),
        Token::Slash => "/".into(),
        Token::LtEq => "<=".into(),
        Token::Eq => "==".into(),
        Token::Semicolon => ";".into(),
        other => panic!("render: unsupported token {:?}", other),
    }
}

fn arb_token() -> impl Strategy<Value = Token> {
    prop_oneof![
        Just(Token::Const),
        Just(Token::Var),
        Just(Token::While),
        Just(Token::Return),
        Just(Token::Plus),
        Just(Token::Minus),
        Just(Token::Star),
        Just(Token::Slash),
        Just(Token::LtEq),
        Just(Token::Eq),
        Just(Token::Semicolon),
        (0i64..1_000_000).prop_map(Token::Int),
        (0u32..100_000, 1u32..1000)
            .prop_map(|(a, b)| Token::Float(f64::from(a) + 1.0 / f64::from(b))),
        "[a-z][a-z0-9_]{0,8}"
            .prop_filter("not a keyword", |s| Token::keyword(s).is_none())
            .prop_map(|s| Token::Ident(Symbol::intern(&s))),
        "[a-zA-Z0-9 .,!?]{0,12}".prop_map(|s| Token::Str(Symbol::intern(&s))),
    ]
}

proptest! {
    #[test]
    fn prop_token_round_trip(tokens in proptest::collection::vec(arb_token(), 0..24)) {
        let source = tokens
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(" ");
        let relexed = lex_all(&source).expect("rendered source must lex");
        prop_assert_eq!(relexed, tokens);
    }
}
