//! Number literal lexing.

use zlc_util::Result;

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an integer or float literal.
    ///
    /// Integers match `0 | [1-9][0-9]*`; a digit directly after a
    /// leading zero is a lexical error. A float continues an integer
    /// part with `.` and at least one digit, optionally followed by an
    /// `e`/`E` exponent with an optional sign and at least one digit.
    pub(crate) fn lex_number(&mut self) -> Result<Token> {
        let start = self.cursor.position();

        if self.cursor.current_char() == '0' {
            self.cursor.advance();
            if self.cursor.current_char().is_ascii_digit() {
                return Err(self.error("integer literal with leading zero"));
            }
        } else {
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let mut is_float = false;

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        } else if self.cursor.current_char() == '.' {
            return Err(self.error("expected digit after decimal point"));
        }

        if matches!(self.cursor.current_char(), 'e' | 'E') {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
            }
            if !self.cursor.current_char().is_ascii_digit() {
                return Err(self.error("exponent has no digits"));
            }
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        // A literal must end at a delimiter; an identifier character
        // glued to it has no valid transition.
        let follower = self.cursor.current_char();
        if follower.is_ascii_alphanumeric() || follower == '_' {
            return Err(self.error(format!(
                "unexpected character '{}' in number literal",
                follower
            )));
        }

        let text = self.cursor.slice_from(start);
        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Token::Float(value)),
                _ => Err(self.error(format!("invalid float literal '{}'", text))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(Token::Int(value)),
                Err(_) => Err(self.error(format!("integer literal '{}' out of range", text))),
            }
        }
    }
}
