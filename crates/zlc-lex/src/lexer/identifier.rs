//! Identifier, keyword and discard-sink lexing.

use zlc_util::{Result, Symbol};

use crate::token::Token;
use crate::Lexer;

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    /// Lexes an identifier, a keyword, or the discard sink `_`.
    ///
    /// Identifiers match `[A-Za-z_][A-Za-z0-9_]*`. A bare underscore is
    /// the discard sink; an underscore followed by more identifier
    /// characters is an ordinary identifier.
    pub(crate) fn lex_identifier(&mut self) -> Result<Token> {
        let start = self.cursor.position();

        if self.cursor.current_char() == '_' {
            self.cursor.advance();
            if !is_ident_continue(self.cursor.current_char()) {
                return Ok(Token::Underscore);
            }
        }

        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let word = self.cursor.slice_from(start);
        match Token::keyword(word) {
            Some(keyword) => Ok(keyword),
            None => Ok(Token::Ident(Symbol::intern(word))),
        }
    }
}
