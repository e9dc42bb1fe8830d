//! Multi-character operators, the slice marker and `@import`.

use zlc_util::Result;

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes `= == < <= > >= ! !=`.
    ///
    /// The first character decides the family; a following `=` widens
    /// it, anything else leaves the follower in the stream.
    pub(crate) fn lex_multi_op(&mut self) -> Result<Token> {
        let first = self.cursor.current_char();
        self.cursor.advance();
        let widened = self.cursor.eat('=');
        match (first, widened) {
            ('=', true) => Ok(Token::Eq),
            ('=', false) => Ok(Token::Assign),
            ('<', true) => Ok(Token::LtEq),
            ('<', false) => Ok(Token::Lt),
            ('>', true) => Ok(Token::GtEq),
            ('>', false) => Ok(Token::Gt),
            ('!', true) => Ok(Token::NotEq),
            ('!', false) => Ok(Token::Bang),
            _ => Err(self.error(format!("unexpected character '{}'", first))),
        }
    }

    /// Lexes the `[]` slice-type marker.
    ///
    /// `[` must be immediately followed by `]`; the `u8` keyword is
    /// scanned as a separate token.
    pub(crate) fn lex_slice_marker(&mut self) -> Result<Token> {
        self.cursor.advance(); // '['
        if self.cursor.eat(']') {
            Ok(Token::Slice)
        } else {
            Err(self.error("expected ']' after '['"))
        }
    }

    /// Lexes `@import`.
    ///
    /// `@` admits exactly the letters `import`; any deviation is a
    /// lexical error.
    pub(crate) fn lex_import(&mut self) -> Result<Token> {
        self.cursor.advance(); // '@'
        for expected in "import".chars() {
            if !self.cursor.eat(expected) {
                return Err(self.error("expected 'import' after '@'"));
            }
        }
        // The directive must end exactly after 'import'.
        if self.cursor.current_char().is_ascii_alphanumeric() {
            return Err(self.error("expected 'import' after '@'"));
        }
        Ok(Token::Import)
    }
}
