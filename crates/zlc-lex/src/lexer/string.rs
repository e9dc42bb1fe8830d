//! String literal lexing.

use zlc_util::{Result, Symbol};

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a double-quoted string literal.
    ///
    /// Escape sequences are resolved here, so the token payload holds
    /// the raw bytes. Recognized escapes: `\n`, `\t`, `\r`, `\"`,
    /// `\\` and `\xHH` with exactly two hex digits. A newline or end
    /// of input inside the literal is a lexical error.
    pub(crate) fn lex_string(&mut self) -> Result<Token> {
        self.cursor.advance(); // opening quote

        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(self.error("unterminated string literal"));
            }

            let c = self.cursor.current_char();
            match c {
                '"' => {
                    self.cursor.advance();
                    break;
                },
                '\n' => {
                    return Err(self.error("newline inside string literal"));
                },
                '\\' => {
                    self.cursor.advance();
                    content.push(self.lex_escape()?);
                },
                _ => {
                    content.push(c);
                    self.cursor.advance();
                },
            }
        }

        Ok(Token::Str(Symbol::intern(&content)))
    }

    /// Resolves one escape sequence, positioned after the backslash.
    fn lex_escape(&mut self) -> Result<char> {
        let c = self.cursor.current_char();
        self.cursor.advance();
        match c {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            'x' => {
                let mut value = 0u32;
                for _ in 0..2 {
                    let h = self.cursor.current_char();
                    match h.to_digit(16) {
                        Some(digit) => {
                            value = value * 16 + digit;
                            self.cursor.advance();
                        },
                        None => {
                            return Err(self.error("\\x escape requires two hex digits"));
                        },
                    }
                }
                // Two hex digits are at most 0xFF, always a valid char.
                Ok(char::from_u32(value).unwrap_or('\0'))
            },
            _ => Err(self.error(format!("unknown escape sequence '\\{}'", c))),
        }
    }
}
