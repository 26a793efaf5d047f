//! S-Lang lexer: converts source text into tokens, one at a time.
//!
//! The scanner is pull-based: [`Lexer::next_token`] returns the next token
//! from the source buffer and is the only public operation. Once the buffer
//! is exhausted it keeps returning [`TokenKind::EndOfFile`].
//!
//! Comment syntax:
//! - `Cancelled` discards the rest of the line;
//! - `Blocked` discards everything up to and including the word `Unblocked`.
//!
//! Only the ASCII subset of the input is meaningful; any byte that is not
//! whitespace, a literal, an identifier or an operator is emitted verbatim as
//! a single [`TokenKind::Complex`] token and left for the parser to reject.

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use slang_syntax::error::{invalid_literal, Result};
use slang_syntax::token::{Token, TokenKind};

static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("pluh", TokenKind::Def),
        ("plug", TokenKind::Extern),
        ("cookUp", TokenKind::Let),
        ("fr?", TokenKind::If),
        ("ong?", TokenKind::ElseIf),
        ("justLikeThat?", TokenKind::Else),
        ("holdUp", TokenKind::While),
        ("ghost", TokenKind::Break),
        ("rizz", TokenKind::Continue),
        ("yeet", TokenKind::Return),
        ("spillingTheTeaAbout", TokenKind::Program),
        ("facts", TokenKind::Bool),
        ("cap", TokenKind::Bool),
    ])
});

/// A byte may start an operator lexeme.
fn is_operator(byte: u8) -> bool {
    matches!(
        byte,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'<' | b'>' | b'=' | b'!'
    )
}

/// Pair rule for operator folding: `< > = !` may fold a following `=`;
/// the arithmetic operators never extend.
fn folds(last: u8, next: u8) -> bool {
    matches!(last, b'<' | b'>' | b'=' | b'!') && next == b'='
}

/// Streaming byte scanner over a source buffer.
///
/// Holds a cursor and a one-byte `current` register; past the end of the
/// buffer the register reads as NUL, so end-of-file handling never depends on
/// the input carrying its own terminator.
pub struct Lexer {
    src: Vec<u8>,
    pos: usize,
    current: u8,
}

impl Lexer {
    /// Create a new lexer over the given source string.
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            src: input.as_bytes().to_vec(),
            pos: 0,
            current: 0,
        };
        lexer.advance();
        lexer
    }

    fn advance(&mut self) {
        if self.pos < self.src.len() {
            self.current = self.src[self.pos];
            self.pos += 1;
        } else {
            self.current = 0;
        }
    }

    /// Consume `word` if the stream (starting at `current`) spells it out.
    /// Either the whole word is consumed and `current` ends up on the byte
    /// right after it, or the scanner is left untouched.
    fn matches_word(&mut self, word: &str) -> bool {
        let bytes = word.as_bytes();
        if self.current != bytes[0] {
            return false;
        }
        let rest = &self.src[self.pos..];
        if rest.len() < bytes.len() - 1 || rest[..bytes.len() - 1] != bytes[1..] {
            return false;
        }
        self.pos += bytes.len() - 1;
        self.advance();
        true
    }

    /// Scan and return the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        while self.current.is_ascii_whitespace() {
            self.advance();
        }

        // Single-line comment: discard through the line terminator.
        if self.matches_word("Cancelled") {
            debug!("lexer: skipping line comment");
            while self.current != 0 && self.current != b'\n' && self.current != b'\r' {
                self.advance();
            }
            if self.current != 0 {
                self.advance();
                return self.next_token();
            }
        }

        // Block comment: discard until `Unblocked` is consumed.
        if self.matches_word("Blocked") {
            debug!("lexer: skipping block comment");
            while self.current != 0 {
                if self.matches_word("Unblocked") {
                    return self.next_token();
                }
                self.advance();
            }
        }

        if self.current == b'\'' {
            self.advance();
            let value = self.current;
            self.advance();
            if self.current != b'\'' {
                return invalid_literal(format!("Invalid char token: {}", value as char));
            }
            self.advance();
            debug!("lexer: char '{}'", value as char);
            return Ok(Token::new(TokenKind::Char, (value as char).to_string()));
        }

        if self.current == b'"' {
            let mut value = String::new();
            self.advance();
            while self.current != b'"' {
                if self.current == 0 {
                    return invalid_literal(format!("Invalid string token: {value}"));
                }
                value.push(self.current as char);
                self.advance();
            }
            self.advance();
            debug!("lexer: string \"{value}\"");
            return Ok(Token::new(TokenKind::Str, value));
        }

        if self.current.is_ascii_digit() || self.current == b'.' {
            let mut text = String::new();
            let mut decimal_found = false;
            while self.current.is_ascii_digit() || self.current == b'.' {
                if self.current == b'.' {
                    if decimal_found {
                        return invalid_literal(format!(
                            "More than one decimal point in number: {text}"
                        ));
                    }
                    decimal_found = true;
                }
                text.push(self.current as char);
                self.advance();
            }
            let kind = if decimal_found {
                TokenKind::Float
            } else {
                TokenKind::Int
            };
            debug!("lexer: number {text}");
            return Ok(Token::new(kind, text));
        }

        if self.current.is_ascii_alphabetic() {
            let mut ident = String::new();
            while self.current.is_ascii_alphanumeric()
                || self.current == b'_'
                || self.current == b'?'
            {
                ident.push(self.current as char);
                self.advance();
            }
            let kind = KEYWORDS
                .get(ident.as_str())
                .copied()
                .unwrap_or(TokenKind::Identifier);
            debug!("lexer: identifier {ident}");
            return Ok(Token::new(kind, ident));
        }

        if self.current == 0 {
            debug!("lexer: end of file");
            return Ok(Token::end_of_file());
        }

        let first = self.current;
        self.advance();
        if !is_operator(first) {
            debug!("lexer: complex {}", first as char);
            return Ok(Token::new(TokenKind::Complex, (first as char).to_string()));
        }

        let mut op = String::from(first as char);
        let mut last = first;
        while folds(last, self.current) {
            op.push(self.current as char);
            last = self.current;
            self.advance();
        }
        debug!("lexer: operator {op}");
        Ok(Token::new(TokenKind::Operator, op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slang_syntax::error::ErrorKind;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tk = lexer.next_token().expect("lexing should succeed");
            let done = tk.kind == TokenKind::EndOfFile;
            out.push(tk);
            if done {
                break;
            }
        }
        out
    }

    fn tk(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme)
    }

    #[test]
    fn return_statement() {
        assert_eq!(
            tokens("yeet 1337"),
            vec![
                tk(TokenKind::Return, "yeet"),
                tk(TokenKind::Int, "1337"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn end_of_file_is_idempotent() {
        let mut lexer = Lexer::new("pluh");
        assert_eq!(lexer.next_token().unwrap(), tk(TokenKind::Def, "pluh"));
        assert_eq!(lexer.next_token().unwrap(), Token::end_of_file());
        assert_eq!(lexer.next_token().unwrap(), Token::end_of_file());
        assert_eq!(lexer.next_token().unwrap(), Token::end_of_file());
    }

    #[test]
    fn extern_declaration() {
        assert_eq!(
            tokens("plug func(x : int) : int"),
            vec![
                tk(TokenKind::Extern, "plug"),
                tk(TokenKind::Identifier, "func"),
                tk(TokenKind::Complex, "("),
                tk(TokenKind::Identifier, "x"),
                tk(TokenKind::Complex, ":"),
                tk(TokenKind::Identifier, "int"),
                tk(TokenKind::Complex, ")"),
                tk(TokenKind::Complex, ":"),
                tk(TokenKind::Identifier, "int"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn let_with_initializer() {
        assert_eq!(
            tokens("cookUp hello: int = 1337"),
            vec![
                tk(TokenKind::Let, "cookUp"),
                tk(TokenKind::Identifier, "hello"),
                tk(TokenKind::Complex, ":"),
                tk(TokenKind::Identifier, "int"),
                tk(TokenKind::Operator, "="),
                tk(TokenKind::Int, "1337"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            tokens("1 12 -123 1.234567 facts cap 'a' \"hello\" 31.87"),
            vec![
                tk(TokenKind::Int, "1"),
                tk(TokenKind::Int, "12"),
                tk(TokenKind::Operator, "-"),
                tk(TokenKind::Int, "123"),
                tk(TokenKind::Float, "1.234567"),
                tk(TokenKind::Bool, "facts"),
                tk(TokenKind::Bool, "cap"),
                tk(TokenKind::Char, "a"),
                tk(TokenKind::Str, "hello"),
                tk(TokenKind::Float, "31.87"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn operator_folding() {
        assert_eq!(
            tokens("<="),
            vec![tk(TokenKind::Operator, "<="), Token::end_of_file()]
        );
        // Whitespace blocks folding: two separate operator tokens.
        assert_eq!(
            tokens("< ="),
            vec![
                tk(TokenKind::Operator, "<"),
                tk(TokenKind::Operator, "="),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn operators_in_context() {
        assert_eq!(
            tokens("((1 + 2 * 3 >= 4) != facts) == cap"),
            vec![
                tk(TokenKind::Complex, "("),
                tk(TokenKind::Complex, "("),
                tk(TokenKind::Int, "1"),
                tk(TokenKind::Operator, "+"),
                tk(TokenKind::Int, "2"),
                tk(TokenKind::Operator, "*"),
                tk(TokenKind::Int, "3"),
                tk(TokenKind::Operator, ">="),
                tk(TokenKind::Int, "4"),
                tk(TokenKind::Complex, ")"),
                tk(TokenKind::Operator, "!="),
                tk(TokenKind::Bool, "facts"),
                tk(TokenKind::Complex, ")"),
                tk(TokenKind::Operator, "=="),
                tk(TokenKind::Bool, "cap"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn prototype_with_void_return() {
        assert_eq!(
            tokens("greeting_func(hola: int): npc"),
            vec![
                tk(TokenKind::Identifier, "greeting_func"),
                tk(TokenKind::Complex, "("),
                tk(TokenKind::Identifier, "hola"),
                tk(TokenKind::Complex, ":"),
                tk(TokenKind::Identifier, "int"),
                tk(TokenKind::Complex, ")"),
                tk(TokenKind::Complex, ":"),
                tk(TokenKind::Identifier, "npc"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn nested_control_flow() {
        assert_eq!(
            tokens(
                r#"holdUp hello > 1 {
    fr? hola % 2 == 3 {
        ghost
    } ong? bonjour % 4 == 5 {
        rizz
    } justLikeThat? {
        ghost
    }
    }"#
            ),
            vec![
                tk(TokenKind::While, "holdUp"),
                tk(TokenKind::Identifier, "hello"),
                tk(TokenKind::Operator, ">"),
                tk(TokenKind::Int, "1"),
                tk(TokenKind::Complex, "{"),
                tk(TokenKind::If, "fr?"),
                tk(TokenKind::Identifier, "hola"),
                tk(TokenKind::Operator, "%"),
                tk(TokenKind::Int, "2"),
                tk(TokenKind::Operator, "=="),
                tk(TokenKind::Int, "3"),
                tk(TokenKind::Complex, "{"),
                tk(TokenKind::Break, "ghost"),
                tk(TokenKind::Complex, "}"),
                tk(TokenKind::ElseIf, "ong?"),
                tk(TokenKind::Identifier, "bonjour"),
                tk(TokenKind::Operator, "%"),
                tk(TokenKind::Int, "4"),
                tk(TokenKind::Operator, "=="),
                tk(TokenKind::Int, "5"),
                tk(TokenKind::Complex, "{"),
                tk(TokenKind::Continue, "rizz"),
                tk(TokenKind::Complex, "}"),
                tk(TokenKind::Else, "justLikeThat?"),
                tk(TokenKind::Complex, "{"),
                tk(TokenKind::Break, "ghost"),
                tk(TokenKind::Complex, "}"),
                tk(TokenKind::Complex, "}"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn comments_do_not_change_the_token_stream() {
        let bare = r#"holdUp hello > 1 {
    fr? hola % 2 == 3 {
        ghost
    }
    }"#;
        let commented = r#"holdUp hello > 1 {
    fr? hola % 2 == 3 {
        Cancelled this line should be ignored
        ghost
        Blocked this line should be ignored
        also this line should be ignored
        maybe this line too
        Unblocked
    }
    }"#;
        assert_eq!(tokens(bare), tokens(commented));
    }

    #[test]
    fn comment_word_prefixes_still_lex_as_identifiers() {
        assert_eq!(
            tokens("Cancel Block"),
            vec![
                tk(TokenKind::Identifier, "Cancel"),
                tk(TokenKind::Identifier, "Block"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn line_comment_at_end_of_input() {
        assert_eq!(
            tokens("yeet 0 Cancelled trailing words"),
            vec![
                tk(TokenKind::Return, "yeet"),
                tk(TokenKind::Int, "0"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn call_token_stream() {
        assert_eq!(
            tokens("yap(1 + 2)"),
            vec![
                tk(TokenKind::Identifier, "yap"),
                tk(TokenKind::Complex, "("),
                tk(TokenKind::Int, "1"),
                tk(TokenKind::Operator, "+"),
                tk(TokenKind::Int, "2"),
                tk(TokenKind::Complex, ")"),
                Token::end_of_file(),
            ]
        );
    }

    #[test]
    fn double_decimal_point_is_rejected() {
        let mut lexer = Lexer::new("1.2.3");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLiteral);
    }

    #[test]
    fn two_byte_char_literal_is_rejected() {
        let mut lexer = Lexer::new("'ab'");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLiteral);
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let mut lexer = Lexer::new("\"no closing quote");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLiteral);
    }

    #[test]
    fn unterminated_char_is_rejected() {
        let mut lexer = Lexer::new("'a");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLiteral);
    }
}
