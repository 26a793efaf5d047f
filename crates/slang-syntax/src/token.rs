//! Token definitions for the S-Lang lexer.

/// Kinds of tokens produced by the lexer.
///
/// Keyword kinds carry their slang spelling in the token's lexeme
/// (`pluh`, `cookUp`, `fr?`, ...); the two boolean words `facts` and `cap`
/// both lex as [`TokenKind::Bool`] and are told apart by lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // literals
    Int,
    Float,
    Bool,
    Char,
    Str,
    // keywords
    Def,     // pluh
    Extern,  // plug
    Let,     // cookUp
    If,      // fr?
    ElseIf,  // ong?
    Else,    // justLikeThat?
    While,   // holdUp
    Break,   // ghost
    Continue, // rizz
    Return,  // yeet
    Program, // spillingTheTeaAbout
    Identifier,
    /// One of the foldable operator lexemes (`+ - * / % < <= > >= == != =` ...).
    Operator,
    /// Any other single punctuation byte: parentheses, braces, colon, comma, ...
    Complex,
    EndOfFile,
}

/// A token: its kind plus the raw lexeme it was scanned from.
///
/// String and char tokens carry their payload with the quotes stripped;
/// every other token's lexeme is the exact source spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }

    /// The terminal token. Requesting tokens past it keeps returning it.
    pub fn end_of_file() -> Self {
        Self::new(TokenKind::EndOfFile, "")
    }
}
