//! Error handling types shared by every stage of the S-Lang toolchain.
//!
//! All stages report failures through a single [`Error`] type tagged with the
//! stage that raised it. Errors are fatal: the driver prints one diagnostic
//! line and exits, so no stage attempts recovery after constructing one.
//!
//! # Examples
//!
//! ```rust
//! use slang_syntax::error::{parse_logic, Result};
//!
//! fn expect_brace(lexeme: &str) -> Result<()> {
//!     if lexeme != "{" {
//!         return parse_logic(format!("Expected {{ starting a block, got: {}", lexeme));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Which stage of the pipeline produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source file could not be opened, read or written.
    FileProcess,
    /// The lexer met a malformed numeric, char or string literal.
    InvalidLiteral,
    /// The parser met an unexpected token, missing punctuation or a
    /// return-type mismatch.
    ParseLogic,
    /// IR emission could not proceed (unknown name, type mismatch, ...).
    Codegen,
}

/// An error raised while compiling an S-Lang program.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for Error {}

/// A specialized `Result` type for S-Lang compilation stages.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for an `Err` carrying [`ErrorKind::FileProcess`].
pub fn file_process<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(ErrorKind::FileProcess, msg))
}

/// Shorthand for an `Err` carrying [`ErrorKind::InvalidLiteral`].
pub fn invalid_literal<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(ErrorKind::InvalidLiteral, msg))
}

/// Shorthand for an `Err` carrying [`ErrorKind::ParseLogic`].
pub fn parse_logic<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(ErrorKind::ParseLogic, msg))
}

/// Shorthand for an `Err` carrying [`ErrorKind::Codegen`].
pub fn codegen_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(ErrorKind::Codegen, msg))
}
