//! S-Lang syntax definitions and abstract syntax tree.
//!
//! This crate provides the foundational types for the S-Lang compiler
//! front-end: token definitions, AST nodes, and the unified error type. All
//! other crates in the workspace depend on these types.
//!
//! The pipeline is layered the obvious way:
//!
//! ```text
//! source text --(slang-lexer)--> tokens --(slang-parser)--> TeaSpill
//!                                          --(slang-codegen)--> textual IR
//! ```
//!
//! The [`ast`] module is the contract between the parser and the IR emitter:
//! the emitter pattern-matches over [`ast::Expression`] and
//! [`ast::Statement`] exactly as laid out there.

pub mod ast;
pub mod error;
pub mod token;

pub use ast::*;
pub use error::{Error, ErrorKind, Result};
pub use token::{Token, TokenKind};
