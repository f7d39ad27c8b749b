//! TypeScript declaration file (.d.ts) parser for paramscope.
//!
//! This crate provides a recursive descent parser for TypeScript declaration
//! files, converting them into an AST that the schema extractor walks to find
//! exported classes, their constructors, and parameter interfaces. It also
//! ships the export flattener used by `paramscope flatten`.

mod ast;
mod flatten;
mod lexer;
mod parser;

pub use ast::*;
pub use flatten::flatten_exports;
pub use lexer::{Keyword, Lexer, Span, Token, TokenKind};
pub use parser::{parse, ParseError, ParseResult};
