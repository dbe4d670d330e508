//! Lexer and parser for TypeScript type declarations.
//!
//! This crate turns `.ts`/`.d.ts` source text into a span-carrying syntax
//! tree. Parsing is error tolerant: malformed statements or members are
//! reported and skipped, and the rest of the file is still available.

mod ast;
mod lexer;
mod parser;
mod walk;

pub use ast::*;
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::{parse, ParseError, ParseResult, Parsed, MAX_NESTING};
pub use walk::{Node, NodeKind};
