//! SMPL parser: converts a token stream into a syntax tree.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{parse_source, ParseResult, Parser};
