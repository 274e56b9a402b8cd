//! Shared types for the SMPL interpreter.
//!
//! This crate defines the syntax tree consumed by the evaluator, source
//! spans, and the structured diagnostics produced by the front end.

mod error;
mod span;
pub mod ast;

pub use error::{Diagnostics, ErrorCode, SmplError, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the SMPL front end.
pub type Result<T> = std::result::Result<T, SmplError>;
