//! Non-local exits: `return`, `break`, `continue`, and errors.
//!
//! Every evaluation step returns [`Exec`]. A signal travels up through `?`
//! until a construct absorbs it: loops take `Break` and `Continue`, calls take
//! `Return`. Whatever reaches the top of the program becomes a [`RunError`].

use crate::error::{RunError, SemanticError};
use crate::value::Value;

/// Why evaluation stopped early.
#[derive(Debug, Clone)]
pub enum Unwind {
    Return(Value),
    Break,
    Continue,
    Error(SemanticError),
}

/// Result of executing a statement or evaluating an expression.
pub type Exec<T> = Result<T, Unwind>;

impl From<SemanticError> for Unwind {
    fn from(err: SemanticError) -> Self {
        Unwind::Error(err)
    }
}

impl From<Unwind> for RunError {
    fn from(unwind: Unwind) -> Self {
        match unwind {
            Unwind::Return(_) => RunError::ReturnOutsideFunction,
            Unwind::Break => RunError::BreakOutsideLoop,
            Unwind::Continue => RunError::ContinueOutsideLoop,
            Unwind::Error(err) => RunError::Semantic(err),
        }
    }
}
