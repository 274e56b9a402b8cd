//! Runtime error types for the SMPL evaluator.

use crate::value::Value;

/// Semantic error raised while evaluating a program.
///
/// This is the only error kind the value model and the evaluator produce.
/// Native libraries report their own failures through [`Custom`](Self::Custom).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("Variable {0} is undefined.")]
    UndefinedVariable(String),

    #[error("Property {0} is undefined.")]
    UndefinedProperty(String),

    /// `add` on a name the bag already holds.
    #[error("Property {0} already exists")]
    DuplicateProperty(String),

    /// `set` on a name the bag does not hold.
    #[error("Can't set property {0}")]
    MissingProperty(String),

    #[error("Expected {expected} got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Unsupported operation {op} on {left} and {right}")]
    UnsupportedBinary {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("Unsupported operation {op} on {operand}")]
    UnsupportedUnary { op: &'static str, operand: String },

    #[error("Expected {expected} args got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Function {0} already exists.")]
    FunctionExists(String),

    #[error("Index {index} out of bound 0..{len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: i64, to: i64 },

    #[error("Undefined escape: '{0}'")]
    UndefinedEscape(char),

    #[error("Invalid {kind} literal '{raw}'")]
    InvalidLiteral { kind: &'static str, raw: String },

    #[error("String of length {len} can't be repeated {count} times")]
    RepeatTooLong { len: usize, count: i64 },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Maximum call depth {0} exceeded")]
    CallDepthExceeded(usize),

    /// `break` / `continue` that escaped a function body.
    #[error("{0} outside loop")]
    JumpOutsideLoop(&'static str),

    #[error("{0}")]
    Custom(String),
}

impl SemanticError {
    /// `Expected <expected> got <type of actual>`.
    pub fn expected(expected: impl Into<String>, actual: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.type_name(),
        }
    }

    pub fn unsupported(op: &'static str, left: &Value, right: &Value) -> Self {
        Self::UnsupportedBinary {
            op,
            left: left.type_name(),
            right: right.type_name(),
        }
    }

    pub fn unsupported_unary(op: &'static str, operand: &Value) -> Self {
        Self::UnsupportedUnary {
            op,
            operand: operand.type_name(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Terminal failure of a whole program run, as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("Return outside function")]
    ReturnOutsideFunction,

    #[error("Break outside loop")]
    BreakOutsideLoop,

    #[error("Continue outside loop")]
    ContinueOutsideLoop,
}

impl RunError {
    /// `true` for a control signal that escaped its construct.
    pub fn is_stray_signal(&self) -> bool {
        !matches!(self, RunError::Semantic(_))
    }
}
