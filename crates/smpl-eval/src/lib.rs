//! SMPL tree-walking evaluator.
//!
//! Executes a parsed [`Program`](smpl_types::ast::Program) directly against a
//! chain of lexical scopes. The global scope is seeded by a native library
//! through [`NativeModule`] before the run starts.

mod builtins;
mod config;
mod console;
mod control;
mod error;
mod evaluator;
mod function;
mod literal;
mod native;
mod operators;
mod property;
mod scope;
mod scope_guard;
mod stack;
mod value;

pub use config::{CallErrorPolicy, EvalConfig, DEFAULT_MAX_CALL_DEPTH};
pub use console::{BufferConsole, Console, StdConsole};
pub use control::{Exec, Unwind};
pub use error::{RunError, SemanticError};
pub use evaluator::{execute, Interpreter};
pub use function::{Function, FunctionKind};
pub use literal::{parse_float, parse_int, parse_str};
pub use native::{Namespace, NativeFn, NativeModule};
pub use operators::{binary, compare, equals, unary};
pub use property::PropertyBag;
pub use scope::Scope;
pub use value::{format_float, ListValue, ObjectValue, StrValue, Value};
