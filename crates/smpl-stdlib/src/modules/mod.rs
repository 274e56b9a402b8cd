//! Groups of native bindings.

pub mod convert;
pub mod core;
pub mod map;
pub mod math;

use smpl_eval::{NativeFn, Value};

/// A named global function binding.
pub(crate) fn global(name: &str, native: NativeFn) -> (String, Value) {
    (name.to_string(), Value::native(name, native))
}
