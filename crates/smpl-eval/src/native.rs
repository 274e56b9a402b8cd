//! Bridge for host-provided functions and libraries.
//!
//! A native function is a Rust closure of zero to three [`Value`] arguments.
//! Libraries group them into [`Namespace`] objects and hand the result to the
//! interpreter through [`NativeModule`], which installs plain name → value
//! bindings into the global [`Scope`](crate::Scope).

use std::fmt;
use std::rc::Rc;

use crate::error::SemanticError;
use crate::value::Value;

/// Result of a native function body.
pub type NativeResult = Result<Value, SemanticError>;

#[derive(Clone)]
enum NativeBody {
    Nullary(Rc<dyn Fn() -> NativeResult>),
    Unary(Rc<dyn Fn(&Value) -> NativeResult>),
    Binary(Rc<dyn Fn(&Value, &Value) -> NativeResult>),
    Ternary(Rc<dyn Fn(&Value, &Value, &Value) -> NativeResult>),
}

/// A host function with a fixed arity.
///
/// Parameter names are for display only; the arity is fixed by which
/// constructor built the function.
#[derive(Clone)]
pub struct NativeFn {
    params: Vec<String>,
    body: NativeBody,
}

impl NativeFn {
    pub fn nullary(body: impl Fn() -> NativeResult + 'static) -> Self {
        Self {
            params: Vec::new(),
            body: NativeBody::Nullary(Rc::new(body)),
        }
    }

    pub fn unary(param: &str, body: impl Fn(&Value) -> NativeResult + 'static) -> Self {
        Self {
            params: vec![param.to_string()],
            body: NativeBody::Unary(Rc::new(body)),
        }
    }

    pub fn binary(
        params: [&str; 2],
        body: impl Fn(&Value, &Value) -> NativeResult + 'static,
    ) -> Self {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: NativeBody::Binary(Rc::new(body)),
        }
    }

    pub fn ternary(
        params: [&str; 3],
        body: impl Fn(&Value, &Value, &Value) -> NativeResult + 'static,
    ) -> Self {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: NativeBody::Ternary(Rc::new(body)),
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Run the body. `args` must match the arity.
    pub fn invoke(&self, args: &[Value]) -> NativeResult {
        match (&self.body, args) {
            (NativeBody::Nullary(f), []) => f(),
            (NativeBody::Unary(f), [a]) => f(a),
            (NativeBody::Binary(f), [a, b]) => f(a, b),
            (NativeBody::Ternary(f), [a, b, c]) => f(a, b, c),
            _ => Err(SemanticError::ArityMismatch {
                expected: self.arity(),
                actual: args.len(),
            }),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder for a named object whose members are native functions, such as
/// the `math` library.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    members: Vec<(String, Value)>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn function(mut self, name: &str, native: NativeFn) -> Self {
        self.members
            .push((name.to_string(), Value::native(name, native)));
        self
    }

    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.members.push((name.to_string(), value));
        self
    }

    /// Build the object. Members are added with the usual duplicate check.
    pub fn build(self) -> Result<Value, SemanticError> {
        let object = Value::named_object(&self.name);
        for (name, value) in self.members {
            object.add_property(&name, value)?;
        }
        Ok(object)
    }
}

/// A library of native bindings for the global scope.
pub trait NativeModule {
    /// Name → value pairs to define, in installation order.
    fn bindings(&self) -> Result<Vec<(String, Value)>, SemanticError>;
}
