//! Function values.

use std::fmt;
use std::rc::Rc;

use smpl_types::ast::FnDecl;

use crate::native::NativeFn;
use crate::scope::Scope;

/// A callable value: a user closure or a host function.
pub struct Function {
    name: String,
    kind: FunctionKind,
}

pub enum FunctionKind {
    /// Defined in SMPL. `scope` is the frame that was current when the
    /// definition ran; calls open their frame as its child.
    Closure { scope: Scope, decl: Rc<FnDecl> },
    Native(NativeFn),
}

impl Function {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Empty for anonymous functions.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    pub fn params(&self) -> &[String] {
        match &self.kind {
            FunctionKind::Closure { decl, .. } => &decl.params,
            FunctionKind::Native(native) => native.params(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    pub fn is_native(&self) -> bool {
        matches!(self.kind, FunctionKind::Native(_))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}({})>", self.name, self.params().join(", "))
    }
}

impl fmt::Debug for Function {
    // The captured scope is left out: it usually contains this function.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params())
            .field("native", &self.is_native())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use smpl_types::ast::Block;
    use smpl_types::Span;

    fn decl(params: &[&str]) -> Rc<FnDecl> {
        Rc::new(FnDecl {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Block {
                stmts: Vec::new(),
                span: Span::default(),
            },
        })
    }

    #[test]
    fn closure_contract() {
        let f = Function::new(
            "add",
            FunctionKind::Closure {
                scope: Scope::global(),
                decl: decl(&["a", "b"]),
            },
        );
        assert_eq!(f.name(), "add");
        assert_eq!(f.arity(), 2);
        assert!(!f.is_native());
        assert_eq!(f.to_string(), "<fn add(a, b)>");
    }

    #[test]
    fn native_contract() {
        let f = Function::new(
            "print",
            FunctionKind::Native(NativeFn::unary("data", |_| Ok(Value::Null))),
        );
        assert_eq!(f.arity(), 1);
        assert!(f.is_native());
        assert_eq!(f.to_string(), "<fn print(data)>");
    }

    #[test]
    fn anonymous_function_forms() {
        let value = Value::closure("", Scope::global(), decl(&[]));
        assert_eq!(value.to_string(), "<fn ()>");
        assert_eq!(value.type_name(), "<fn >");
    }
}
