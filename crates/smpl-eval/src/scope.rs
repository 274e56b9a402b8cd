//! Lexical scope chain.
//!
//! Each [`Scope`] is a shared handle to one frame of bindings plus its parent.
//! Blocks and calls push a child frame; closures keep the frame that was
//! current at their definition alive for as long as they are reachable.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::SemanticError;
use crate::native::NativeModule;
use crate::value::Value;

/// A shared handle to one scope frame.
#[derive(Clone)]
pub struct Scope(Rc<Frame>);

struct Frame {
    vars: RefCell<FxHashMap<String, Value>>,
    parent: Option<Scope>,
}

impl Scope {
    /// A root frame with no parent.
    pub fn global() -> Self {
        Scope(Rc::new(Frame {
            vars: RefCell::new(FxHashMap::default()),
            parent: None,
        }))
    }

    /// A new empty frame whose parent is `self`.
    pub fn child(&self) -> Self {
        Scope(Rc::new(Frame {
            vars: RefCell::new(FxHashMap::default()),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// Number of frames between this one and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.parent();
        while let Some(scope) = frame {
            depth += 1;
            frame = scope.parent();
        }
        depth
    }

    /// The innermost frame on the chain that binds `name`.
    pub fn find(&self, name: &str) -> Option<Scope> {
        let mut scope = self;
        loop {
            if scope.0.vars.borrow().contains_key(name) {
                return Some(scope.clone());
            }
            scope = scope.parent()?;
        }
    }

    /// Read `name` from the nearest frame that binds it.
    pub fn read(&self, name: &str) -> Result<Value, SemanticError> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.0.vars.borrow().get(name) {
                return Ok(value.clone());
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return Err(SemanticError::UndefinedVariable(name.to_string())),
            }
        }
    }

    /// Rebind `name` in the frame that defines it, or bind it here when no
    /// frame does.
    ///
    /// That frame is chosen before `value` runs, so a right-hand side that
    /// creates the name in a nested frame does not move the assignment.
    pub fn write<E>(
        &self,
        name: &str,
        value: impl FnOnce() -> Result<Value, E>,
    ) -> Result<(), E> {
        let owner = self.find(name).unwrap_or_else(|| self.clone());
        owner.define(name, value()?);
        Ok(())
    }

    /// Bind `name` in this frame, shadowing any outer binding.
    pub fn define(&self, name: &str, value: Value) {
        self.0.vars.borrow_mut().insert(name.to_string(), value);
    }

    /// The binding of `name` in this frame only.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.0.vars.borrow().get(name).cloned()
    }

    /// Define every binding of a native library in this frame.
    pub fn install(&self, module: &dyn NativeModule) -> Result<(), SemanticError> {
        for (name, value) in module.bindings()? {
            self.define(&name, value);
        }
        Ok(())
    }

    /// Names bound in this frame, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.vars.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Scope {
    // Bound values can hold closures over this very frame; print names only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("depth", &self.depth())
            .field("names", &self.local_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeFn;

    fn ok(value: Value) -> impl FnOnce() -> Result<Value, SemanticError> {
        move || Ok(value)
    }

    #[test]
    fn read_walks_outward() {
        let global = Scope::global();
        global.define("x", Value::Int(1));
        let inner = global.child().child();
        assert_eq!(inner.read("x"), Ok(Value::Int(1)));
        assert_eq!(inner.depth(), 2);
    }

    #[test]
    fn read_undefined() {
        let err = Scope::global().child().read("nope").unwrap_err();
        assert_eq!(err.to_string(), "Variable nope is undefined.");
    }

    #[test]
    fn write_rebinds_in_defining_frame() {
        let global = Scope::global();
        global.define("x", Value::Int(1));
        let inner = global.child();
        inner.write("x", ok(Value::Int(2))).unwrap();
        assert_eq!(global.get_local("x"), Some(Value::Int(2)));
        assert!(inner.get_local("x").is_none());
    }

    #[test]
    fn write_binds_locally_when_unbound() {
        let global = Scope::global();
        let inner = global.child();
        inner.write("y", ok(Value::Int(3))).unwrap();
        assert_eq!(inner.get_local("y"), Some(Value::Int(3)));
        assert!(global.find("y").is_none());
    }

    #[test]
    fn write_picks_the_frame_before_computing_the_value() {
        let global = Scope::global();
        let inner = global.child();
        inner
            .write("z", || {
                global.define("z", Value::Int(1));
                Ok::<_, SemanticError>(Value::Int(2))
            })
            .unwrap();
        assert_eq!(inner.get_local("z"), Some(Value::Int(2)));
        assert_eq!(global.get_local("z"), Some(Value::Int(1)));
    }

    #[test]
    fn write_leaves_binding_alone_on_error() {
        let global = Scope::global();
        let result = global.write("w", || Err(SemanticError::DivisionByZero));
        assert_eq!(result, Err(SemanticError::DivisionByZero));
        assert!(global.get_local("w").is_none());
    }

    #[test]
    fn define_shadows() {
        let global = Scope::global();
        global.define("x", Value::Int(1));
        let inner = global.child();
        inner.define("x", Value::Int(9));
        assert_eq!(inner.read("x"), Ok(Value::Int(9)));
        assert_eq!(global.read("x"), Ok(Value::Int(1)));
        assert!(inner.find("x").unwrap().ptr_eq(&inner));
    }

    #[test]
    fn install_defines_module_bindings() {
        struct Tiny;
        impl NativeModule for Tiny {
            fn bindings(&self) -> Result<Vec<(String, Value)>, SemanticError> {
                Ok(vec![
                    ("one".into(), Value::Int(1)),
                    (
                        "zero".into(),
                        Value::native("zero", NativeFn::nullary(|| Ok(Value::Int(0)))),
                    ),
                ])
            }
        }
        let global = Scope::global();
        global.install(&Tiny).unwrap();
        assert_eq!(global.local_names(), vec!["one", "zero"]);
        assert_eq!(format!("{global:?}"), r#"Scope { depth: 0, names: ["one", "zero"] }"#);
    }
}
