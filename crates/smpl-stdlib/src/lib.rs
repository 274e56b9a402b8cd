//! SMPL standard library.
//!
//! [`Stdlib`] is a [`NativeModule`]: installing it into a global scope binds
//! the built-in functions (`print`, `input`, `int`, `map`, ...) and the
//! `math` namespace. All console traffic goes through the [`Console`] the
//! library was built with.

pub mod modules;

use std::rc::Rc;

use smpl_eval::{Console, NativeModule, Scope, SemanticError, StdConsole, Value};

/// The standard native bindings.
pub struct Stdlib {
    console: Rc<dyn Console>,
}

impl Stdlib {
    pub fn new(console: Rc<dyn Console>) -> Self {
        Self { console }
    }

    /// A library wired to the process stdio.
    pub fn stdio() -> Self {
        Self::new(Rc::new(StdConsole::new()))
    }

    /// A fresh global scope with every binding installed.
    pub fn globals(&self) -> Result<Scope, SemanticError> {
        let globals = Scope::global();
        globals.install(self)?;
        Ok(globals)
    }
}

impl NativeModule for Stdlib {
    fn bindings(&self) -> Result<Vec<(String, Value)>, SemanticError> {
        let mut bindings = modules::core::bindings(&self.console);
        bindings.extend(modules::convert::bindings());
        bindings.push(("map".to_string(), modules::map::constructor()));
        bindings.push(("math".to_string(), modules::math::namespace()?));
        tracing::debug!(count = bindings.len(), "standard library bindings");
        Ok(bindings)
    }
}
