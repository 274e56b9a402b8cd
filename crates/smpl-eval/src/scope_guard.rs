//! RAII frame switching for the interpreter.
//!
//! Entering a block or a call makes a new frame current. [`ScopedInterpreter`]
//! puts the previous frame back when it is dropped, so every exit path
//! restores it: normal completion, a control signal, an error, or a panic
//! unwinding through the evaluator.

use std::ops::{Deref, DerefMut};

use crate::evaluator::Interpreter;
use crate::scope::Scope;

/// Interpreter access with `frame` as the current scope.
///
/// Derefs to [`Interpreter`]; the frame that was current before is restored
/// on drop.
pub(crate) struct ScopedInterpreter<'a> {
    interpreter: &'a mut Interpreter,
    saved: Option<Scope>,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.interpreter.scope = saved;
        }
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Make `frame` current until the returned guard is dropped.
    pub(crate) fn scoped(&mut self, frame: Scope) -> ScopedInterpreter<'_> {
        let saved = std::mem::replace(&mut self.scope, frame);
        ScopedInterpreter {
            interpreter: self,
            saved: Some(saved),
        }
    }

    /// Run `f` with `frame` as the current scope.
    pub(crate) fn with_frame<T>(
        &mut self,
        frame: Scope,
        f: impl FnOnce(&mut Interpreter) -> T,
    ) -> T {
        let mut scoped = self.scoped(frame);
        f(&mut *scoped)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::console::BufferConsole;
    use crate::value::Value;

    fn interpreter() -> Interpreter {
        Interpreter::new(Scope::global(), Rc::new(BufferConsole::new()))
    }

    #[test]
    fn guard_restores_previous_frame() {
        let mut interp = interpreter();
        let outer = interp.scope().clone();
        {
            let frame = outer.child();
            let scoped = interp.scoped(frame.clone());
            assert!(scoped.scope().ptr_eq(&frame));
        }
        assert!(interp.scope().ptr_eq(&outer));
    }

    #[test]
    fn frame_restored_after_early_return() {
        let mut interp = interpreter();
        let outer = interp.scope().clone();
        let result: Result<(), &str> = interp.with_frame(outer.child(), |inner| {
            inner.scope().define("tmp", Value::Int(1));
            Err("stop")
        });
        assert!(result.is_err());
        assert!(interp.scope().ptr_eq(&outer));
        assert!(outer.get_local("tmp").is_none());
    }
}
