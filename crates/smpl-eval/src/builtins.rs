//! Built-in methods of strings and lists.
//!
//! Each closure captures the shared text or item storage, not the value that
//! owns the bag, so a bag never keeps its own owner alive.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SemanticError;
use crate::native::NativeFn;
use crate::property::PropertyBag;
use crate::value::Value;

fn method(bag: &PropertyBag, name: &str, native: NativeFn) {
    bag.define(name, Value::native(name, native));
}

/// `index` as a position in `0..len`.
fn checked_index(index: i64, len: usize) -> Result<usize, SemanticError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(SemanticError::IndexOutOfBounds { index, len })
}

// ── Strings ───────────────────────────────────────────────────────────────────

/// Positions count characters, not bytes.
pub(crate) fn string_methods(text: &Rc<str>) -> PropertyBag {
    let bag = PropertyBag::new();

    let t = Rc::clone(text);
    method(
        &bag,
        "len",
        NativeFn::nullary(move || Ok(Value::Int(t.chars().count() as i64))),
    );

    let t = Rc::clone(text);
    method(
        &bag,
        "at",
        NativeFn::unary("index", move |index| {
            let i = checked_index(index.expect_int()?, t.chars().count())?;
            let ch: String = t.chars().skip(i).take(1).collect();
            Ok(Value::str(ch))
        }),
    );

    let t = Rc::clone(text);
    method(
        &bag,
        "sub",
        NativeFn::binary(["from", "to"], move |from, to| {
            let len = t.chars().count() as i64;
            let from = from.expect_int()?.clamp(0, len);
            let to = to.expect_int()?.clamp(0, len);
            if from > to {
                return Err(SemanticError::InvalidRange { from, to });
            }
            let sub: String = t
                .chars()
                .skip(from as usize)
                .take((to - from) as usize)
                .collect();
            Ok(Value::str(sub))
        }),
    );

    let t = Rc::clone(text);
    method(
        &bag,
        "upper",
        NativeFn::nullary(move || Ok(Value::str(t.to_uppercase()))),
    );

    let t = Rc::clone(text);
    method(
        &bag,
        "lower",
        NativeFn::nullary(move || Ok(Value::str(t.to_lowercase()))),
    );

    bag
}

// ── Lists ─────────────────────────────────────────────────────────────────────

pub(crate) fn list_methods(items: &Rc<RefCell<Vec<Value>>>) -> PropertyBag {
    let bag = PropertyBag::new();

    let v = Rc::clone(items);
    method(
        &bag,
        "len",
        NativeFn::nullary(move || Ok(Value::Int(v.borrow().len() as i64))),
    );

    let v = Rc::clone(items);
    method(
        &bag,
        "at",
        NativeFn::unary("index", move |index| {
            let items = v.borrow();
            let i = checked_index(index.expect_int()?, items.len())?;
            Ok(items[i].clone())
        }),
    );

    let v = Rc::clone(items);
    method(
        &bag,
        "set",
        NativeFn::binary(["index", "value"], move |index, value| {
            let mut items = v.borrow_mut();
            let i = checked_index(index.expect_int()?, items.len())?;
            items[i] = value.clone();
            Ok(Value::Null)
        }),
    );

    let v = Rc::clone(items);
    method(
        &bag,
        "push",
        NativeFn::unary("value", move |value| {
            v.borrow_mut().push(value.clone());
            Ok(Value::Null)
        }),
    );

    let v = Rc::clone(items);
    method(
        &bag,
        "pop",
        NativeFn::nullary(move || {
            v.borrow_mut()
                .pop()
                .ok_or(SemanticError::IndexOutOfBounds { index: -1, len: 0 })
        }),
    );

    bag
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(target: &Value, name: &str, args: &[Value]) -> Result<Value, SemanticError> {
        let method = target.property(name).expect("method exists");
        match method {
            Value::Function(func) => match func.kind() {
                crate::FunctionKind::Native(native) => native.invoke(args),
                crate::FunctionKind::Closure { .. } => panic!("builtin is native"),
            },
            other => panic!("not a function: {other:?}"),
        }
    }

    #[test]
    fn string_len_and_case() {
        let s = Value::str("Héllo");
        assert_eq!(call(&s, "len", &[]), Ok(Value::Int(5)));
        assert_eq!(call(&s, "upper", &[]), Ok(Value::str("HÉLLO")));
        assert_eq!(call(&s, "lower", &[]), Ok(Value::str("héllo")));
    }

    #[test]
    fn string_at() {
        let s = Value::str("abc");
        assert_eq!(call(&s, "at", &[Value::Int(1)]), Ok(Value::str("b")));
        assert_eq!(
            call(&s, "at", &[Value::Int(3)]).unwrap_err().to_string(),
            "Index 3 out of bound 0..3"
        );
        assert_eq!(
            call(&s, "at", &[Value::str("0")]).unwrap_err().to_string(),
            "Expected int got str"
        );
    }

    #[test]
    fn string_sub_clamps_both_ends() {
        let s = Value::str("abcdef");
        assert_eq!(
            call(&s, "sub", &[Value::Int(1), Value::Int(3)]),
            Ok(Value::str("bc"))
        );
        assert_eq!(
            call(&s, "sub", &[Value::Int(-5), Value::Int(100)]),
            Ok(Value::str("abcdef"))
        );
        assert_eq!(
            call(&s, "sub", &[Value::Int(4), Value::Int(2)]),
            Err(SemanticError::InvalidRange { from: 4, to: 2 })
        );
    }

    #[test]
    fn list_methods_mutate_shared_storage() {
        let list = Value::list(vec![Value::Int(1)]);
        let alias = list.clone();
        assert_eq!(call(&list, "push", &[Value::Int(2)]), Ok(Value::Null));
        assert_eq!(call(&alias, "len", &[]), Ok(Value::Int(2)));
        assert_eq!(
            call(&list, "set", &[Value::Int(0), Value::str("x")]),
            Ok(Value::Null)
        );
        assert_eq!(alias.to_string(), "[x,2]");
        assert_eq!(call(&list, "at", &[Value::Int(1)]), Ok(Value::Int(2)));
        assert_eq!(call(&list, "pop", &[]), Ok(Value::Int(2)));
        assert_eq!(alias.to_string(), "[x]");
    }

    #[test]
    fn list_bounds_errors() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            call(&list, "at", &[Value::Int(-1)]).unwrap_err().to_string(),
            "Index -1 out of bound 0..2"
        );
        assert_eq!(
            call(&list, "set", &[Value::Int(2), Value::Null])
                .unwrap_err()
                .to_string(),
            "Index 2 out of bound 0..2"
        );
        let empty = Value::list(vec![]);
        assert!(call(&empty, "pop", &[]).is_err());
    }

    #[test]
    fn builtins_can_be_reassigned_but_not_added() {
        let s = Value::str("abc");
        s.set_property("len", Value::Int(0)).unwrap();
        assert_eq!(s.property("len"), Some(Value::Int(0)));
        assert!(s.add_property("at", Value::Null).is_err());
    }
}
