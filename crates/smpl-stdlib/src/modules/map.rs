//! `map()`: a mutable dictionary object.
//!
//! Keys are compared by raw value. Numbers, strings, booleans and `null`
//! match by content (an int never matches a float); lists, objects and
//! functions match only themselves.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smpl_eval::{Namespace, NativeFn, SemanticError, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MapKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Bit pattern, with every NaN folded into one.
    Float(u64),
    Str(Rc<str>),
    /// Address of a heap value. The entry keeps the value alive, so the
    /// address cannot be reused while the key exists.
    Ref(usize),
}

impl MapKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => MapKey::Null,
            Value::Bool(b) => MapKey::Bool(*b),
            Value::Int(n) => MapKey::Int(*n),
            Value::Float(x) if x.is_nan() => MapKey::Float(f64::NAN.to_bits()),
            Value::Float(x) => MapKey::Float(x.to_bits()),
            Value::Str(s) => MapKey::Str(Rc::from(s.as_str())),
            Value::List(list) => MapKey::Ref(Rc::as_ptr(list) as usize),
            Value::Object(object) => MapKey::Ref(Rc::as_ptr(object) as usize),
            Value::Function(function) => MapKey::Ref(Rc::as_ptr(function) as usize),
        }
    }
}

/// Entries hold the key value alongside the mapped value.
type Entries = Rc<RefCell<FxHashMap<MapKey, (Value, Value)>>>;

/// The global `map` constructor.
pub fn constructor() -> Value {
    Value::native("map", NativeFn::nullary(new_map))
}

/// A fresh `{map}` object.
pub fn new_map() -> Result<Value, SemanticError> {
    let entries: Entries = Rc::default();

    let contains = Rc::clone(&entries);
    let get = Rc::clone(&entries);
    let set = entries;

    Namespace::new("map")
        .function(
            "contains",
            NativeFn::unary("key", move |key| {
                Ok(Value::Bool(contains.borrow().contains_key(&MapKey::of(key))))
            }),
        )
        .function(
            "get",
            NativeFn::unary("key", move |key| {
                Ok(get
                    .borrow()
                    .get(&MapKey::of(key))
                    .map(|(_, value)| value.clone())
                    .unwrap_or(Value::Null))
            }),
        )
        .function(
            "set",
            NativeFn::binary(["key", "value"], move |key, value| {
                set.borrow_mut()
                    .insert(MapKey::of(key), (key.clone(), value.clone()));
                Ok(value.clone())
            }),
        )
        .build()
}
