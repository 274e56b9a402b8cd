//! Runtime values.
//!
//! [`Value`] is a closed union over every SMPL type. Scalars are stored
//! inline; strings, lists, objects and functions live behind `Rc` so that
//! copies share identity and in-place mutation is visible through every
//! handle.

use std::cell::{OnceCell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use smpl_types::ast::FnDecl;

use crate::builtins;
use crate::error::SemanticError;
use crate::function::{Function, FunctionKind};
use crate::native::NativeFn;
use crate::property::PropertyBag;
use crate::scope::Scope;

/// Property holding an object's display name.
pub(crate) const NAME_PROPERTY: &str = "__name";

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<StrValue>),
    List(Rc<ListValue>),
    Object(Rc<ObjectValue>),
    Function(Rc<Function>),
}

// ══════════════════════════════════════════════════════════════════════════════
// Heap Variants
// ══════════════════════════════════════════════════════════════════════════════

/// Immutable text plus its method bag.
pub struct StrValue {
    text: Rc<str>,
    props: OnceCell<PropertyBag>,
}

impl StrValue {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Built-in methods are created on first property access.
    pub fn props(&self) -> &PropertyBag {
        self.props
            .get_or_init(|| builtins::string_methods(&self.text))
    }
}

/// Ordered, mutable sequence plus its method bag.
pub struct ListValue {
    items: Rc<RefCell<Vec<Value>>>,
    props: OnceCell<PropertyBag>,
}

impl ListValue {
    pub fn new(items: Vec<Value>) -> Rc<Self> {
        Rc::new(ListValue {
            items: Rc::new(RefCell::new(items)),
            props: OnceCell::new(),
        })
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    pub fn items_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.items.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn props(&self) -> &PropertyBag {
        self.props
            .get_or_init(|| builtins::list_methods(&self.items))
    }
}

/// A bag created by `new { ... }` or by a native library.
#[derive(Default)]
pub struct ObjectValue {
    props: PropertyBag,
}

impl ObjectValue {
    pub fn props(&self) -> &PropertyBag {
        &self.props
    }

    /// The `__name` property, when it holds a string.
    pub fn name(&self) -> Option<String> {
        match self.props.get(NAME_PROPERTY) {
            Some(Value::Str(name)) => Some(name.as_str().to_string()),
            _ => None,
        }
    }
}

// Long chains such as `node = new { next: node }` would otherwise be freed
// one nested `drop` call per link.

impl Drop for ListValue {
    fn drop(&mut self) {
        // Bound methods share `items`; drop them first so the vector is ours.
        self.props.take();
        if let Some(items) = Rc::get_mut(&mut self.items) {
            release(std::mem::take(items.get_mut()));
        }
    }
}

impl Drop for ObjectValue {
    fn drop(&mut self) {
        release(self.props.drain());
    }
}

/// Drop `pending` with a worklist instead of recursion. Only values whose
/// last handle is in the list are taken apart.
fn release(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match value {
            Value::List(list) => {
                if let Ok(mut list) = Rc::try_unwrap(list) {
                    list.props.take();
                    if let Some(items) = Rc::get_mut(&mut list.items) {
                        pending.append(items.get_mut());
                    }
                }
            }
            Value::Object(object) => {
                if let Ok(object) = Rc::try_unwrap(object) {
                    pending.extend(object.props.drain());
                }
            }
            _ => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Construction & Inspection
// ══════════════════════════════════════════════════════════════════════════════

impl Value {
    pub fn str(text: impl Into<Rc<str>>) -> Self {
        Value::Str(Rc::new(StrValue {
            text: text.into(),
            props: OnceCell::new(),
        }))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListValue::new(items))
    }

    /// An anonymous object with an empty bag, printed as `{new}`.
    pub fn object() -> Self {
        Value::Object(Rc::new(ObjectValue::default()))
    }

    /// An object printed as `{name}`.
    pub fn named_object(name: &str) -> Self {
        let object = ObjectValue::default();
        object.props.define(NAME_PROPERTY, Value::str(name));
        Value::Object(Rc::new(object))
    }

    pub fn native(name: impl Into<String>, native: NativeFn) -> Self {
        Value::Function(Rc::new(Function::new(
            name,
            FunctionKind::Native(native),
        )))
    }

    /// A closure over `scope`.
    pub fn closure(name: impl Into<String>, scope: Scope, decl: Rc<FnDecl>) -> Self {
        Value::Function(Rc::new(Function::new(
            name,
            FunctionKind::Closure { scope, decl },
        )))
    }

    /// The type name used in error messages.
    ///
    /// Objects report their printed form and functions `<fn name>`.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Str(_) => "str".into(),
            Value::List(_) => "list".into(),
            Value::Object(_) => self.to_string(),
            Value::Function(func) => format!("<fn {}>", func.name()),
        }
    }

    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    // ── Typed accessors ───────────────────────────────────────────────────

    pub fn expect_int(&self) -> Result<i64, SemanticError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(SemanticError::expected("int", other)),
        }
    }

    pub fn expect_float(&self) -> Result<f64, SemanticError> {
        match self {
            Value::Float(x) => Ok(*x),
            other => Err(SemanticError::expected("float", other)),
        }
    }

    /// Int or Float, widened to `f64`.
    pub fn expect_num(&self) -> Result<f64, SemanticError> {
        match self {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            other => Err(SemanticError::expected("num", other)),
        }
    }

    pub fn expect_str(&self) -> Result<&str, SemanticError> {
        match self {
            Value::Str(s) => Ok(s.as_str()),
            other => Err(SemanticError::expected("str", other)),
        }
    }

    /// `true` when both handles refer to the same heap value.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // ── Properties ────────────────────────────────────────────────────────

    /// The value's bag. Scalars and functions have none.
    pub fn props(&self) -> Option<&PropertyBag> {
        match self {
            Value::Str(s) => Some(s.props()),
            Value::List(list) => Some(list.props()),
            Value::Object(object) => Some(object.props()),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.props().and_then(|props| props.get(name))
    }

    pub fn set_property(&self, name: &str, value: Value) -> Result<(), SemanticError> {
        match self.props() {
            Some(props) => props.set(name, value),
            None => Err(SemanticError::MissingProperty(name.to_string())),
        }
    }

    pub fn add_property(&self, name: &str, value: Value) -> Result<(), SemanticError> {
        match self.props() {
            Some(props) => props.add(name, value),
            None => Err(SemanticError::custom(format!(
                "Can't add property {name} to {}",
                self.type_name()
            ))),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// String Form
// ══════════════════════════════════════════════════════════════════════════════

/// Print a float the way SMPL shows it.
///
/// Magnitudes in `[1e-3, 1e7)` use plain decimal notation with at least one
/// fractional digit; everything else uses `<mantissa>e<exponent>` with the
/// shortest round-tripping digits, e.g. `1.5e10` and `1.0e-5`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NaN".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.into();
    }

    let abs = x.abs();
    if (1e-3..1e7).contains(&abs) {
        let text = x.to_string();
        return if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        };
    }

    let text = format!("{x:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0e{exponent}")
        }
        _ => text,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

/// `open` holds the lists currently being printed; a list that contains
/// itself prints as `[...]` at the point of recursion.
fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    open: &mut Vec<*const ListValue>,
) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(n) => write!(f, "{n}"),
        Value::Float(x) => f.write_str(&format_float(*x)),
        Value::Str(s) => f.write_str(s.as_str()),
        Value::List(list) => {
            let ptr = Rc::as_ptr(list);
            if open.contains(&ptr) {
                return f.write_str("[...]");
            }
            open.push(ptr);
            f.write_str("[")?;
            for (i, item) in list.items().iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_value(f, item, open)?;
            }
            open.pop();
            f.write_str("]")
        }
        Value::Object(object) => match object.name() {
            Some(name) => write!(f, "{{{name}}}"),
            None => f.write_str("{new}"),
        },
        Value::Function(func) => write!(f, "{func}"),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::List(_) => write!(f, "List({self})"),
            Value::Object(_) => write!(f, "Object({self})"),
            Value::Function(func) => write!(f, "Function({func})"),
        }
    }
}

/// Host-side equality: same variant and same contents for scalars and
/// strings, same identity for lists, objects and functions.
///
/// This is not SMPL's `==`, which also compares ints with floats; see
/// [`crate::equals`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a.as_str() == b.as_str(),
            _ => self.same(other),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::str(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_form_matches_smpl_output() {
        let cases = [
            (3.0, "3.0"),
            (0.5, "0.5"),
            (-2.25, "-2.25"),
            (1234567.0, "1234567.0"),
            (0.001, "0.001"),
            (1e7, "1.0e7"),
            (1.5e10, "1.5e10"),
            (1e-5, "1.0e-5"),
            (-1.25e-4, "-1.25e-4"),
            (0.1 + 0.2, "0.30000000000000004"),
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (f64::NAN, "NaN"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
        ];
        for (x, expected) in cases {
            assert_eq!(format_float(x), expected, "{x:?}");
        }
    }

    #[test]
    fn list_form_nests_and_stops_on_cycles() {
        let inner = Value::list(vec![Value::Int(2), Value::str("x")]);
        let outer = Value::list(vec![Value::Int(1), inner, Value::Null, Value::Float(1.0)]);
        assert_eq!(outer.to_string(), "[1,[2,x],null,1.0]");

        if let Value::List(list) = &outer {
            list.items_mut().push(outer.clone());
        }
        assert_eq!(outer.to_string(), "[1,[2,x],null,1.0,[...]]");
    }

    #[test]
    fn object_form_uses_name_property() {
        assert_eq!(Value::object().to_string(), "{new}");
        assert_eq!(Value::named_object("math").to_string(), "{math}");
        assert_eq!(Value::named_object("math").type_name(), "{math}");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::str("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn typed_accessors_report_actual_type() {
        assert_eq!(Value::Int(3).expect_num(), Ok(3.0));
        assert_eq!(
            Value::Float(1.0).expect_int().unwrap_err().to_string(),
            "Expected int got float"
        );
        assert_eq!(
            Value::Int(1).expect_float().unwrap_err().to_string(),
            "Expected float got int"
        );
        assert_eq!(Value::str("hi").expect_str(), Ok("hi"));
    }

    #[test]
    fn scalars_have_no_bag() {
        assert!(Value::Int(1).property("len").is_none());
        assert_eq!(
            Value::Bool(true)
                .set_property("x", Value::Null)
                .unwrap_err()
                .to_string(),
            "Can't set property x"
        );
    }

    #[test]
    fn strings_and_lists_expose_builtins() {
        assert!(Value::str("abc").property("len").is_some());
        assert!(Value::list(vec![]).property("push").is_some());
        assert!(Value::list(vec![]).property("nope").is_none());
    }

    #[test]
    fn long_chains_drop_without_recursing() {
        let mut node = Value::Null;
        for _ in 0..200_000 {
            let object = Value::object();
            object.add_property("next", node).unwrap();
            node = object;
        }
        drop(node);

        let mut nested = Value::list(vec![]);
        for _ in 0..200_000 {
            nested = Value::list(vec![nested]);
        }
        drop(nested);
    }

    #[test]
    fn shared_children_survive_their_parent() {
        let child = Value::list(vec![Value::Int(1)]);
        let parent = Value::object();
        parent.add_property("child", child.clone()).unwrap();
        drop(parent);
        assert_eq!(child.to_string(), "[1]");
    }

    #[test]
    fn host_equality() {
        assert_eq!(Value::str("a"), Value::str("a"));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        let list = Value::list(vec![]);
        assert_eq!(list, list.clone());
        assert_ne!(list, Value::list(vec![]));
    }
}
