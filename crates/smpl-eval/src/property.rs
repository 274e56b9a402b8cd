//! Per-value property bags.
//!
//! A bag maps names to values and enforces the shape rule of SMPL objects: a
//! name is *added* once (by an object literal or a native library) and can
//! only be *set* after that.

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::SemanticError;
use crate::value::Value;

/// Mutable name → value map shared by every handle to one value.
#[derive(Default)]
pub struct PropertyBag {
    entries: RefCell<FxHashMap<String, Value>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property that must not exist yet.
    pub fn add(&self, name: &str, value: Value) -> Result<(), SemanticError> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(name) {
            return Err(SemanticError::DuplicateProperty(name.to_string()));
        }
        entries.insert(name.to_string(), value);
        Ok(())
    }

    /// Replace a property that must already exist.
    pub fn set(&self, name: &str, value: Value) -> Result<(), SemanticError> {
        match self.entries.borrow_mut().get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SemanticError::MissingProperty(name.to_string())),
        }
    }

    /// Insert or overwrite without the shape check. Used to seed built-in
    /// members into a bag nobody else can see yet.
    pub(crate) fn define(&self, name: &str, value: Value) {
        self.entries.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove every entry, handing back the values.
    pub(crate) fn drain(&self) -> Vec<Value> {
        self.entries.borrow_mut().drain().map(|(_, value)| value).collect()
    }

    /// Property names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for PropertyBag {
    // Values may point back at the bag's owner, so only names are shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_set_then_get() {
        let bag = PropertyBag::new();
        bag.add("x", Value::Int(1)).unwrap();
        bag.set("x", Value::Int(2)).unwrap();
        assert!(matches!(bag.get("x"), Some(Value::Int(2))));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let bag = PropertyBag::new();
        bag.add("x", Value::Null).unwrap();
        let err = bag.add("x", Value::Int(3)).unwrap_err();
        assert_eq!(err.to_string(), "Property x already exists");
        assert!(matches!(bag.get("x"), Some(Value::Null)));
    }

    #[test]
    fn set_on_missing_name_is_rejected() {
        let bag = PropertyBag::new();
        let err = bag.set("y", Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "Can't set property y");
        assert!(bag.is_empty());
        assert!(bag.get("y").is_none());
    }

    #[test]
    fn names_are_sorted() {
        let bag = PropertyBag::new();
        for name in ["b", "c", "a"] {
            bag.add(name, Value::Null).unwrap();
        }
        assert_eq!(bag.names(), vec!["a", "b", "c"]);
        assert_eq!(format!("{bag:?}"), r#"{"a", "b", "c"}"#);
    }
}
