//! Conversions between value types: `int`, `float`, `str`, `bool`.

use smpl_eval::{NativeFn, SemanticError, Value};

use super::global;

pub fn bindings() -> Vec<(String, Value)> {
    vec![
        global("int", NativeFn::unary("value", to_int)),
        global("float", NativeFn::unary("value", to_float)),
        global(
            "str",
            NativeFn::unary("data", |data| Ok(Value::str(data.to_string()))),
        ),
        global(
            "bool",
            NativeFn::unary("data", |data| Ok(Value::Bool(data.is_truthy()))),
        ),
    ]
}

/// Floats truncate toward zero. Text that is not an integer gives `null`.
pub fn to_int(value: &Value) -> Result<Value, SemanticError> {
    match value {
        Value::Int(_) => Ok(value.clone()),
        Value::Float(x) => Ok(Value::Int(*x as i64)),
        Value::Str(s) => Ok(s
            .as_str()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Null)),
        other => Err(SemanticError::expected("num|str", other)),
    }
}

/// Text that is not a number gives `null`.
pub fn to_float(value: &Value) -> Result<Value, SemanticError> {
    match value {
        Value::Float(_) => Ok(value.clone()),
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Str(s) => Ok(s
            .as_str()
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Null)),
        other => Err(SemanticError::expected("num|str", other)),
    }
}
