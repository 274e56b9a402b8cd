//! The `math` namespace.
//!
//! `max` and `min` keep ints as ints; every other function answers a float.

use smpl_eval::{Namespace, NativeFn, SemanticError, Value};

/// A float function of one numeric argument.
fn float_fn(f: fn(f64) -> f64) -> NativeFn {
    NativeFn::unary("a", move |a| Ok(Value::Float(f(a.expect_num()?))))
}

/// Like `f64::max`/`f64::min`, except that NaN wins.
fn nan_aware(a: f64, b: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        pick(a, b)
    }
}

fn extremum(int: fn(i64, i64) -> i64, float: fn(f64, f64) -> f64) -> NativeFn {
    NativeFn::binary(["a", "b"], move |a, b| match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(int(*x, *y))),
        _ => Ok(Value::Float(nan_aware(a.expect_num()?, b.expect_num()?, float))),
    })
}

pub fn namespace() -> Result<Value, SemanticError> {
    Namespace::new("math")
        .function("max", extremum(i64::max, f64::max))
        .function("min", extremum(i64::min, f64::min))
        // Rounding insists on a float argument.
        .function(
            "floor",
            NativeFn::unary("a", |a| Ok(Value::Float(a.expect_float()?.floor()))),
        )
        .function(
            "ceil",
            NativeFn::unary("a", |a| Ok(Value::Float(a.expect_float()?.ceil()))),
        )
        .function(
            "pow",
            NativeFn::binary(["a", "b"], |a, b| {
                Ok(Value::Float(a.expect_num()?.powf(b.expect_num()?)))
            }),
        )
        .function("sqrt", float_fn(f64::sqrt))
        .function("sin", float_fn(f64::sin))
        .function("cos", float_fn(f64::cos))
        .function("tan", float_fn(f64::tan))
        .function("asin", float_fn(f64::asin))
        .function("acos", float_fn(f64::acos))
        .function("atan", float_fn(f64::atan))
        .function("log", float_fn(f64::ln))
        .function("log10", float_fn(f64::log10))
        .build()
}
