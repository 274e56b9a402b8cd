//! Operator semantics.
//!
//! Arithmetic is dispatched on the left operand:
//!
//! | left  | right       | result                                 |
//! |-------|-------------|----------------------------------------|
//! | int   | int         | int, wrapping, division truncates      |
//! | int   | float       | float                                  |
//! | float | int / float | float                                  |
//! | str   | anything    | `+` concatenates the right's text      |
//! | str   | int         | `*` repeats, negative counts as zero   |
//!
//! Any other pairing is an unsupported operation, and so is a repetition
//! longer than 1 GiB.

use std::cmp::Ordering;
use std::rc::Rc;

use smpl_types::ast::{BinOp, UnaryOp};

use crate::error::SemanticError;
use crate::value::Value;

/// Longest string `str * int` may build, in bytes.
const MAX_REPEAT_LEN: usize = 1 << 30;

/// Apply a binary operator to two evaluated operands.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, SemanticError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
            arithmetic(op, left, right)
        }
        BinOp::Eq => Ok(Value::Bool(equals(left, right))),
        BinOp::NotEq => Ok(Value::Bool(!equals(left, right))),
        BinOp::Less | BinOp::LessEq | BinOp::Greater | BinOp::GreaterEq => {
            let ordering =
                compare(left, right).ok_or_else(|| SemanticError::unsupported(op.symbol(), left, right))?;
            Ok(Value::Bool(match op {
                BinOp::Less => ordering.is_lt(),
                BinOp::LessEq => ordering.is_le(),
                BinOp::Greater => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
    }
}

/// `+` and `-` prefixes. `not` works on every value and is handled by the
/// evaluator through truthiness.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, SemanticError> {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Plus, Value::Int(_) | Value::Float(_)) => Ok(operand.clone()),
        (UnaryOp::Minus, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Minus, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Plus, v) => Err(SemanticError::unsupported_unary("unary +", v)),
        (UnaryOp::Minus, v) => Err(SemanticError::unsupported_unary("unary -", v)),
    }
}

/// Three-way comparison, when the two operands have one.
///
/// Numbers compare numerically, an int against a float as two floats.
/// Floats order like `Double.compare`: `-0.0 < 0.0` and NaN equals itself
/// and sorts above everything else. Strings compare lexicographically.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Float(b)) => Some(float_order(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(float_order(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(float_order(*a, *b)),
        (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// SMPL `==`: the ordering when there is one, otherwise raw equality.
///
/// Raw equality matches booleans by value and `null` with `null`. Two lists
/// are equal when they have the same length and each pair of elements is
/// [`element_equals`]. Objects and functions are equal only to themselves.
pub fn equals(left: &Value, right: &Value) -> bool {
    if let Some(ordering) = compare(left, right) {
        return ordering.is_eq();
    }
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let (a, b) = (a.items(), b.items());
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| element_equals(x, y))
        }
        _ => left.same(right),
    }
}

/// Equality of list elements: scalars by variant and value, everything on
/// the heap (strings included) by identity.
fn element_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits() || a == b,
        _ => left.same(right),
    }
}

fn float_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, SemanticError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_arithmetic(op, *a as f64, *b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_arithmetic(op, *a, *b as f64))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_arithmetic(op, *a, *b))),
        (Value::Str(s), _) if op == BinOp::Add => Ok(Value::str(format!("{}{right}", s.as_str()))),
        (Value::Str(s), Value::Int(n)) if op == BinOp::Mul => {
            let count = usize::try_from(*n).unwrap_or(0);
            let text = s.as_str();
            match text.len().checked_mul(count) {
                Some(len) if len <= MAX_REPEAT_LEN => Ok(Value::str(text.repeat(count))),
                _ => Err(SemanticError::RepeatTooLong { len: text.len(), count: *n }),
            }
        }
        _ => Err(SemanticError::unsupported(op.symbol(), left, right)),
    }
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, SemanticError> {
    let result = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div | BinOp::Rem if b == 0 => return Err(SemanticError::DivisionByZero),
        BinOp::Div => a.wrapping_div(b),
        _ => a.wrapping_rem(b),
    };
    Ok(Value::Int(result))
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        _ => a % b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    fn float(x: f64) -> Value {
        Value::Float(x)
    }

    fn text(s: &str) -> Value {
        Value::str(s)
    }

    fn bin(op: BinOp, l: Value, r: Value) -> Result<Value, SemanticError> {
        binary(op, &l, &r)
    }

    fn message(result: Result<Value, SemanticError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(bin(BinOp::Add, int(1), int(2)), Ok(int(3)));
        assert_eq!(bin(BinOp::Div, int(7), int(2)), Ok(int(3)));
        assert_eq!(bin(BinOp::Div, int(-7), int(2)), Ok(int(-3)));
        assert_eq!(bin(BinOp::Rem, int(-7), int(2)), Ok(int(-1)));
        assert_eq!(bin(BinOp::Add, int(i64::MAX), int(1)), Ok(int(i64::MIN)));
        assert_eq!(bin(BinOp::Div, int(i64::MIN), int(-1)), Ok(int(i64::MIN)));
    }

    #[test]
    fn mixed_arithmetic_promotes() {
        assert_eq!(bin(BinOp::Add, int(1), float(2.0)), Ok(float(3.0)));
        assert_eq!(bin(BinOp::Mul, float(1.5), int(2)), Ok(float(3.0)));
        assert_eq!(bin(BinOp::Rem, float(7.5), int(2)), Ok(float(1.5)));
        assert_eq!(bin(BinOp::Div, int(1), float(0.0)), Ok(float(f64::INFINITY)));
    }

    #[test]
    fn integer_division_by_zero() {
        assert_eq!(
            bin(BinOp::Div, int(1), int(0)),
            Err(SemanticError::DivisionByZero)
        );
        assert_eq!(
            bin(BinOp::Rem, int(1), int(0)),
            Err(SemanticError::DivisionByZero)
        );
    }

    #[test]
    fn string_operators() {
        assert_eq!(bin(BinOp::Add, text("a"), int(1)), Ok(text("a1")));
        assert_eq!(bin(BinOp::Add, text("x"), float(2.5)), Ok(text("x2.5")));
        assert_eq!(
            bin(BinOp::Add, text("l="), Value::list(vec![int(1), Value::Null])),
            Ok(text("l=[1,null]"))
        );
        assert_eq!(bin(BinOp::Mul, text("ab"), int(3)), Ok(text("ababab")));
        assert_eq!(bin(BinOp::Mul, text("ab"), int(-2)), Ok(text("")));
        assert_eq!(bin(BinOp::Mul, text(""), int(i64::MAX)), Ok(text("")));
    }

    #[test]
    fn oversized_repetition_is_an_error() {
        assert_eq!(
            bin(BinOp::Mul, text("ab"), int(i64::MAX)),
            Err(SemanticError::RepeatTooLong {
                len: 2,
                count: i64::MAX
            })
        );
        assert_eq!(
            message(bin(BinOp::Mul, text("ab"), int(1 << 40))),
            "String of length 2 can't be repeated 1099511627776 times"
        );
    }

    #[test]
    fn no_widening_of_the_left_operand() {
        assert_eq!(
            message(bin(BinOp::Add, int(1), text("a"))),
            "Unsupported operation + on int and str"
        );
        assert_eq!(
            message(bin(BinOp::Sub, text("a"), text("b"))),
            "Unsupported operation - on str and str"
        );
        assert_eq!(
            message(bin(BinOp::Mul, int(3), text("ab"))),
            "Unsupported operation * on int and str"
        );
        assert_eq!(
            message(bin(BinOp::Add, Value::object(), int(1))),
            "Unsupported operation + on {new} and int"
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(unary(UnaryOp::Minus, &int(4)), Ok(int(-4)));
        assert_eq!(unary(UnaryOp::Plus, &float(1.5)), Ok(float(1.5)));
        assert_eq!(unary(UnaryOp::Not, &Value::Null), Ok(Value::Bool(true)));
        assert_eq!(unary(UnaryOp::Not, &int(0)), Ok(Value::Bool(false)));
        assert_eq!(
            message(unary(UnaryOp::Minus, &text("a"))),
            "Unsupported operation unary - on str"
        );
        assert_eq!(
            message(unary(UnaryOp::Plus, &Value::Bool(true))),
            "Unsupported operation unary + on bool"
        );
    }

    #[test]
    fn ordering() {
        assert_eq!(compare(&int(1), &int(2)), Some(Ordering::Less));
        assert_eq!(compare(&int(2), &float(1.5)), Some(Ordering::Greater));
        assert_eq!(compare(&text("b"), &text("a")), Some(Ordering::Greater));
        assert_eq!(compare(&Value::Bool(true), &Value::Bool(true)), None);
        assert_eq!(compare(&float(-0.0), &float(0.0)), Some(Ordering::Less));
        assert_eq!(compare(&float(f64::NAN), &float(f64::NAN)), Some(Ordering::Equal));
        assert_eq!(
            compare(&float(f64::NAN), &float(f64::INFINITY)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            message(bin(BinOp::Less, Value::Null, int(1))),
            "Unsupported operation < on null and int"
        );
        assert_eq!(bin(BinOp::GreaterEq, int(2), int(2)), Ok(Value::Bool(true)));
    }

    #[test]
    fn equality() {
        assert!(equals(&int(1), &float(1.0)));
        assert!(equals(&text("a"), &text("a")));
        assert!(equals(&Value::Null, &Value::Null));
        assert!(!equals(&Value::Null, &Value::Bool(false)));
        assert!(!equals(&int(1), &text("1")));
        let list = Value::list(vec![]);
        assert!(equals(&list, &list.clone()));
        assert_eq!(bin(BinOp::NotEq, int(1), int(2)), Ok(Value::Bool(true)));
    }

    #[test]
    fn list_equality_is_elementwise() {
        assert!(equals(&Value::list(vec![]), &Value::list(vec![])));
        assert!(equals(
            &Value::list(vec![int(1), Value::Null, Value::Bool(true)]),
            &Value::list(vec![int(1), Value::Null, Value::Bool(true)])
        ));
        // Elements compare strictly: no int/float promotion, strings by identity.
        assert!(!equals(&Value::list(vec![int(1)]), &Value::list(vec![float(1.0)])));
        assert!(!equals(&Value::list(vec![text("a")]), &Value::list(vec![text("a")])));
        let shared = text("a");
        assert!(equals(
            &Value::list(vec![shared.clone()]),
            &Value::list(vec![shared])
        ));
        assert!(!equals(&Value::list(vec![int(1)]), &Value::list(vec![int(1), int(2)])));
        assert_eq!(
            bin(BinOp::Eq, Value::list(vec![]), Value::list(vec![])),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            bin(BinOp::NotEq, Value::list(vec![int(1)]), Value::list(vec![int(2)])),
            Ok(Value::Bool(true))
        );
    }
}
