//! Console I/O and the clock: `print`, `eprint`, `input`, `time`.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use smpl_eval::{Console, NativeFn, Value};

use super::global;

pub fn bindings(console: &Rc<dyn Console>) -> Vec<(String, Value)> {
    let out = Rc::clone(console);
    let err = Rc::clone(console);
    let input = Rc::clone(console);
    vec![
        global(
            "print",
            NativeFn::unary("data", move |data| {
                out.print(&data.to_string());
                Ok(Value::Null)
            }),
        ),
        global(
            "eprint",
            NativeFn::unary("data", move |data| {
                err.eprint(&data.to_string());
                Ok(Value::Null)
            }),
        ),
        // One whitespace-delimited token; null once input runs out.
        global(
            "input",
            NativeFn::nullary(move || Ok(input.read_token().map(Value::str).unwrap_or(Value::Null))),
        ),
        global("time", NativeFn::nullary(|| Ok(Value::Int(now_millis())))),
    ]
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smpl_eval::BufferConsole;

    fn lookup(bindings: &[(String, Value)], name: &str) -> Value {
        bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .expect("binding")
    }

    fn invoke(f: &Value, args: &[Value]) -> Value {
        match f.as_function().map(|f| f.kind()) {
            Some(smpl_eval::FunctionKind::Native(native)) => native.invoke(args).unwrap(),
            _ => panic!("not a native function"),
        }
    }

    #[test]
    fn print_goes_to_the_console() {
        let console = Rc::new(BufferConsole::new());
        let dyn_console: Rc<dyn Console> = console.clone();
        let bindings = bindings(&dyn_console);
        invoke(&lookup(&bindings, "print"), &[Value::Float(2.0)]);
        invoke(&lookup(&bindings, "eprint"), &[Value::str("bad")]);
        assert_eq!(console.output(), "2.0\n");
        assert_eq!(console.errors(), "bad\n");
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}
