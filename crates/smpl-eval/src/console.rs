//! Program I/O.
//!
//! The `write` statement and the native I/O functions never touch process
//! stdio directly; they go through a [`Console`] handed to the interpreter.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Console {
    /// Write one line to standard output.
    fn print(&self, line: &str);
    /// Write one line to standard error.
    fn eprint(&self, line: &str);
    /// The next whitespace-delimited token of input, `None` once input is
    /// exhausted.
    fn read_token(&self) -> Option<String>;
}

// ── Process stdio ─────────────────────────────────────────────────────────────

/// The console of the running process.
#[derive(Debug, Default)]
pub struct StdConsole {
    pending: RefCell<VecDeque<String>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for StdConsole {
    fn print(&self, line: &str) {
        // A closed pipe is not the program's failure.
        let _ = writeln!(io::stdout().lock(), "{line}");
    }

    fn eprint(&self, line: &str) {
        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    fn read_token(&self) -> Option<String> {
        let mut pending = self.pending.borrow_mut();
        let stdin = io::stdin();
        let mut lines = stdin.lock();
        loop {
            if let Some(token) = pending.pop_front() {
                return Some(token);
            }
            let mut line = String::new();
            match lines.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => pending.extend(line.split_whitespace().map(str::to_string)),
            }
        }
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// A console that records output and serves input from a fixed text.
#[derive(Debug, Default)]
pub struct BufferConsole {
    output: RefCell<String>,
    errors: RefCell<String>,
    input: RefCell<VecDeque<String>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &str) -> Self {
        let console = Self::new();
        console
            .input
            .borrow_mut()
            .extend(input.split_whitespace().map(str::to_string));
        console
    }

    /// Everything printed so far, one `\n` after each line.
    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn errors(&self) -> String {
        self.errors.borrow().clone()
    }

    /// Printed lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.output.borrow().lines().map(str::to_string).collect()
    }
}

impl Console for BufferConsole {
    fn print(&self, line: &str) {
        let mut output = self.output.borrow_mut();
        output.push_str(line);
        output.push('\n');
    }

    fn eprint(&self, line: &str) {
        let mut errors = self.errors.borrow_mut();
        errors.push_str(line);
        errors.push('\n');
    }

    fn read_token(&self) -> Option<String> {
        self.input.borrow_mut().pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_records_lines() {
        let console = BufferConsole::new();
        console.print("a");
        console.print("b c");
        console.eprint("oops");
        assert_eq!(console.output(), "a\nb c\n");
        assert_eq!(console.lines(), vec!["a", "b c"]);
        assert_eq!(console.errors(), "oops\n");
    }

    #[test]
    fn buffer_serves_tokens() {
        let console = BufferConsole::with_input("  12 abc\n\n3.5 ");
        assert_eq!(console.read_token().as_deref(), Some("12"));
        assert_eq!(console.read_token().as_deref(), Some("abc"));
        assert_eq!(console.read_token().as_deref(), Some("3.5"));
        assert_eq!(console.read_token(), None);
    }
}
