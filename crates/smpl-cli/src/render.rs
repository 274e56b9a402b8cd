//! Terminal rendering of diagnostics and runtime failures.

use colored::Colorize;
use smpl_eval::RunError;
use smpl_types::{Diagnostics, SmplError};

/// One front-end diagnostic with its source line and a caret underline.
pub fn diagnostic(err: &SmplError) -> String {
    let mut out = String::new();
    let header = format!("error[{}]", err.code);
    out.push_str(&format!("{}: {}\n", header.red().bold(), err.message.bold()));
    out.push_str(&format!(
        "{}\n",
        format!("  --> {}:{}", err.file, err.span).bright_blue()
    ));

    if !err.source_line.is_empty() {
        let gutter = "|".bright_blue();
        let col = err.span.start_col.max(1) as usize;
        let width = if err.span.end_line == err.span.start_line {
            err.span.end_col.saturating_sub(err.span.start_col).max(1) as usize
        } else {
            1
        };
        out.push_str(&format!("    {gutter}\n"));
        out.push_str(&format!(
            "{} {gutter} {}\n",
            format!("{:3}", err.span.start_line).bright_blue(),
            err.source_line
        ));
        out.push_str(&format!(
            "    {gutter} {}{}\n",
            " ".repeat(col - 1),
            "^".repeat(width).red().bold()
        ));
    }

    if let Some(suggestion) = &err.suggestion {
        out.push_str(&format!(
            "    {} {}\n",
            "=".bright_green(),
            format!("help: {suggestion}").bright_green()
        ));
    }
    out
}

/// Every stored diagnostic followed by a count line.
pub fn diagnostics(diags: &Diagnostics) -> String {
    let mut out = String::new();
    for err in &diags.errors {
        out.push_str(&diagnostic(err));
        out.push('\n');
    }
    let noun = if diags.total == 1 { "error" } else { "errors" };
    let mut summary = format!("{} {noun}", diags.total);
    if diags.total > diags.errors.len() {
        summary.push_str(&format!(" (showing the first {})", diags.errors.len()));
    }
    out.push_str(&format!("{}\n", summary.red().bold()));
    out
}

pub fn runtime_error(err: &RunError) -> String {
    let label = if err.is_stray_signal() {
        "control flow error"
    } else {
        "runtime error"
    };
    format!("{}: {}", label.red().bold(), err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smpl_eval::SemanticError;
    use smpl_types::{ErrorCode, Span};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn diagnostic_layout() {
        plain();
        let err = SmplError::new(
            "main.smpl",
            ErrorCode::UNEXPECTED_TOKEN,
            "expected ';', got '}'",
            Span::new(2, 7, 2, 8),
            "x = 1 }",
        )
        .with_suggestion("add ';' after the statement");
        assert_eq!(
            diagnostic(&err),
            "error[E100]: expected ';', got '}'\n\
             \x20 --> main.smpl:2:7\n\
             \x20   |\n\
             \x20 2 | x = 1 }\n\
             \x20   |       ^\n\
             \x20   = help: add ';' after the statement\n"
        );
    }

    #[test]
    fn summary_mentions_truncation() {
        plain();
        let mut diags = Diagnostics::new();
        for line in 1..=25 {
            diags.push(SmplError::new(
                "f.smpl",
                ErrorCode::UNEXPECTED_CHARACTER,
                "unexpected character '@'",
                Span::point(line, 1),
                "",
            ));
        }
        let text = diagnostics(&diags);
        assert!(text.ends_with("25 errors (showing the first 20)\n"));
        assert_eq!(text.matches("error[E101]").count(), 20);
    }

    #[test]
    fn runtime_labels() {
        plain();
        assert_eq!(
            runtime_error(&RunError::BreakOutsideLoop),
            "control flow error: Break outside loop"
        );
        assert_eq!(
            runtime_error(&SemanticError::UndefinedVariable("x".into()).into()),
            "runtime error: Variable x is undefined."
        );
    }
}
