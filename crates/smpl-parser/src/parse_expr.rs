//! Expression parsing.
//!
//! Precedence (lowest → highest):
//! 1. `or`
//! 2. `and`
//! 3. `?` (null coalescing)
//! 4. `==`, `!=`, `<`, `<=`, `>`, `>=` (no chaining)
//! 5. `+`, `-`
//! 6. `*`, `/`, `%`
//! 7. prefix `not`, `+`, `-`
//! 8. postfix call `(args)` and property access `.name`
//! 9. primary

use std::rc::Rc;

use smpl_lexer::token::TokenKind;
use smpl_types::ast::*;
use smpl_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        if !self.enter() {
            return None;
        }
        let result = self.parse_or();
        self.leave();
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Or = And { "or" And }`
    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = logical(left, LogicalOp::Or, right);
        }
        Some(left)
    }

    /// `And = Coalesce { "and" Coalesce }`
    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_coalesce()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_coalesce()?;
            left = logical(left, LogicalOp::And, right);
        }
        Some(left)
    }

    /// `Coalesce = Comparison { "?" Comparison }`
    fn parse_coalesce(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat(&TokenKind::Question) {
            let right = self.parse_comparison()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::NullCoalesce {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    /// `Comparison = Additive [ CompOp Additive ]`
    ///
    /// `a < b < c` is rejected.
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        if let Some(op) = self.comparison_op() {
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
            if self.comparison_op().is_some() {
                self.error_at_current(
                    ErrorCode::CHAINED_COMPARISON,
                    "comparison operators cannot be chained; combine them with 'and'",
                );
            }
        }
        Some(left)
    }

    fn comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    /// `Additive = Multiplicative { ("+" | "-") Multiplicative }`
    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Multiplicative = Unary { ("*" | "/" | "%") Unary }`
    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Unary = ("not" | "+" | "-") Unary | Postfix`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        if !self.enter() {
            return None;
        }
        let operand = self.parse_unary();
        self.leave();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `Postfix = Primary { "(" Args ")" | "." Ident }`
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_comma_list(&TokenKind::RParen)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_identifier()?;
                    let span = expr.span.merge(name.span);
                    expr = Expr::new(
                        ExprKind::Property {
                            target: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                _ => return Some(expr),
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::IntLit(raw) => {
                self.advance();
                ExprKind::Int {
                    id: self.fresh_id(),
                    raw,
                }
            }
            TokenKind::FloatLit(raw) => {
                self.advance();
                ExprKind::Float {
                    id: self.fresh_id(),
                    raw,
                }
            }
            TokenKind::StrLit(raw) => {
                self.advance();
                ExprKind::Str {
                    id: self.fresh_id(),
                    raw,
                }
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::Identifier(name) => {
                self.advance();
                ExprKind::Identifier(name)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                // Keep the parenthesised node, widened to cover the parens.
                return Some(Expr::new(inner.kind, span.merge(self.previous_span())));
            }
            TokenKind::LBracket => {
                self.advance();
                let id = self.fresh_id();
                ExprKind::List {
                    id,
                    items: self.parse_comma_list(&TokenKind::RBracket)?,
                }
            }
            TokenKind::New => return self.parse_new(),
            TokenKind::Fn => return self.parse_lambda(),
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                return None;
            }
        };
        Some(Expr::new(kind, span.merge(self.previous_span())))
    }

    /// Comma separated expressions up to `close`, which is consumed.
    /// The opening token has already been eaten. A trailing comma is allowed.
    fn parse_comma_list(&mut self, close: &TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Some(items)
    }

    /// `new { name: expr, ... }`
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        self.expect(&TokenKind::LBrace)?;
        let mut props = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            props.push(NewProp { name, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::New(props), span))
    }

    /// `fn (params) { body }` in expression position.
    fn parse_lambda(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let decl = self.parse_fn_decl()?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Lambda {
                decl: Rc::new(decl),
            },
            span,
        ))
    }

    /// `(params) { body }`, shared by named functions and lambdas.
    pub(crate) fn parse_fn_decl(&mut self) -> Option<FnDecl> {
        self.expect(&TokenKind::LParen)?;
        let mut params: Vec<String> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let param = self.expect_identifier()?;
            if params.contains(&param.name) {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("duplicate parameter '{}'", param.name),
                    param.span,
                );
            }
            params.push(param.name);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Some(FnDecl { params, body })
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
