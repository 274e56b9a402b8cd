//! Statement parsing.

use std::rc::Rc;

use smpl_lexer::token::TokenKind;
use smpl_types::ast::*;
use smpl_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Top level: statements until end of file.
    pub(crate) fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.check(&TokenKind::RBrace) {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unmatched '}'");
                self.advance();
                continue;
            }
            self.parse_statement_or_recover(&mut stmts);
        }
        let span = start.merge(self.previous_span());
        Program { stmts, span }
    }

    /// `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            self.parse_statement_or_recover(&mut stmts);
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    fn parse_statement_or_recover(&mut self, stmts: &mut Vec<Stmt>) {
        let before = self.position();
        match self.parse_statement() {
            Some(stmt) => stmts.push(stmt),
            None => {
                self.synchronize();
                // Always make progress, even when the failure happened on a
                // token the synchronizer stops at.
                if self.position() == before && !self.at_end() {
                    self.advance();
                }
            }
        }
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if !self.enter() {
            return None;
        }
        let stmt = match self.peek_kind() {
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Fn if matches!(self.look_ahead(1), TokenKind::Identifier(_)) => {
                self.parse_fn_def()
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_jump(Stmt::Break),
            TokenKind::Continue => self.parse_jump(Stmt::Continue),
            TokenKind::Write => self.parse_write(),
            _ => self.parse_simple().and_then(|stmt| {
                self.expect_semicolon()?;
                Some(stmt)
            }),
        };
        self.leave();
        stmt
    }

    /// `fn name(params) { body }`
    fn parse_fn_def(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let id = self.fresh_id();
        let name = self.expect_identifier()?;
        let decl = self.parse_fn_decl()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::FnDef(FnDef {
            id,
            name,
            decl: Rc::new(decl),
            span,
        }))
    }

    /// `if (cond) stmt [else stmt]`; `else` binds to the nearest `if`.
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let condition = self.parse_condition()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        }))
    }

    /// `while (cond) stmt`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let condition = self.parse_condition()?;
        let body = Box::new(self.parse_statement()?);
        let span = start.merge(self.previous_span());
        Some(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `for (init; test; increment) stmt`
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        self.expect(&TokenKind::LParen)?;
        let init = Box::new(self.parse_simple()?);
        self.expect(&TokenKind::Semicolon)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        let increment = Box::new(self.parse_simple()?);
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        let span = start.merge(self.previous_span());
        Some(Stmt::For(ForStmt {
            init,
            test,
            increment,
            body,
            span,
        }))
    }

    /// `return;` or `return expr;`
    fn parse_return(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::Return(ReturnStmt { value, span }))
    }

    /// `break;` / `continue;`
    fn parse_jump(&mut self, make: fn(Span) -> Stmt) -> Option<Stmt> {
        let start = self.advance().span;
        self.expect_semicolon()?;
        Some(make(start.merge(self.previous_span())))
    }

    /// `write expr;`
    fn parse_write(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let value = self.parse_expression()?;
        self.expect_semicolon()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::Write(WriteStmt { value, span }))
    }

    /// `(expr)` around an `if` / `while` condition.
    fn parse_condition(&mut self) -> Option<Expr> {
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        Some(condition)
    }

    /// Assignment or expression statement, without the trailing `;`.
    ///
    /// The left side is parsed as an ordinary expression; when `=` follows it
    /// must have been a bare name or a property access.
    fn parse_simple(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        if !self.check(&TokenKind::Eq) {
            let span = expr.span;
            return Some(Stmt::Expr(ExprStmt { expr, span }));
        }
        let eq_span = self.advance().span;
        let value = self.parse_expression()?;
        let span = expr.span.merge(value.span);
        match expr.kind {
            ExprKind::Identifier(name) => Some(Stmt::Assign(AssignStmt {
                name: Ident::new(name, expr.span),
                value,
                span,
            })),
            ExprKind::Property { target, name } => Some(Stmt::PropAssign(PropAssignStmt {
                target: *target,
                property: name,
                value,
                span,
            })),
            _ => {
                self.error_at(
                    ErrorCode::INVALID_ASSIGNMENT_TARGET,
                    "only a variable or a property can be assigned to",
                    expr.span.merge(eq_span),
                );
                None
            }
        }
    }
}
