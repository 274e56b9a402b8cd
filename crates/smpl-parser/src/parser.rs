//! Core parser infrastructure: token cursor, error reporting, helpers.

use smpl_lexer::token::{Token, TokenKind};
use smpl_lexer::Lexer;
use smpl_types::ast::{Ident, NodeId, Program};
use smpl_types::{Diagnostics, ErrorCode, SmplError, SourceFile, Span};

/// Deepest expression / statement nesting accepted before bailing out.
pub(crate) const MAX_NESTING: u32 = 128;

/// The SMPL parser.
///
/// Consumes the lexer's token stream and builds a [`Program`]. Errors are
/// collected and parsing resumes at the next statement boundary.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: Diagnostics,
    /// Next id handed to a memoizable node.
    next_id: u32,
    /// Current nesting depth of expressions and statements.
    pub(crate) depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    /// `None` only when errors prevented building any tree.
    pub program: Option<Program>,
    pub errors: Diagnostics,
}

/// Lex and parse a whole source file. Lexer diagnostics come first.
pub fn parse_source(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::new(TokenKind::Eof, Span::point(1, 1))]
        } else {
            tokens
        };
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::new(),
            next_id: 0,
            depth: 0,
        }
    }

    /// Parse the token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program: Some(program),
            errors: self.errors,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        // `new` guarantees at least one token, and the last one is never passed.
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Advance past the current token if it is `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                let message = if other.is_keyword() {
                    format!("'{other}' is a reserved word and cannot be used as a name")
                } else {
                    format!("expected identifier, got '{other}'")
                };
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    /// Expect the `;` that ends a simple statement.
    pub(crate) fn expect_semicolon(&mut self) -> Option<()> {
        if self.eat(&TokenKind::Semicolon) {
            return Some(());
        }
        let span = self.current_span();
        let source_line = self.source_line(span);
        let err = SmplError::new(
            &self.source_file.name,
            ErrorCode::UNEXPECTED_TOKEN,
            format!("expected ';', got '{}'", self.peek_kind()),
            span,
            source_line,
        )
        .with_suggestion("end the statement with ';'");
        self.errors.push(err);
        None
    }

    // ── Node ids & nesting ────────────────────────────────────────────────────

    pub(crate) fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Enter one level of nesting; reports and returns `false` past the limit.
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("nesting deeper than {MAX_NESTING} levels"),
            );
            self.depth -= 1;
            return false;
        }
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_line(span);
        let error = SmplError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push(error);
    }

    fn source_line(&self, span: Span) -> String {
        self.source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string()
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the next statement boundary after an error: just past a `;`,
    /// or before a `}` or a statement keyword.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                kind if kind.starts_statement() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
