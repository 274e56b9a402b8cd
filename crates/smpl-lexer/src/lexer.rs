//! Core SMPL lexer — converts source text to a token stream.
//!
//! - Whitespace (including newlines) is insignificant; statements end with `;`
//! - `//` line comments and `/* */` block comments are skipped
//! - Literal tokens keep their raw text, string escapes are left untouched
//! - Error recovery: collects up to [`smpl_types::MAX_ERRORS`] errors

use smpl_types::{Diagnostics, ErrorCode, SmplError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The SMPL lexer.
pub struct Lexer<'src> {
    /// Full source text.
    text: &'src str,
    /// The same text as bytes, for cheap lookahead.
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: Diagnostics,
}

/// Result of lexing: tokens plus any errors collected.
pub struct LexResult {
    /// The token stream, always terminated by [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub errors: Diagnostics,
}

/// Where a token started.
#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
    col: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            text: &source_file.source,
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::new(),
        }
    }

    /// Lex the entire source file.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.is_full() {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start: Mark) -> Span {
        Span::new(
            start.line,
            start.col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn lexeme(&self, start: Mark) -> &'src str {
        self.text.get(start.pos..self.pos).unwrap_or("")
    }

    fn token_from(&self, kind: TokenKind, start: Mark) -> Token {
        Token::new(kind, self.span_from(start))
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = SmplError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments until the next significant byte.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|ch| ch != b'\n') {
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.mark();
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_COMMENT,
                        "Unterminated block comment",
                        span,
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia();
            let start = self.mark();
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'"' => return self.scan_string(start),
                b'0'..=b'9' => return self.scan_number(start),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.scan_identifier(start),

                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'%' => TokenKind::Percent,
                b'?' => TokenKind::Question,
                b'.' => TokenKind::Dot,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b',' => TokenKind::Comma,
                b';' => TokenKind::Semicolon,
                b':' => TokenKind::Colon,
                b'=' => self.one_or_two(b'=', TokenKind::EqEq, TokenKind::Eq),
                b'<' => self.one_or_two(b'=', TokenKind::LessEq, TokenKind::Less),
                b'>' => self.one_or_two(b'=', TokenKind::GreaterEq, TokenKind::Greater),
                b'!' if self.peek() == Some(b'=') => {
                    self.advance();
                    TokenKind::BangEq
                }
                b'!' => {
                    let span = self.span_from(start);
                    let source_line = self.source_file.line(span.start_line).unwrap_or("");
                    let err = SmplError::new(
                        &self.source_file.name,
                        ErrorCode::UNEXPECTED_CHARACTER,
                        "Unexpected character '!'",
                        span,
                        source_line,
                    )
                    .with_suggestion("Use 'not' for negation, or '!=' for inequality");
                    self.errors.push(err);
                    continue;
                }
                _ => {
                    self.skip_unexpected(start);
                    continue;
                }
            };
            return self.token_from(kind, start);
        }
    }

    fn one_or_two(&mut self, next: u8, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            double
        } else {
            single
        }
    }

    /// Report and skip a character that cannot start a token.
    fn skip_unexpected(&mut self, start: Mark) {
        // Step over the rest of a multi-byte character so lexemes stay on
        // char boundaries.
        while self.peek().is_some_and(|b| (b & 0xC0) == 0x80) {
            self.advance();
        }
        let found = self.lexeme(start);
        let span = self.span_from(start);
        self.emit_error(
            ErrorCode::UNEXPECTED_CHARACTER,
            format!("Unexpected character '{found}'"),
            span,
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a number whose first digit has been consumed.
    ///
    /// `0x` introduces hex digits, `0o` introduces the octal-prefixed form;
    /// both are integers. A fraction or an exponent makes a float.
    fn scan_number(&mut self, start: Mark) -> Token {
        let first = self.source[start.pos];
        if first == b'0' && matches!(self.peek(), Some(b'x' | b'o')) {
            let hex = self.peek() == Some(b'x');
            self.advance();
            let digits_start = self.pos;
            while self.peek().is_some_and(|ch| {
                if hex {
                    ch.is_ascii_hexdigit()
                } else {
                    ch.is_ascii_digit()
                }
            }) {
                self.advance();
            }
            if self.pos == digits_start {
                let span = self.span_from(start);
                self.emit_error(
                    ErrorCode::MALFORMED_NUMBER,
                    format!("Missing digits after '{}'", self.lexeme(start)),
                    span,
                );
            }
            return self.token_from(TokenKind::IntLit(self.lexeme(start).to_string()), start);
        }

        self.eat_digits();
        let mut is_float = false;

        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|ch| ch.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.eat_digits();
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digit_at = match self.peek_at(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if self.peek_at(digit_at).is_some_and(|ch| ch.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let raw = self.lexeme(start).to_string();
        let kind = if is_float {
            TokenKind::FloatLit(raw)
        } else {
            TokenKind::IntLit(raw)
        };
        self.token_from(kind, start)
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self, start: Mark) -> Token {
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == b'_')
        {
            self.advance();
        }
        let text = self.lexeme(start);
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        self.token_from(kind, start)
    }

    /// Scan a string literal after its opening quote.
    ///
    /// A backslash always takes the following character with it, so `\"`
    /// does not close the literal. Whether the escape is meaningful is decided
    /// at run time.
    fn scan_string(&mut self, start: Mark) -> Token {
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                    );
                    // Close the raw text so later stages see a well-formed literal.
                    let raw = format!("{}\"", self.lexeme(start));
                    return self.token_from(TokenKind::StrLit(raw), start);
                }
                Some(b'"') => {
                    self.advance();
                    let raw = self.lexeme(start).to_string();
                    return self.token_from(TokenKind::StrLit(raw), start);
                }
                Some(b'\\') => {
                    self.advance();
                    if self.peek().is_some_and(|ch| ch != b'\n') {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}
