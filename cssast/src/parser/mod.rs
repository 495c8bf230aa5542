//! Recursive descent parser over a materialised token vector.
//!
//! The driver owns a look-ahead of two tokens (`current`, `next`), the error
//! accumulator and the recovery primitives. The productions live in
//! `css_grammar` (stylesheet, rule-sets, declarations, values) and
//! `at_rules` (one sub-grammar per registered at-rule).

mod at_rules;
mod css_grammar;
mod css_grammar_test;
pub mod registry;

use itertools::Itertools;

use crate::ast::{Dump, Stylesheet};
use crate::config::Config;
use crate::error::{Error, ParseError, ParseErrorKind};
use crate::tokenizer::{Token, TokenKind};
use registry::AtRuleRegistry;

pub use css_grammar::is_unit;

/// Blocks and parenthesized groups nested deeper than this are skipped with an error.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Result of one parse: the tree is always there, the errors say whether to trust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    stylesheet: Stylesheet,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Stylesheet, Vec<ParseError>) {
        (self.stylesheet, self.errors)
    }

    pub fn ok(self) -> Result<Stylesheet, Error> {
        if self.errors.is_empty() {
            Ok(self.stylesheet)
        } else {
            Err(Error::Parse { errors: self.errors })
        }
    }

    /// Tree dump followed by one line per error.
    pub fn debug_dump(&self) -> String {
        let tree = self.stylesheet.dump_string();
        if self.errors.is_empty() {
            return tree;
        }
        let errors = self
            .errors
            .iter()
            .map(|error| format!("error {}: {} ({})", error.kind.code(), error, error.token_kind))
            .join("\n");
        format!("{tree}\n{errors}")
    }
}

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    /// Index of `current`; `next` is `pos + 1`, both clamped to the trailing `Eof`.
    pos: usize,
    /// Blocks and parenthesized groups currently open.
    depth: usize,
    errors: Vec<ParseError>,
    registry: AtRuleRegistry,
    keep_comments: bool,
    max_errors: Option<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self::with_config(tokens, &Config::default())
    }

    pub fn with_config(mut tokens: Vec<Token<'a>>, config: &Config) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column, offset) = tokens
                .last()
                .map_or((1, 1, 0), |t| (t.line, t.column + t.literal.len() as u32, t.end()));
            tokens.push(Token {
                kind: TokenKind::Eof,
                literal: &[],
                line,
                column,
                offset,
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            errors: Vec::new(),
            registry: config.registry(),
            keep_comments: config.keep_comments,
            max_errors: config.max_errors,
        }
    }

    pub fn with_registry(mut self, registry: AtRuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Parses the whole token stream into a stylesheet.
    pub fn parse(mut self) -> Parse {
        let stylesheet = self.parse_stylesheet();
        Parse {
            stylesheet,
            errors: self.errors,
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    // ===============
    // PEEK (inspectors)
    // ===============

    pub fn current(&self) -> &Token<'a> {
        self.nth(0)
    }

    pub fn next(&self) -> &Token<'a> {
        self.nth(1)
    }

    /// Token `n` positions after `current`, `Eof` when past the end.
    pub fn nth(&self, n: usize) -> &Token<'a> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    pub fn current_is(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub fn next_is(&self, kind: TokenKind) -> bool {
        self.next().kind == kind
    }

    pub fn current_is_ident(&self, text: &str) -> bool {
        self.current().is_ident(text)
    }

    /// `next` starts right where `current` ends.
    pub fn next_is_adjacent(&self) -> bool {
        self.nth_is_adjacent(1)
    }

    /// Token `n` starts right where token `n - 1` ends.
    pub fn nth_is_adjacent(&self, n: usize) -> bool {
        if n == 0 || self.pos + n >= self.tokens.len() {
            return false;
        }
        let token = self.nth(n);
        return token.kind != TokenKind::Eof && self.nth(n - 1).end() == token.offset;
    }

    pub fn at_eof(&self) -> bool {
        self.current_is(TokenKind::Eof)
    }

    /// A `{` comes before the next `;` or `}`, so the tokens ahead open a block
    /// rather than end a declaration.
    pub fn block_follows(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| {
                matches!(
                    t.kind,
                    TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                )
            })
            .is_some_and(|t| t.kind == TokenKind::LBrace)
    }

    // ===============
    // CONSUME (mutators)
    // ===============

    /// Shifts `next` into `current`. Stays on `Eof` once reached.
    pub fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn accept(&mut self, kind: TokenKind) -> bool {
        if self.current_is(kind) {
            self.advance();
            return true;
        }
        return false;
    }

    pub fn accept_ident(&mut self, text: &str) -> bool {
        if self.current_is_ident(text) {
            self.advance();
            return true;
        }
        return false;
    }

    /// Advances over `kind`, or records `message` at `current`.
    pub fn consume(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.accept(kind) {
            return true;
        }
        self.error_at_current(ParseErrorKind::Expected, message);
        return false;
    }

    pub fn skip_comments(&mut self) {
        while self.current_is(TokenKind::Comment) {
            self.advance();
        }
    }

    // ===============
    // ERRORS
    // ===============

    pub fn add_error(&mut self, kind: ParseErrorKind, message: &str, token: Token<'a>) {
        if self.max_errors.is_some_and(|max| self.errors.len() >= max) {
            return;
        }
        tracing::debug!(
            line = token.line,
            column = token.column,
            token = %token.kind,
            code = kind.code(),
            msg = message,
            "parse error"
        );
        self.errors.push(ParseError::new(kind, message, &token));
    }

    pub fn error_at_current(&mut self, kind: ParseErrorKind, message: &str) {
        let token = *self.current();
        self.add_error(kind, message, token);
    }

    // ===============
    // NESTING
    // ===============

    /// Runs `parse` one nesting level deeper. Past `MAX_NESTING_DEPTH` the construct
    /// is not descended into: `message` is recorded at `current` and `skip` drops it.
    pub(crate) fn nested<T: Default>(
        &mut self,
        message: &str,
        parse: impl FnOnce(&mut Self) -> T,
        skip: impl FnOnce(&mut Self),
    ) -> T {
        if self.depth >= MAX_NESTING_DEPTH {
            tracing::debug!(depth = self.depth, "nesting limit reached");
            self.error_at_current(ParseErrorKind::Unexpected, message);
            skip(self);
            return T::default();
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        return node;
    }

    // ===============
    // RECOVERY
    // ===============

    /// Drops the rest of the current block: advances to the `}` closing it and consumes it.
    /// Blocks opened while skipping are skipped whole.
    pub fn skip_to_next_rule(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth <= 1 {
                        self.advance();
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Drops the rest of the current declaration: consumes up to and including `;`,
    /// stops before `}`.
    pub fn skip_to_next_semicolon_or_brace(&mut self) {
        loop {
            match self.current().kind {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    /// Advances past the `)` closing the current group, without leaving the enclosing block.
    pub fn skip_past_paren(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => return,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Drops an at-rule whose grammar is unknown: a statement ends after its `;`,
    /// a block after its matching `}`. A `}` of the enclosing block is left alone.
    pub fn skip_at_rule(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// Joins token literals verbatim, putting one space where the source had a gap.
#[derive(Debug, Default)]
pub(crate) struct TokenJoiner {
    buf: Vec<u8>,
    last_end: Option<usize>,
}

impl TokenJoiner {
    pub fn with_prefix(prefix: &[u8]) -> Self {
        Self {
            buf: prefix.to_vec(),
            last_end: None,
        }
    }

    /// Comments only count as a gap.
    pub fn push(&mut self, token: &Token<'_>) {
        if token.kind == TokenKind::Comment {
            return;
        }
        if self.last_end.is_some_and(|end| end != token.offset) {
            self.buf.push(b' ');
        }
        self.buf.extend_from_slice(token.literal);
        self.last_end = Some(token.end());
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn is_empty(&self) -> bool {
        self.last_end.is_none()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
