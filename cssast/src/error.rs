use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::tokenizer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// "Expected X after Y": a required token was missing.
    Expected,
    /// "Unexpected token in <context>": a token that does not fit the grammar, including `ILLEGAL`.
    Unexpected,
    /// "Unsupported at-rule": an at-rule name missing from the registry.
    Unsupported,
}

impl ParseErrorKind {
    pub fn code(&self) -> &'static str {
        use ParseErrorKind::*;
        return match self {
            Expected => "css-expected",
            Unexpected => "css-unexpected",
            Unsupported => "css-unsupported-at-rule",
        };
    }
}

/// A recoverable error anchored at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub token_kind: TokenKind,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, token: &Token<'_>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: token.line,
            column: token.column,
            token_kind: token.kind,
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("offending token: {}", self.token_kind)))
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("could not read css input")]
    #[diagnostic(code(cssast::io))]
    Io(#[from] std::io::Error),

    #[error("css input has {} parse error(s)", .errors.len())]
    #[diagnostic(code(cssast::parse))]
    Parse {
        #[related]
        errors: Vec<ParseError>,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
