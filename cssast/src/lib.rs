#![allow(clippy::needless_return)]
#![allow(clippy::new_without_default)]

//! CSS tokenizer and recursive descent parser producing a typed syntax tree.
//!
//! Parsing never fails: malformed input yields a best-effort tree plus a list
//! of [`ParseError`]s, each anchored at a line and column.

pub mod ast;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod tokenizer;

use std::io::Read;

pub use ast::{Dump, Node, Stylesheet};
pub use config::Config;
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use parser::{registry::AtRuleRegistry, Parse, Parser};
pub use tokenizer::{tokenize, Token, TokenKind, Tokenizer};

/// Parses `input` with the default configuration.
pub fn parse(input: &[u8]) -> (Stylesheet, Vec<ParseError>) {
    parse_with_config(input, &Config::default()).into_parts()
}

#[tracing::instrument(skip_all, fields(len = input.len()))]
pub fn parse_with_config(input: &[u8], config: &Config) -> Parse {
    let tokens = tokenize(input);
    let parse = Parser::with_config(tokens, config).parse();
    tracing::debug!(
        rules = parse.stylesheet().rules.len(),
        errors = parse.errors().len(),
        "parsed stylesheet"
    );
    parse
}

/// Reads all of `reader`. Input is taken as bytes, no encoding is assumed.
pub fn read_source(mut reader: impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn parse_reader(reader: impl Read, config: &Config) -> Result<Parse> {
    let input = read_source(reader)?;
    Ok(parse_with_config(&input, config))
}

#[cfg(test)]
mod test_lib {
    use super::*;

    #[test]
    fn parse_reader_reads_everything() {
        let parse = parse_reader(&b"a { color: red; }"[..], &Config::default()).unwrap();
        assert!(!parse.has_errors());
        assert_eq!(parse.stylesheet().rules.len(), 1);
    }

    #[test]
    fn parse_result_into_error() {
        let (stylesheet, errors) = parse(b"a { color: red; } }");
        assert_eq!(stylesheet.rules.len(), 1);
        assert_eq!(errors.len(), 1);

        let err = parse_with_config(b"}", &Config::default()).ok().unwrap_err();
        let Error::Parse { errors } = err else {
            panic!("expected parse error");
        };
        assert_eq!(errors[0].kind, ParseErrorKind::Unexpected);
        assert_eq!(errors[0].to_string(), "1:1: Unexpected token at stylesheet level");
    }
}
