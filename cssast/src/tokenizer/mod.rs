//! A byte-level css tokenizer producing a fine-grained token vocabulary:
//! - punctuation is emitted one token per byte, except the composites `^=` and `::`
//! - hex colors are only recognised for exactly 3 or 6 hex digits, otherwise `#` is a `Hash`
//! - units are not fused with numbers, the parser does that
//! - whitespace is skipped, comments are kept
//! - unquoted `url(...)` is emitted as a single `Uri` token

mod cursor;

use cursor::Cursor;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Parsed token. `literal` borrows the exact source bytes, including
/// delimiters for strings, comments and uris.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub literal: &'a [u8],
    pub line: u32,
    pub column: u32,
    /// Byte offset of the first byte of `literal`.
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// Byte offset one past the last byte of `literal`.
    pub fn end(&self) -> usize {
        self.offset + self.literal.len()
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.literal.eq_ignore_ascii_case(text.as_bytes())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TokenKind {
    /// Identifier, including custom property names (`--x`), vendor prefixed
    /// names (`-webkit-box`) and escape-initiated names (`\31 0`).
    Ident,
    /// Digits with an optional fractional part and an optional leading `-`.
    /// Never includes a unit.
    Number,
    /// Quoted string, the literal includes the quotes. May be unterminated.
    String,
    /// `#` followed by exactly 3 or 6 hex digits and a non identifier byte.
    Color,
    /// Unquoted `url(...)`, the literal includes `url(` and `)`.
    Uri,
    /// `/* ... */`, the literal includes the markers. May be unterminated.
    Comment,
    /// Any byte with no meaning in the token vocabulary.
    Illegal,
    /// End of input
    Eof,

    /// `#` not starting a color
    Hash,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `::`
    DblColon,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `=`
    Equals,
    /// `+`
    Plus,
    /// `-` not starting a number or identifier
    Minus,
    /// `>`
    Greater,
    /// `~`
    Tilde,
    /// `|`
    Pipe,
    /// `%`
    Percentage,
    /// `$`
    Dollar,
    /// `!`
    Exclamation,
    /// `@`
    At,
    /// `*`
    Asterisk,
    /// `.`
    Dot,
    /// `/`
    Divide,
    /// `^=`
    #[strum(serialize = "STARTS_WITH")]
    StartsWith,
}

/// Tokenizes the whole input. The result always ends with exactly one `Eof` token.
#[tracing::instrument(skip_all, fields(len = input.len()))]
pub fn tokenize(input: &[u8]) -> Vec<Token<'_>> {
    let tokens: Vec<Token<'_>> = Tokenizer::new(input).collect();
    tracing::trace!(count = tokens.len(), "tokenized");
    tokens
}

/// Iterator over the tokens of one input. Yields the `Eof` token once, then `None`.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
            done: false,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        let token = self.consume_token();
        if token.kind == TokenKind::Eof {
            self.done = true;
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

impl<'a> Tokenizer<'a> {
    /// Skips whitespace, then consumes exactly one token.
    pub fn consume_token(&mut self) -> Token<'a> {
        self.cursor.bump_while_first(is_white_space);

        let start = self.cursor.snapshot();

        use TokenKind::*;
        let kind = if self.cursor.is_eof() {
            Eof
        } else {
            match self.cursor.first() {
                b';' => {self.cursor.bump(); Semicolon},
                b',' => {self.cursor.bump(); Comma},
                b'(' => {self.cursor.bump(); LParen},
                b')' => {self.cursor.bump(); RParen},
                b'{' => {self.cursor.bump(); LBrace},
                b'}' => {self.cursor.bump(); RBrace},
                b'[' => {self.cursor.bump(); LBracket},
                b']' => {self.cursor.bump(); RBracket},
                b'=' => {self.cursor.bump(); Equals},
                b'+' => {self.cursor.bump(); Plus},
                b'>' => {self.cursor.bump(); Greater},
                b'~' => {self.cursor.bump(); Tilde},
                b'|' => {self.cursor.bump(); Pipe},
                b'%' => {self.cursor.bump(); Percentage},
                b'$' => {self.cursor.bump(); Dollar},
                b'!' => {self.cursor.bump(); Exclamation},
                b'@' => {self.cursor.bump(); At},
                b'*' => {self.cursor.bump(); Asterisk},
                b'.' => {self.cursor.bump(); Dot},
                b'^' => {
                    self.cursor.bump();
                    if self.cursor.first() == b'=' {
                        self.cursor.bump();
                        StartsWith
                    } else {
                        Illegal
                    }
                },
                b':' => {
                    self.cursor.bump();
                    if self.cursor.first() == b':' {
                        self.cursor.bump();
                        DblColon
                    } else {
                        Colon
                    }
                },
                b'#' => {
                    self.cursor.bump();
                    self.consume_hash()
                },
                b'-' => self.consume_dash(),
                b'\\' => {
                    self.consume_ident();
                    Ident
                },
                b'/' => {
                    self.cursor.bump();
                    if self.cursor.first() == b'*' {
                        self.cursor.bump();
                        self.consume_comment()
                    } else {
                        Divide
                    }
                },
                quote @ (b'"' | b'\'') => {
                    self.cursor.bump();
                    self.consume_string(quote)
                },
                b if is_ident_start(b) => self.consume_ident_like(),
                b if b.is_ascii_digit() => self.consume_number(),
                _ => {self.cursor.bump(); Illegal},
            }
        };

        Token {
            kind,
            literal: self.cursor.slice_from(start.pos),
            line: start.line,
            column: start.column,
            offset: start.pos,
        }
    }

    /// PRECONDITION: consumed '#'
    /// A color needs exactly 3 or 6 hex digits that are not followed by an identifier byte,
    /// anything else rewinds to just after the '#'.
    fn consume_hash(&mut self) -> TokenKind {
        let after_hash = self.cursor.snapshot();
        let mut hex_digits = 0;
        while hex_digits < 6 && self.cursor.first().is_ascii_hexdigit() && !self.cursor.is_eof() {
            self.cursor.bump();
            hex_digits += 1;
        }
        let terminated = self.cursor.is_eof() || !is_ident_part(self.cursor.first());
        if (hex_digits == 3 || hex_digits == 6) && terminated {
            return TokenKind::Color;
        }
        self.cursor.restore(after_hash);
        TokenKind::Hash
    }

    /// PRECONDITION: first byte is '-', nothing consumed
    fn consume_dash(&mut self) -> TokenKind {
        let next = self.cursor.second();
        if next == b'-' {
            // custom property or `--` on its own
            self.cursor.bump_two();
            self.consume_name_rest();
            TokenKind::Ident
        } else if next.is_ascii_digit() {
            self.cursor.bump();
            self.consume_number()
        } else if is_white_space(next) {
            self.cursor.bump();
            TokenKind::Minus
        } else if is_ident_start(next) || next == b'\\' {
            self.cursor.bump();
            self.consume_ident();
            TokenKind::Ident
        } else {
            self.cursor.bump();
            TokenKind::Minus
        }
    }

    /// PRECONDITION: first byte is an identifier start or '\\', nothing consumed
    fn consume_ident(&mut self) {
        if self.cursor.first() == b'\\' {
            self.cursor.bump();
            self.consume_escape();
        }
        self.consume_name_rest();
    }

    fn consume_name_rest(&mut self) {
        while !self.cursor.is_eof() {
            match self.cursor.first() {
                b'\\' => {
                    self.cursor.bump();
                    self.consume_escape();
                },
                b if is_ident_part(b) => {
                    self.cursor.bump();
                },
                _ => break,
            }
        }
    }

    /// PRECONDITION: consumed '\\'
    /// Up to 6 hex digits plus one optional trailing space, or any single byte but a newline.
    fn consume_escape(&mut self) {
        if self.cursor.is_eof() {
            return;
        }
        if self.cursor.first().is_ascii_hexdigit() {
            let mut hex_digits = 0;
            while hex_digits < 6 && !self.cursor.is_eof() && self.cursor.first().is_ascii_hexdigit() {
                self.cursor.bump();
                hex_digits += 1;
            }
            if self.cursor.first() == b' ' {
                self.cursor.bump();
            }
        } else if self.cursor.first() != b'\n' {
            self.cursor.bump();
        }
    }

    /// PRECONDITION: first byte is an identifier start, nothing consumed
    /// Returns `Uri` for an unquoted `url(...)`, `Ident` otherwise.
    fn consume_ident_like(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        self.consume_ident();
        if !self.cursor.slice_from(start).eq_ignore_ascii_case(b"url") || self.cursor.first() != b'(' {
            return TokenKind::Ident;
        }

        let mut lookahead = 1;
        while is_white_space(self.cursor.nth(lookahead)) {
            lookahead += 1;
        }
        if matches!(self.cursor.nth(lookahead), b'"' | b'\'') {
            // quoted urls are a plain function call
            return TokenKind::Ident;
        }

        self.cursor.bump();
        while !self.cursor.is_eof() {
            match self.cursor.first() {
                b')' => {
                    self.cursor.bump();
                    break;
                },
                b'\\' => {
                    self.cursor.bump();
                    self.cursor.bump();
                },
                _ => {
                    self.cursor.bump();
                },
            }
        }
        TokenKind::Uri
    }

    /// Integer part, then a fractional part only if '.' is followed by a digit.
    fn consume_number(&mut self) -> TokenKind {
        self.cursor.bump_while_first(|b| b.is_ascii_digit());
        if self.cursor.first() == b'.' && self.cursor.second().is_ascii_digit() {
            self.cursor.bump();
            self.cursor.bump_while_first(|b| b.is_ascii_digit());
        }
        TokenKind::Number
    }

    /// PRECONDITION: consumed "/*"
    /// An unterminated comment runs to the end of input.
    fn consume_comment(&mut self) -> TokenKind {
        while !self.cursor.is_eof() {
            if self.cursor.first() == b'*' && self.cursor.second() == b'/' {
                self.cursor.bump_two();
                break;
            }
            self.cursor.bump();
        }
        TokenKind::Comment
    }

    /// PRECONDITION: consumed the opening quote
    /// Stops after the matching quote, or before a raw newline, or at the end of input.
    fn consume_string(&mut self, quote: u8) -> TokenKind {
        while !self.cursor.is_eof() {
            match self.cursor.first() {
                b if b == quote => {
                    self.cursor.bump();
                    break;
                },
                b'\n' => break,
                b'\\' => {
                    self.cursor.bump();
                    self.cursor.bump();
                },
                _ => {
                    self.cursor.bump();
                },
            }
        }
        TokenKind::String
    }
}

pub fn is_white_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Letters, '_' and any byte >= 0x80.
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

pub fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit() || b == b'-'
}
