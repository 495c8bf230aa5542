use super::{Parser, TokenJoiner};
use crate::ast::*;
use crate::error::ParseErrorKind::{Expected, Unexpected};
use crate::tokenizer::TokenKind;

/// Units fused with a directly preceding number, besides `%`.
const UNITS: &[&str] = &[
    // absolute lengths
    "cm", "mm", "in", "px", "pt", "pc", "q",
    // relative lengths
    "em", "ex", "ch", "rem", "lh", "rlh", "vb", "vi",
    // viewport percentages
    "vw", "vh", "vmin", "vmax",
    "svw", "svh", "svi", "svb", "svmin", "svmax",
    "lvw", "lvh", "lvi", "lvb", "lvmin", "lvmax",
    "dvw", "dvh", "dvi", "dvb", "dvmin", "dvmax",
    // container query lengths
    "cqw", "cqh", "cqi", "cqb", "cqmin", "cqmax",
    // angles
    "deg", "grad", "rad", "turn",
    // times
    "s", "ms",
    // frequencies
    "hz", "khz",
    // resolutions
    "dpi", "dpcm", "dppx",
    // flex
    "fr",
];

/// `%` or a unit from the unit table, ASCII case-insensitive.
pub fn is_unit(suffix: &[u8]) -> bool {
    suffix == b"%" || UNITS.iter().any(|unit| unit.as_bytes().eq_ignore_ascii_case(suffix))
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// `url(...)` as one `Uri` token becomes the same tree as the quoted call form.
fn uri_value(literal: &[u8]) -> Value {
    let (name, rest) = literal.split_at(literal.len().min(3));
    let inner = rest.strip_prefix(b"(").unwrap_or(rest);
    let inner = inner.strip_suffix(b")").unwrap_or(inner);
    let inner = trim_ascii_whitespace(inner);
    let arg = match inner.first() {
        Some(b'"' | b'\'') => Value::String(StringValue::from_literal(inner)),
        _ => Value::basic(inner),
    };
    Value::Function(FunctionValue {
        name: name.to_vec(),
        args: vec![arg],
    })
}

impl<'a> Parser<'a> {
    /// Tokens that open a rule-set at stylesheet or block level.
    pub(crate) fn starts_rule_set(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Dot
                | TokenKind::Hash
                | TokenKind::Color
                | TokenKind::Colon
                | TokenKind::DblColon
                | TokenKind::Ident
                | TokenKind::LBracket
                | TokenKind::Asterisk
        )
    }

    #[tracing::instrument(skip_all)]
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        let mut stylesheet = Stylesheet::default();
        while !self.at_eof() {
            let kind = self.current().kind;
            if kind == TokenKind::Comment {
                if let Some(comment) = self.parse_comment() {
                    stylesheet.rules.push(Node::Comment(comment));
                }
            } else if Self::starts_rule_set(kind) {
                if let Some(selector) = self.parse_selector() {
                    stylesheet.rules.push(Node::Selector(selector));
                }
            } else if kind == TokenKind::At {
                if let Some(at_rule) = self.parse_at_rule() {
                    stylesheet.rules.push(at_rule);
                }
            } else {
                self.error_at_current(Unexpected, "Unexpected token at stylesheet level");
                self.advance();
            }
        }
        return stylesheet;
    }

    #[cfg(test)]
    pub(crate) fn parse_stylesheet_fall(&mut self) -> Option<Stylesheet> {
        Some(self.parse_stylesheet())
    }

    /// PRECONDITION: current is COMMENT
    /// None when comments are not kept.
    pub fn parse_comment(&mut self) -> Option<Comment> {
        let text = self.current().literal.to_vec();
        self.advance();
        if !self.keep_comments {
            return None;
        }
        return Some(Comment { text });
    }

    // ===============
    // RULE-SETS
    // ===============

    /// Selector atoms up to `{`, then the block.
    pub fn parse_selector(&mut self) -> Option<Selector> {
        let mut selector = Selector::default();
        loop {
            let token = *self.current();
            match token.kind {
                TokenKind::LBrace => break,
                TokenKind::Eof | TokenKind::RBrace | TokenKind::Semicolon => {
                    self.error_at_current(Expected, "Expected '{' after selector");
                    return None;
                }
                TokenKind::Comment => self.advance(),
                TokenKind::Ident | TokenKind::Asterisk => {
                    selector.selectors.push(SelectorValue::new(SelectorKind::Element, token.literal));
                    self.advance();
                }
                TokenKind::Dot => {
                    self.advance();
                    if let Some(class) = self.parse_prefixed_name(token.literal, SelectorKind::Class, "Expected identifier after '.'") {
                        selector.selectors.push(class);
                    }
                }
                TokenKind::Hash => {
                    self.advance();
                    if let Some(id) = self.parse_prefixed_name(token.literal, SelectorKind::Id, "Expected identifier after '#'") {
                        selector.selectors.push(id);
                    }
                }
                TokenKind::Color => {
                    // `#abc` tokenizes as a color but reads as an id here
                    selector.selectors.push(SelectorValue::new(SelectorKind::Id, token.literal));
                    self.advance();
                }
                TokenKind::LBracket => {
                    let attribute = self.parse_attribute_selector();
                    selector.selectors.push(attribute);
                }
                TokenKind::Colon | TokenKind::DblColon => {
                    if let Some(pseudo) = self.parse_pseudo_selector() {
                        selector.selectors.push(pseudo);
                    }
                }
                TokenKind::Comma | TokenKind::Greater | TokenKind::Plus | TokenKind::Tilde => {
                    selector.selectors.push(SelectorValue::new(SelectorKind::Combinator, token.literal));
                    self.advance();
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in selector");
                    self.advance();
                }
            }
        }
        selector.rules = self.nested(
            "Unexpected token in selector",
            |parser| {
                parser.advance(); // `{`
                Some(parser.parse_rule_set_body())
            },
            Self::skip_to_next_rule,
        )?;
        return Some(selector);
    }

    fn parse_prefixed_name(&mut self, prefix: &[u8], kind: SelectorKind, message: &str) -> Option<SelectorValue> {
        if !self.current_is(TokenKind::Ident) {
            self.error_at_current(Expected, message);
            return None;
        }
        let mut value = prefix.to_vec();
        value.extend_from_slice(self.current().literal);
        self.advance();
        return Some(SelectorValue::new(kind, value));
    }

    /// PRECONDITION: current is LBRACKET
    fn parse_attribute_selector(&mut self) -> SelectorValue {
        self.advance();
        let mut joiner = TokenJoiner::with_prefix(b"[");
        loop {
            match self.current().kind {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace => {
                    self.error_at_current(Expected, "Expected ']' after attribute selector");
                    break;
                }
                _ => {
                    joiner.push(self.current());
                    self.advance();
                }
            }
        }
        joiner.push_bytes(b"]");
        return SelectorValue::new(SelectorKind::Attribute, joiner.finish());
    }

    /// PRECONDITION: current is COLON or DBLCOLON
    /// An argument list like `:not(.a, .b)` is kept verbatim in the atom.
    fn parse_pseudo_selector(&mut self) -> Option<SelectorValue> {
        let prefix = *self.current();
        self.advance();
        if !self.current_is(TokenKind::Ident) {
            self.error_at_current(Expected, "Expected identifier after ':'");
            return None;
        }
        let mut joiner = TokenJoiner::with_prefix(prefix.literal);
        joiner.push_bytes(self.current().literal);
        self.advance();
        if self.current_is(TokenKind::LParen) {
            self.parse_parenthesized_verbatim(&mut joiner);
        }
        return Some(SelectorValue::new(SelectorKind::Pseudo, joiner.finish()));
    }

    /// PRECONDITION: current is LPAREN
    fn parse_parenthesized_verbatim(&mut self, joiner: &mut TokenJoiner) {
        let mut depth = 0usize;
        loop {
            let token = *self.current();
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        joiner.push(&token);
                        self.advance();
                        return;
                    }
                }
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => {
                    self.error_at_current(Expected, "Expected ')' after pseudo argument");
                    return;
                }
                _ => {}
            }
            joiner.push(&token);
            self.advance();
        }
    }

    /// PRECONDITION: consumed `{`
    /// Declarations, nested rule-sets and comments, up to and including `}`.
    fn parse_rule_set_body(&mut self) -> Vec<Node> {
        let mut rules = Vec::new();
        loop {
            let kind = self.current().kind;
            match kind {
                TokenKind::RBrace => {
                    self.advance();
                    return rules;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, "Expected '}' after selector block");
                    return rules;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::Comment => {
                    if let Some(comment) = self.parse_comment() {
                        rules.push(Node::Comment(comment));
                    }
                }
                // `color red;` is a broken declaration, `a b {` a nested rule-set
                TokenKind::Ident if !self.block_follows() => {
                    if let Some(declaration) = self.parse_declaration() {
                        rules.push(Node::Declaration(declaration));
                    }
                }
                TokenKind::At => {
                    // parsed to stay in sync, but a rule-set block holds no at-rules
                    self.error_at_current(Unexpected, "Unexpected token in selector");
                    let _ = self.parse_at_rule();
                }
                kind if Self::starts_rule_set(kind) => {
                    if let Some(selector) = self.parse_selector() {
                        rules.push(Node::Selector(selector));
                    }
                }
                _ => {
                    self.error_at_current(Expected, "Expected property name");
                    self.skip_to_next_semicolon_or_brace();
                }
            }
        }
    }

    /// PRECONDITION: consumed `{`
    /// Comments, rule-sets and at-rules up to and including `}`; `context` names the block in errors.
    pub(crate) fn parse_nested_rules(&mut self, context: &str) -> Vec<Node> {
        let mut rules = Vec::new();
        loop {
            let kind = self.current().kind;
            match kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, &format!("Expected '}}' after {context}"));
                    break;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::Comment => {
                    if let Some(comment) = self.parse_comment() {
                        rules.push(Node::Comment(comment));
                    }
                }
                TokenKind::At => {
                    if let Some(at_rule) = self.parse_at_rule() {
                        rules.push(at_rule);
                    }
                }
                kind if Self::starts_rule_set(kind) => {
                    if let Some(selector) = self.parse_selector() {
                        rules.push(Node::Selector(selector));
                    }
                }
                _ => {
                    self.error_at_current(Unexpected, &format!("Unexpected token in {context}"));
                    self.advance();
                }
            }
        }
        return rules;
    }

    // ===============
    // DECLARATIONS
    // ===============

    /// PRECONDITION: current is IDENT (the property name)
    /// Stops before the `;` or `}` ending the declaration.
    /// Only custom properties (`--x: ;`) may have an empty value.
    pub fn parse_declaration(&mut self) -> Option<Declaration> {
        if !self.current_is(TokenKind::Ident) {
            self.error_at_current(Expected, "Expected property name");
            self.skip_to_next_semicolon_or_brace();
            return None;
        }
        let key = self.current().literal.to_vec();
        self.advance();
        if !self.consume(TokenKind::Colon, "Expected ':' after property name") {
            self.skip_to_next_semicolon_or_brace();
            return None;
        }

        let mut value = Vec::new();
        let mut important = false;
        loop {
            match self.current().kind {
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Comma | TokenKind::Comment => self.advance(),
                TokenKind::Exclamation if self.next().is_ident("important") => {
                    self.advance();
                    self.advance();
                    important = true;
                }
                _ => {
                    if let Some(atom) = self.parse_value() {
                        value.push(atom);
                    }
                }
            }
        }

        if value.is_empty() && !key.starts_with(b"--") {
            self.error_at_current(Expected, "Expected value after ':'");
            return None;
        }
        return Some(Declaration { key, value, important });
    }

    // ===============
    // VALUES
    // ===============

    /// Consumes one value atom. None when the token was dropped with an error.
    pub fn parse_value(&mut self) -> Option<Value> {
        let token = *self.current();
        match token.kind {
            TokenKind::Number => Some(Value::basic(self.parse_numeric())),
            TokenKind::Minus | TokenKind::Plus | TokenKind::Dot if self.starts_numeric() => {
                Some(Value::basic(self.parse_numeric()))
            }
            TokenKind::Ident if self.next_is(TokenKind::LParen) => Some(self.parse_function()),
            TokenKind::Uri => {
                self.advance();
                Some(uri_value(token.literal))
            }
            TokenKind::String => {
                self.advance();
                Some(Value::String(StringValue::from_literal(token.literal)))
            }
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_function_args();
                Some(Value::Function(FunctionValue { name: Vec::new(), args }))
            }
            TokenKind::Hash => Some(self.parse_hash_value()),
            // `!` only belongs in a trailing `!important`
            TokenKind::Illegal | TokenKind::LBrace | TokenKind::Exclamation => {
                self.error_at_current(Unexpected, "Unexpected token in declaration value");
                self.advance();
                None
            }
            TokenKind::Eof => None,
            _ => {
                self.advance();
                Some(Value::basic(token.literal))
            }
        }
    }

    /// A sign and/or `.` directly followed by a number, like `-.5` or `+3`.
    pub(crate) fn starts_numeric(&self) -> bool {
        let mut n = 0;
        if matches!(self.nth(n).kind, TokenKind::Minus | TokenKind::Plus) {
            if !self.nth_is_adjacent(n + 1) {
                return false;
            }
            n += 1;
        }
        if self.nth(n).kind == TokenKind::Dot {
            if !self.nth_is_adjacent(n + 1) {
                return false;
            }
            n += 1;
        }
        return n > 0 && self.nth(n).kind == TokenKind::Number;
    }

    /// Number bytes with any adjacent sign/dot prefix and `%`/unit suffix.
    pub(crate) fn parse_numeric(&mut self) -> Vec<u8> {
        let mut bytes = Vec::new();
        while matches!(self.current().kind, TokenKind::Minus | TokenKind::Plus | TokenKind::Dot) {
            bytes.extend_from_slice(self.current().literal);
            self.advance();
        }
        if !self.current_is(TokenKind::Number) {
            return bytes;
        }
        bytes.extend_from_slice(self.current().literal);
        let next = *self.next();
        let suffix = match next.kind {
            TokenKind::Percentage => true,
            TokenKind::Ident => is_unit(next.literal),
            _ => false,
        };
        if suffix && self.next_is_adjacent() {
            self.advance();
            bytes.extend_from_slice(next.literal);
        }
        self.advance();
        return bytes;
    }

    /// PRECONDITION: current is IDENT, next is LPAREN
    pub fn parse_function(&mut self) -> Value {
        let name = self.current().literal.to_vec();
        self.advance();
        self.advance();
        let args = self.parse_function_args();
        return Value::Function(FunctionValue { name, args });
    }

    /// PRECONDITION: consumed `(`
    pub(crate) fn parse_function_args(&mut self) -> Vec<Value> {
        self.nested("Unexpected token in function", Self::parse_args_to_paren, Self::skip_past_paren)
    }

    fn parse_args_to_paren(&mut self) -> Vec<Value> {
        let mut args = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, "Expected ')' after function arguments");
                    break;
                }
                TokenKind::Semicolon | TokenKind::RBrace => {
                    self.error_at_current(Unexpected, "Unexpected token in function");
                    break;
                }
                TokenKind::Comma | TokenKind::Comment => self.advance(),
                _ => {
                    if let Some(arg) = self.parse_value() {
                        args.push(arg);
                    }
                }
            }
        }
        return args;
    }

    /// PRECONDITION: current is HASH
    /// `#` with the identifier and number tokens directly after it, e.g. `#1234ZZ`.
    fn parse_hash_value(&mut self) -> Value {
        let mut bytes = self.current().literal.to_vec();
        while self.next_is_adjacent() && matches!(self.next().kind, TokenKind::Ident | TokenKind::Number) {
            self.advance();
            bytes.extend_from_slice(self.current().literal);
        }
        self.advance();
        return Value::basic(bytes);
    }
}
