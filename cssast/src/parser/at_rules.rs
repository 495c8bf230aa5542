use super::registry::AtRuleKind;
use super::{Parser, TokenJoiner};
use crate::ast::*;
use crate::error::ParseErrorKind::{Expected, Unexpected, Unsupported};
use crate::tokenizer::TokenKind;

impl<'a> Parser<'a> {
    /// PRECONDITION: current is AT
    /// Dispatches on the registry. Unknown at-rules are recorded and skipped whole.
    pub fn parse_at_rule(&mut self) -> Option<Node> {
        self.nested("Unexpected token in nested at-rule", Self::dispatch_at_rule, Self::skip_at_rule)
    }

    fn dispatch_at_rule(&mut self) -> Option<Node> {
        let named = self.next_is(TokenKind::Ident) && self.next_is_adjacent();
        self.advance();
        if !named {
            self.error_at_current(Expected, "Expected identifier after '@'");
            self.skip_at_rule();
            return None;
        }
        let name = *self.current();
        let Some(kind) = self.registry.lookup(name.literal) else {
            tracing::debug!(name = %String::from_utf8_lossy(name.literal), "skipping unsupported at-rule");
            self.add_error(Unsupported, "Unsupported at-rule", name);
            self.advance();
            self.skip_at_rule();
            return None;
        };
        self.advance();
        self.skip_comments();

        return match kind {
            AtRuleKind::Media => self.parse_media().map(Node::Media),
            AtRuleKind::Keyframes => self.parse_keyframes(false).map(Node::Keyframes),
            AtRuleKind::WebkitKeyframes => self.parse_keyframes(true).map(Node::Keyframes),
            AtRuleKind::Import => self.parse_import().map(Node::Import),
            AtRuleKind::Charset => self.parse_charset().map(Node::Charset),
            AtRuleKind::FontFace => self.parse_font_face().map(Node::FontFace),
            AtRuleKind::FontFeatureValues => self.parse_font_feature_values().map(Node::FontFeatureValues),
            AtRuleKind::ColorProfile => self.parse_color_profile().map(Node::ColorProfile),
            AtRuleKind::CounterStyle => self.parse_counter_style().map(Node::CounterStyle),
            AtRuleKind::Container => self.parse_container().map(Node::Container),
            AtRuleKind::Supports => self.parse_supports().map(Node::Supports),
            AtRuleKind::Layer => self.parse_layer().map(Node::Layer),
            AtRuleKind::Page => self.parse_page().map(Node::Page),
            AtRuleKind::Namespace => self.parse_namespace().map(Node::Namespace),
            AtRuleKind::Viewport => self.parse_viewport(name.literal).map(Node::Viewport),
        };
    }

    /// `{ declarations }`. When `{` is missing the error is recorded and the rest of the block dropped.
    pub(crate) fn parse_declaration_block(&mut self, context: &str) -> Option<Vec<Declaration>> {
        if !self.consume(TokenKind::LBrace, &format!("Expected '{{' after {context}")) {
            self.skip_to_next_rule();
            return None;
        }
        let mut declarations = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, &format!("Expected '}}' after {context}"));
                    break;
                }
                TokenKind::Semicolon | TokenKind::Comment => self.advance(),
                TokenKind::Ident => {
                    if let Some(declaration) = self.parse_declaration() {
                        declarations.push(declaration);
                    }
                }
                _ => {
                    self.error_at_current(Expected, "Expected property name");
                    self.skip_to_next_semicolon_or_brace();
                }
            }
        }
        return Some(declarations);
    }

    // ===============
    // @media
    // ===============

    pub fn parse_media(&mut self) -> Option<MediaAtRule> {
        let query = self.parse_media_query();
        if !self.consume(TokenKind::LBrace, "Expected '{' after media query") {
            self.skip_to_next_rule();
            return None;
        }
        let rules = self.parse_nested_rules("media block");
        return Some(MediaAtRule { query, rules });
    }

    fn at_media_query_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    /// Comma separated expressions, stopping before `{` or `;`.
    pub fn parse_media_query(&mut self) -> MediaQuery {
        let mut query = MediaQuery::default();
        self.skip_comments();
        if self.at_media_query_end() {
            return query;
        }
        loop {
            query.expressions.push(self.parse_media_query_expression());
            if !self.accept(TokenKind::Comma) {
                break;
            }
            self.skip_comments();
        }
        return query;
    }

    /// `[not|only] [type] [and] (feature) [and (feature)]*`
    fn parse_media_query_expression(&mut self) -> MediaQueryExpression {
        let mut expression = MediaQueryExpression::default();
        self.skip_comments();
        if self.accept_ident("not") {
            expression.not = true;
        } else if self.accept_ident("only") {
            expression.only = true;
        }
        self.skip_comments();
        if self.current_is(TokenKind::Ident) && !self.current_is_ident("and") {
            expression.media_type = Some(self.current().literal.to_vec());
            self.advance();
        }
        loop {
            self.skip_comments();
            if self.current_is(TokenKind::LParen) {
                if let Some(feature) = self.parse_media_feature() {
                    expression.features.push(feature);
                }
            } else if self.current_is_ident("and") {
                self.advance();
                self.skip_comments();
                if !self.current_is(TokenKind::LParen) {
                    self.error_at_current(Expected, "Expected '(' after 'and'");
                }
            } else {
                break;
            }
        }
        if !self.current_is(TokenKind::Comma) && !self.at_media_query_end() {
            self.error_at_current(Unexpected, "Unexpected token in media block");
            while !self.current_is(TokenKind::Comma) && !self.at_media_query_end() {
                self.advance();
            }
        }
        return expression;
    }

    /// PRECONDITION: current is LPAREN
    pub fn parse_media_feature(&mut self) -> Option<MediaFeature> {
        self.advance();
        self.skip_comments();
        if !self.current_is(TokenKind::Ident) {
            self.error_at_current(Expected, "Expected feature name after '('");
            self.skip_past_paren();
            return None;
        }
        let name = self.current().literal.to_vec();
        self.advance();
        self.skip_comments();

        let value = if self.accept(TokenKind::Colon) {
            let value = self.parse_feature_value(false);
            if value.is_empty() {
                self.error_at_current(Expected, "Expected value after ':'");
            }
            Some(value)
        } else if self.current_is(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_feature_value(false))
        };

        if !self.consume(TokenKind::RParen, "Expected ')' after media feature") {
            self.skip_past_paren();
        }
        return Some(MediaFeature { name, value });
    }

    /// Joins the tokens of a feature value up to the `)` closing the feature.
    /// With `stop_at_and` a top level `and` ends the value too.
    fn parse_feature_value(&mut self, stop_at_and: bool) -> Vec<u8> {
        let mut joiner = TokenJoiner::default();
        let mut depth = 0usize;
        loop {
            let token = *self.current();
            match token.kind {
                TokenKind::RParen if depth == 0 => break,
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => break,
                TokenKind::Ident if depth == 0 && stop_at_and && token.is_ident("and") => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            joiner.push(&token);
            self.advance();
        }
        return joiner.finish();
    }

    // ===============
    // @keyframes
    // ===============

    pub fn parse_keyframes(&mut self, webkit_prefix: bool) -> Option<KeyframesAtRule> {
        let token = *self.current();
        let name = match token.kind {
            TokenKind::Ident => token.literal.to_vec(),
            TokenKind::String => StringValue::from_literal(token.literal).value,
            _ => {
                self.error_at_current(Expected, "Expected name after @keyframes");
                self.skip_to_next_rule();
                return None;
            }
        };
        self.advance();
        self.skip_comments();
        if !self.consume(TokenKind::LBrace, "Expected '{' after keyframes name") {
            self.skip_to_next_rule();
            return None;
        }

        let mut stops = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, "Expected '}' after keyframes block");
                    break;
                }
                TokenKind::Comment | TokenKind::Semicolon => self.advance(),
                _ => {
                    if let Some(stop) = self.parse_keyframe_stop() {
                        stops.push(stop);
                    }
                }
            }
        }
        return Some(KeyframesAtRule {
            name,
            webkit_prefix,
            stops,
        });
    }

    /// `from, 50% { declarations }`
    pub fn parse_keyframe_stop(&mut self) -> Option<KeyframeStop> {
        let mut stops = Vec::new();
        loop {
            let token = *self.current();
            match token.kind {
                TokenKind::LBrace => break,
                TokenKind::Eof | TokenKind::RBrace | TokenKind::Semicolon => {
                    self.error_at_current(Expected, "Expected '{' after keyframe selector");
                    return None;
                }
                TokenKind::Comma | TokenKind::Comment => self.advance(),
                TokenKind::Ident if token.is_ident("from") || token.is_ident("to") => {
                    stops.push(token.literal.to_vec());
                    self.advance();
                }
                TokenKind::Number => stops.push(self.parse_numeric()),
                TokenKind::Dot | TokenKind::Plus if self.starts_numeric() => stops.push(self.parse_numeric()),
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in keyframe selector");
                    self.advance();
                }
            }
        }
        if stops.is_empty() {
            self.error_at_current(Expected, "Expected keyframe selector before '{'");
        }
        let rules = self.parse_declaration_block("keyframe selector")?;
        if stops.is_empty() {
            return None;
        }
        return Some(KeyframeStop { stops, rules });
    }

    // ===============
    // @import
    // ===============

    /// `url` or string, then optional `layer`, `supports(...)` and media query, then `;`.
    pub fn parse_import(&mut self) -> Option<ImportAtRule> {
        let Some(url) = self.parse_url() else {
            self.error_at_current(Expected, "Expected string or url() after @import");
            self.skip_to_next_semicolon_or_brace();
            return None;
        };
        let mut import = ImportAtRule {
            url,
            layer: None,
            supports: None,
            media: None,
        };
        loop {
            self.skip_comments();
            let token = *self.current();
            match token.kind {
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::Eof | TokenKind::RBrace | TokenKind::LBrace => {
                    self.error_at_current(Expected, "Expected ';' after @import");
                    break;
                }
                TokenKind::Ident if token.is_ident("layer") => {
                    let layer = if self.next_is(TokenKind::LParen) {
                        self.parse_function()
                    } else {
                        self.advance();
                        Value::basic(token.literal)
                    };
                    if import.layer.is_some() {
                        self.add_error(Unexpected, "Unexpected token in import rule", token);
                    } else {
                        import.layer = Some(layer);
                    }
                }
                TokenKind::Ident if token.is_ident("supports") && self.next_is(TokenKind::LParen) => {
                    self.advance();
                    self.advance();
                    let condition = self.parse_supports_condition(TokenKind::RParen);
                    self.consume(TokenKind::RParen, "Expected ')' after supports condition");
                    if import.supports.is_some() {
                        self.add_error(Unexpected, "Unexpected token in import rule", token);
                    } else {
                        import.supports = Some(condition);
                    }
                }
                TokenKind::Ident | TokenKind::LParen if import.media.is_none() => {
                    import.media = Some(self.parse_media_query());
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in import rule");
                    self.advance();
                }
            }
        }
        return Some(import);
    }

    /// A string, an unquoted `url(...)` or a `url("...")` call. None leaves `current` alone.
    fn parse_url(&mut self) -> Option<Value> {
        self.skip_comments();
        match self.current().kind {
            TokenKind::String | TokenKind::Uri => self.parse_value(),
            TokenKind::Ident if self.current_is_ident("url") && self.next_is(TokenKind::LParen) => self.parse_value(),
            _ => None,
        }
    }

    // ===============
    // @supports
    // ===============

    pub fn parse_supports(&mut self) -> Option<SupportsAtRule> {
        let condition = self.parse_supports_condition(TokenKind::LBrace);
        if !self.consume(TokenKind::LBrace, "Expected '{' after supports condition") {
            self.skip_to_next_rule();
            return None;
        }
        let rules = self.parse_nested_rules("supports block");
        return Some(SupportsAtRule { condition, rules });
    }

    /// Conditions up to `terminator` (not consumed), wrapped in a group.
    pub fn parse_supports_condition(&mut self, terminator: TokenKind) -> SupportsCondition {
        SupportsCondition::Group {
            conditions: self.parse_supports_sequence(terminator),
        }
    }

    fn parse_supports_sequence(&mut self, terminator: TokenKind) -> Vec<SupportsCondition> {
        let mut conditions = Vec::new();
        loop {
            let token = *self.current();
            if token.kind == terminator {
                break;
            }
            match token.kind {
                // a missing `)` is reported by whoever expected it
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => break,
                TokenKind::Comment => self.advance(),
                TokenKind::LParen => {
                    if let Some(condition) = self.parse_supports_in_parens() {
                        conditions.push(condition);
                    }
                }
                TokenKind::Ident if token.is_ident("and") || token.is_ident("or") => {
                    conditions.push(SupportsCondition::Operator {
                        op: token.literal.to_vec(),
                    });
                    self.advance();
                }
                TokenKind::Ident if token.is_ident("not") => {
                    self.advance();
                    self.skip_comments();
                    if self.current_is(TokenKind::LParen) {
                        if let Some(inner) = self.parse_supports_in_parens() {
                            conditions.push(SupportsCondition::Not { inner: Box::new(inner) });
                        }
                    } else {
                        self.error_at_current(Expected, "Expected '(' after 'not'");
                    }
                }
                TokenKind::Ident if self.next_is(TokenKind::Colon) => {
                    conditions.push(self.parse_supports_declaration());
                }
                TokenKind::Ident if self.next_is(TokenKind::LParen) => {
                    let name = token.literal.to_vec();
                    self.advance();
                    self.advance();
                    let args = self.parse_function_args();
                    conditions.push(SupportsCondition::Function { name, args });
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in supports condition");
                    self.advance();
                }
            }
        }
        return conditions;
    }

    /// PRECONDITION: current is LPAREN
    fn parse_supports_in_parens(&mut self) -> Option<SupportsCondition> {
        self.nested(
            "Unexpected token in supports condition",
            Self::parse_supports_group,
            |parser| {
                parser.advance();
                parser.skip_past_paren();
            },
        )
    }

    /// PRECONDITION: current is LPAREN
    fn parse_supports_group(&mut self) -> Option<SupportsCondition> {
        self.advance();
        let inner = self.parse_supports_sequence(TokenKind::RParen);
        let condition = if inner.is_empty() {
            self.error_at_current(Expected, "Expected condition after '('");
            None
        } else {
            Some(SupportsCondition::from_sequence(inner))
        };
        self.consume(TokenKind::RParen, "Expected ')' after supports condition");
        return condition;
    }

    /// PRECONDITION: current is IDENT, next is COLON
    fn parse_supports_declaration(&mut self) -> SupportsCondition {
        let key = self.current().literal.to_vec();
        self.advance();
        self.advance();
        let mut value = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::RParen | TokenKind::Eof | TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => break,
                TokenKind::Comma | TokenKind::Comment => self.advance(),
                TokenKind::Exclamation if self.next().is_ident("important") => {
                    value.push(Value::basic(self.current().literal));
                    self.advance();
                }
                _ => {
                    if let Some(atom) = self.parse_value() {
                        value.push(atom);
                    }
                }
            }
        }
        if value.is_empty() {
            self.error_at_current(Expected, "Expected value after ':'");
        }
        return SupportsCondition::Declaration { key, value };
    }

    // ===============
    // statements
    // ===============

    pub fn parse_charset(&mut self) -> Option<CharsetAtRule> {
        if !self.current_is(TokenKind::String) {
            self.error_at_current(Expected, "Expected string after @charset");
            self.skip_to_next_semicolon_or_brace();
            return None;
        }
        let charset = StringValue::from_literal(self.current().literal).value;
        self.advance();
        self.consume(TokenKind::Semicolon, "Expected ';' after @charset");
        return Some(CharsetAtRule { charset });
    }

    pub fn parse_namespace(&mut self) -> Option<NamespaceAtRule> {
        let mut prefix = None;
        if self.current_is(TokenKind::Ident) && !(self.current_is_ident("url") && self.next_is(TokenKind::LParen)) {
            prefix = Some(self.current().literal.to_vec());
            self.advance();
        }
        let Some(url) = self.parse_url() else {
            self.error_at_current(Expected, "Expected string or url() after @namespace");
            self.skip_to_next_semicolon_or_brace();
            return None;
        };
        self.skip_comments();
        self.consume(TokenKind::Semicolon, "Expected ';' after @namespace");
        return Some(NamespaceAtRule { prefix, url });
    }

    /// `@layer a, b.c;` or `@layer a { rules }`
    pub fn parse_layer(&mut self) -> Option<LayerAtRule> {
        let mut names = Vec::new();
        loop {
            self.skip_comments();
            let token = *self.current();
            match token.kind {
                TokenKind::Ident => {
                    let mut name = token.literal.to_vec();
                    self.advance();
                    while self.current_is(TokenKind::Dot) && self.next_is(TokenKind::Ident) && self.next_is_adjacent() {
                        self.advance();
                        name.push(b'.');
                        name.extend_from_slice(self.current().literal);
                        self.advance();
                    }
                    names.push(name);
                }
                TokenKind::Comma => self.advance(),
                TokenKind::Semicolon => {
                    if names.is_empty() {
                        self.error_at_current(Expected, "Expected layer name after @layer");
                    }
                    self.advance();
                    return Some(LayerAtRule { names, rules: None });
                }
                TokenKind::LBrace => {
                    self.advance();
                    let rules = self.parse_nested_rules("layer block");
                    return Some(LayerAtRule {
                        names,
                        rules: Some(rules),
                    });
                }
                TokenKind::Eof | TokenKind::RBrace => {
                    self.error_at_current(Expected, "Expected ';' or '{' after layer name");
                    return None;
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in layer rule");
                    self.advance();
                }
            }
        }
    }

    // ===============
    // declaration blocks
    // ===============

    pub fn parse_font_face(&mut self) -> Option<FontFaceAtRule> {
        let declarations = self.parse_declaration_block("@font-face")?;
        return Some(FontFaceAtRule { declarations });
    }

    pub fn parse_counter_style(&mut self) -> Option<CounterStyleAtRule> {
        if !self.current_is(TokenKind::Ident) {
            self.error_at_current(Expected, "Expected identifier after @counter-style");
            self.skip_to_next_rule();
            return None;
        }
        let name = self.current().literal.to_vec();
        self.advance();
        self.skip_comments();
        let declarations = self.parse_declaration_block("@counter-style")?;
        return Some(CounterStyleAtRule { name, declarations });
    }

    /// `device-cmyk` or a dashed-ident, then declarations.
    pub fn parse_color_profile(&mut self) -> Option<ColorProfileAtRule> {
        let token = *self.current();
        let (device_cmyk, name) = if token.is_ident("device-cmyk") {
            (true, None)
        } else if token.kind == TokenKind::Ident && token.literal.starts_with(b"--") {
            (false, Some(token.literal.to_vec()))
        } else {
            self.error_at_current(Expected, "Expected dashed-ident or device-cmyk after @color-profile");
            self.skip_to_next_rule();
            return None;
        };
        self.advance();
        self.skip_comments();
        let declarations = self.parse_declaration_block("@color-profile")?;
        return Some(ColorProfileAtRule {
            device_cmyk,
            name,
            declarations,
        });
    }

    /// Page name and pseudo pages are kept verbatim.
    pub fn parse_page(&mut self) -> Option<PageAtRule> {
        let mut joiner = TokenJoiner::default();
        loop {
            match self.current().kind {
                TokenKind::LBrace | TokenKind::Eof | TokenKind::RBrace | TokenKind::Semicolon => break,
                TokenKind::Comment => self.advance(),
                _ => {
                    joiner.push(self.current());
                    self.advance();
                }
            }
        }
        let selector = if joiner.is_empty() { None } else { Some(joiner.finish()) };
        let declarations = self.parse_declaration_block("@page")?;
        return Some(PageAtRule { selector, declarations });
    }

    pub fn parse_viewport(&mut self, name: &[u8]) -> Option<ViewportAtRule> {
        let declarations = self.parse_declaration_block("@viewport")?;
        return Some(ViewportAtRule {
            name: name.to_vec(),
            declarations,
        });
    }

    /// Family names, then `@feature-type { declarations }` blocks.
    pub fn parse_font_feature_values(&mut self) -> Option<FontFeatureValuesAtRule> {
        let mut font_families = Vec::new();
        loop {
            let token = *self.current();
            match token.kind {
                TokenKind::LBrace => break,
                TokenKind::Comma | TokenKind::Comment => self.advance(),
                TokenKind::String => {
                    font_families.push(StringValue::from_literal(token.literal).value);
                    self.advance();
                }
                TokenKind::Ident => {
                    // unquoted family names may span several identifiers
                    let mut family = token.literal.to_vec();
                    self.advance();
                    while self.current_is(TokenKind::Ident) {
                        family.push(b' ');
                        family.extend_from_slice(self.current().literal);
                        self.advance();
                    }
                    font_families.push(family);
                }
                _ => {
                    self.error_at_current(Expected, "Expected '{' after font family list");
                    self.skip_to_next_rule();
                    return None;
                }
            }
        }
        if font_families.is_empty() {
            self.error_at_current(Expected, "Expected font family name after @font-feature-values");
        }
        self.advance(); // `{`

        let mut blocks = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, "Expected '}' after feature value block");
                    break;
                }
                TokenKind::Semicolon | TokenKind::Comment => self.advance(),
                TokenKind::At => {
                    self.advance();
                    if !self.current_is(TokenKind::Ident) {
                        self.error_at_current(Expected, "Expected identifier after '@'");
                        self.skip_at_rule();
                        continue;
                    }
                    let name = self.current().literal.to_vec();
                    self.advance();
                    self.skip_comments();
                    if let Some(declarations) = self.parse_declaration_block("feature value block") {
                        blocks.push(FontFeatureValuesBlock { name, declarations });
                    }
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in feature value block");
                    self.advance();
                }
            }
        }
        return Some(FontFeatureValuesAtRule { font_families, blocks });
    }

    // ===============
    // @container
    // ===============

    /// Optional name, `and`-joined conditions, then a block of declarations and rule-sets.
    pub fn parse_container(&mut self) -> Option<ContainerAtRule> {
        let mut name = None;
        let token = *self.current();
        if token.kind == TokenKind::Ident
            && !token.is_ident("not")
            && !token.is_ident("and")
            && !(self.next_is(TokenKind::LParen) && self.next_is_adjacent())
        {
            name = Some(token.literal.to_vec());
            self.advance();
        }

        let mut query = Vec::new();
        loop {
            self.skip_comments();
            if self.current_is(TokenKind::LParen) {
                query.push(self.parse_container_condition());
            } else if self.current_is_ident("and") {
                self.advance();
                self.skip_comments();
                if !self.current_is(TokenKind::LParen) {
                    self.error_at_current(Expected, "Expected '(' after 'and'");
                }
            } else {
                break;
            }
        }
        if !matches!(
            self.current().kind,
            TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof
        ) {
            self.error_at_current(Unexpected, "Unexpected token in container rule");
            while !matches!(
                self.current().kind,
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof
            ) {
                self.advance();
            }
        }

        if !self.consume(TokenKind::LBrace, "Expected '{' after container query") {
            self.skip_to_next_rule();
            return None;
        }
        let rules = self.parse_container_body();
        return Some(ContainerAtRule { name, query, rules });
    }

    /// PRECONDITION: current is LPAREN
    /// Nested parentheses contribute their features to the same condition.
    pub fn parse_container_condition(&mut self) -> ContainerCondition {
        self.nested(
            "Unexpected token in container rule",
            Self::parse_container_group,
            |parser| {
                parser.advance();
                parser.skip_past_paren();
            },
        )
    }

    /// PRECONDITION: current is LPAREN
    fn parse_container_group(&mut self) -> ContainerCondition {
        self.advance();
        let mut condition = ContainerCondition::default();
        loop {
            self.skip_comments();
            let token = *self.current();
            match token.kind {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => {
                    self.error_at_current(Expected, "Expected ')' after container condition");
                    break;
                }
                TokenKind::Ident if token.is_ident("and") => self.advance(),
                TokenKind::Ident => {
                    self.advance();
                    self.skip_comments();
                    let value = if self.accept(TokenKind::Colon) {
                        Some(self.parse_feature_value(true))
                    } else if self.current_is(TokenKind::RParen) || self.current_is_ident("and") {
                        None
                    } else {
                        Some(self.parse_feature_value(true))
                    };
                    condition.features.push(MediaFeature {
                        name: token.literal.to_vec(),
                        value,
                    });
                }
                TokenKind::LParen => {
                    let nested = self.parse_container_condition();
                    condition.features.extend(nested.features);
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in container rule");
                    self.advance();
                }
            }
        }
        return condition;
    }

    /// PRECONDITION: consumed `{`
    fn parse_container_body(&mut self) -> Vec<Node> {
        let mut rules = Vec::new();
        loop {
            let kind = self.current().kind;
            match kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(Expected, "Expected '}' after container rule");
                    break;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::Comment => {
                    if let Some(comment) = self.parse_comment() {
                        rules.push(Node::Comment(comment));
                    }
                }
                TokenKind::Ident if !self.block_follows() => {
                    if let Some(declaration) = self.parse_declaration() {
                        rules.push(Node::Declaration(declaration));
                    }
                }
                TokenKind::At => {
                    self.error_at_current(Unexpected, "Unexpected token in container rule");
                    let _ = self.parse_at_rule();
                }
                kind if Self::starts_rule_set(kind) => {
                    if let Some(selector) = self.parse_selector() {
                        rules.push(Node::Selector(selector));
                    }
                }
                _ => {
                    self.error_at_current(Unexpected, "Unexpected token in container rule");
                    self.advance();
                }
            }
        }
        return rules;
    }
}
