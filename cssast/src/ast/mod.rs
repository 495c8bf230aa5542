//! Typed CSS syntax tree. Nodes own their bytes, so a tree outlives the
//! tokens it was built from. Byte slices are kept as found in the source:
//! no case folding, no unescaping, no UTF-8 validation.

mod at_rules;
mod dump;

pub use at_rules::*;
pub use dump::{Dump, Dumper};

use strum_macros::{Display, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum NodeKind {
    Stylesheet,
    Comment,
    Selector,
    Declaration,
    MediaAtRule,
    KeyframesAtRule,
    KeyframeStop,
    ImportAtRule,
    CharsetAtRule,
    FontFaceAtRule,
    FontFeatureValuesAtRule,
    FontFeatureValuesBlock,
    ColorProfileAtRule,
    CounterStyleAtRule,
    ContainerAtRule,
    SupportsAtRule,
    LayerAtRule,
    PageAtRule,
    NamespaceAtRule,
    ViewportAtRule,
}

/// Implemented by every node type: a kind tag plus the debug dump.
pub trait AstNode: Dump {
    fn kind(&self) -> NodeKind;
}

/// Anything that can be a member of a rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Comment(Comment),
    Selector(Selector),
    Declaration(Declaration),
    Media(MediaAtRule),
    Keyframes(KeyframesAtRule),
    Import(ImportAtRule),
    Charset(CharsetAtRule),
    FontFace(FontFaceAtRule),
    FontFeatureValues(FontFeatureValuesAtRule),
    ColorProfile(ColorProfileAtRule),
    CounterStyle(CounterStyleAtRule),
    Container(ContainerAtRule),
    Supports(SupportsAtRule),
    Layer(LayerAtRule),
    Page(PageAtRule),
    Namespace(NamespaceAtRule),
    Viewport(ViewportAtRule),
}

impl Node {
    pub fn is_at_rule(&self) -> bool {
        !matches!(self, Node::Comment(_) | Node::Selector(_) | Node::Declaration(_))
    }

    fn as_ast_node(&self) -> &dyn AstNode {
        match self {
            Node::Comment(n) => n,
            Node::Selector(n) => n,
            Node::Declaration(n) => n,
            Node::Media(n) => n,
            Node::Keyframes(n) => n,
            Node::Import(n) => n,
            Node::Charset(n) => n,
            Node::FontFace(n) => n,
            Node::FontFeatureValues(n) => n,
            Node::ColorProfile(n) => n,
            Node::CounterStyle(n) => n,
            Node::Container(n) => n,
            Node::Supports(n) => n,
            Node::Layer(n) => n,
            Node::Page(n) => n,
            Node::Namespace(n) => n,
            Node::Viewport(n) => n,
        }
    }
}

impl AstNode for Node {
    fn kind(&self) -> NodeKind {
        self.as_ast_node().kind()
    }
}

/// Root of every parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Comments, rule-sets and at-rules in source order.
    pub rules: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Includes the `/*` `*/` markers.
    pub text: Vec<u8>,
}

/// A rule-set: selector atoms followed by a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub selectors: Vec<SelectorValue>,
    /// Only `Declaration`, nested `Selector` and `Comment`.
    pub rules: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum SelectorKind {
    Element,
    Class,
    #[strum(serialize = "ID")]
    Id,
    Attribute,
    Pseudo,
    Combinator,
}

/// One selector atom. Classes and ids keep their `.`/`#`, pseudos their `:`/`::`,
/// attributes their brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorValue {
    pub kind: SelectorKind,
    pub value: Vec<u8>,
}

impl SelectorValue {
    pub fn new(kind: SelectorKind, value: impl Into<Vec<u8>>) -> Self {
        Self { kind, value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub key: Vec<u8>,
    /// One entry per token group, separators dropped.
    pub value: Vec<Value>,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Basic(BasicValue),
    String(StringValue),
    Function(FunctionValue),
}

impl Value {
    pub fn basic(value: impl Into<Vec<u8>>) -> Self {
        Value::Basic(BasicValue { value: value.into() })
    }
}

/// Identifiers, numbers with their unit, colors, operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicValue {
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    pub single_quote: bool,
    /// Without the quotes.
    pub value: Vec<u8>,
}

impl StringValue {
    /// Builds from a string literal as tokenized, tolerating a missing closing quote.
    pub fn from_literal(literal: &[u8]) -> Self {
        let single_quote = literal.first() == Some(&b'\'');
        let inner = match literal {
            [open, inner @ .., close] if open == close => inner,
            [_, inner @ ..] => inner,
            [] => literal,
        };
        Self {
            single_quote,
            value: inner.to_vec(),
        }
    }
}

/// `name(args)`. A parenthesized group without a name has an empty `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionValue {
    pub name: Vec<u8>,
    pub args: Vec<Value>,
}

impl AstNode for Stylesheet {
    fn kind(&self) -> NodeKind {
        NodeKind::Stylesheet
    }
}

impl AstNode for Comment {
    fn kind(&self) -> NodeKind {
        NodeKind::Comment
    }
}

impl AstNode for Selector {
    fn kind(&self) -> NodeKind {
        NodeKind::Selector
    }
}

impl AstNode for Declaration {
    fn kind(&self) -> NodeKind {
        NodeKind::Declaration
    }
}
