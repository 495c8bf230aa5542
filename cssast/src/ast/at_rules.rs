use super::{AstNode, Declaration, Node, NodeKind, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAtRule {
    pub query: MediaQuery,
    pub rules: Vec<Node>,
}

/// Comma separated list of expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQuery {
    pub expressions: Vec<MediaQueryExpression>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQueryExpression {
    pub not: bool,
    pub only: bool,
    pub media_type: Option<Vec<u8>>,
    /// `and`-joined features.
    pub features: Vec<MediaFeature>,
}

/// `(name: value)`, `(name)` or a range form like `(width >= 600px)`
/// where the operator is kept as part of `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFeature {
    pub name: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframesAtRule {
    pub name: Vec<u8>,
    pub webkit_prefix: bool,
    pub stops: Vec<KeyframeStop>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframeStop {
    /// `from`, `to` or percentages, as written.
    pub stops: Vec<Vec<u8>>,
    pub rules: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAtRule {
    pub url: Value,
    pub layer: Option<Value>,
    pub supports: Option<SupportsCondition>,
    pub media: Option<MediaQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetAtRule {
    /// Without the quotes.
    pub charset: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceAtRule {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFeatureValuesAtRule {
    pub font_families: Vec<Vec<u8>>,
    pub blocks: Vec<FontFeatureValuesBlock>,
}

/// `@stylistic { ... }`, `@swash { ... }` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFeatureValuesBlock {
    pub name: Vec<u8>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorProfileAtRule {
    pub device_cmyk: bool,
    /// The dashed-ident, absent for `device-cmyk`.
    pub name: Option<Vec<u8>>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterStyleAtRule {
    pub name: Vec<u8>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerAtRule {
    pub name: Option<Vec<u8>>,
    /// `and`-joined parenthesized conditions.
    pub query: Vec<ContainerCondition>,
    /// Declarations, nested rule-sets and comments.
    pub rules: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerCondition {
    pub features: Vec<MediaFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportsAtRule {
    pub condition: SupportsCondition,
    pub rules: Vec<Node>,
}

/// `@layer a, b;` has no rules, `@layer a { ... }` has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerAtRule {
    pub names: Vec<Vec<u8>>,
    pub rules: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAtRule {
    /// Page name and/or pseudo page, e.g. `:first`.
    pub selector: Option<Vec<u8>>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceAtRule {
    pub prefix: Option<Vec<u8>>,
    pub url: Value,
}

/// `@viewport` and its vendor prefixed forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportAtRule {
    pub name: Vec<u8>,
    pub declarations: Vec<Declaration>,
}

/// Grammar of `supports(...)` and `@supports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupportsCondition {
    Declaration { key: Vec<u8>, value: Vec<Value> },
    Function { name: Vec<u8>, args: Vec<Value> },
    /// `and` / `or`, as written.
    Operator { op: Vec<u8> },
    Not { inner: Box<SupportsCondition> },
    Group { conditions: Vec<SupportsCondition> },
}

impl SupportsCondition {
    /// A single condition stays as is, anything else becomes a group.
    pub fn from_sequence(mut conditions: Vec<SupportsCondition>) -> Self {
        if conditions.len() == 1 {
            if let Some(condition) = conditions.pop() {
                return condition;
            }
        }
        SupportsCondition::Group { conditions }
    }
}

macro_rules! ast_node_kind {
    ($($ty:ident),* $(,)?) => {
        $(
            impl AstNode for $ty {
                fn kind(&self) -> NodeKind {
                    NodeKind::$ty
                }
            }
        )*
    };
}

ast_node_kind!(
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
);
