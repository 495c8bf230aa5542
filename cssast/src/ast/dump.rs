//! Deterministic multi-line rendering of the tree, two spaces per level.
//!
//! ```text
//! Declaration {
//!   Key: "color"
//!   Value: [
//!     BasicValue { Value: "red" }
//!   ]
//!   Important: false
//! }
//! ```

use std::fmt;

use super::*;

pub trait Dump {
    fn dump(&self, d: &mut Dumper);

    fn dump_string(&self) -> String {
        let mut d = Dumper::default();
        self.dump(&mut d);
        d.finish()
    }
}

#[derive(Debug, Default)]
pub struct Dumper {
    out: String,
    indent: usize,
    /// Label for the next line, set by `node` so nested nodes start on the label's line.
    label: Option<&'static str>,
}

pub(crate) fn quoted(bytes: &[u8]) -> String {
    format!("{:?}", String::from_utf8_lossy(bytes))
}

impl Dumper {
    /// The rendered text, without a trailing newline.
    pub fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }

    pub fn line(&mut self, text: &str) {
        self.out.push_str(&"  ".repeat(self.indent));
        if let Some(label) = self.label.take() {
            self.out.push_str(label);
            self.out.push_str(": ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn open(&mut self, kind: NodeKind) {
        self.line(&format!("{kind} {{"));
        self.indent += 1;
    }

    pub fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    pub fn bytes(&mut self, label: &'static str, bytes: &[u8]) {
        self.label = Some(label);
        self.line(&quoted(bytes));
    }

    pub fn opt_bytes(&mut self, label: &'static str, bytes: Option<&[u8]>) {
        match bytes {
            Some(bytes) => self.bytes(label, bytes),
            None => self.none(label),
        }
    }

    pub fn flag(&mut self, label: &'static str, flag: bool) {
        self.label = Some(label);
        self.line(&flag.to_string());
    }

    pub fn node(&mut self, label: &'static str, node: &impl Dump) {
        self.label = Some(label);
        node.dump(self);
    }

    pub fn opt_node(&mut self, label: &'static str, node: Option<&impl Dump>) {
        match node {
            Some(node) => self.node(label, node),
            None => self.none(label),
        }
    }

    pub fn list<T: Dump>(&mut self, label: &'static str, items: &[T]) {
        self.label = Some(label);
        if items.is_empty() {
            self.line("[]");
            return;
        }
        self.line("[");
        self.indent += 1;
        for item in items {
            item.dump(self);
        }
        self.indent -= 1;
        self.line("]");
    }

    fn none(&mut self, label: &'static str) {
        self.label = Some(label);
        self.line("none");
    }
}

impl Dump for Vec<u8> {
    fn dump(&self, d: &mut Dumper) {
        d.line(&quoted(self));
    }
}

impl Dump for Node {
    fn dump(&self, d: &mut Dumper) {
        self.as_ast_node().dump(d)
    }
}

impl Dump for Stylesheet {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::Stylesheet);
        d.list("Rules", &self.rules);
        d.close();
    }
}

impl Dump for Comment {
    fn dump(&self, d: &mut Dumper) {
        d.line(&format!("Comment {{ Text: {} }}", quoted(&self.text)));
    }
}

impl Dump for Selector {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::Selector);
        d.list("Selectors", &self.selectors);
        d.list("Rules", &self.rules);
        d.close();
    }
}

impl Dump for SelectorValue {
    fn dump(&self, d: &mut Dumper) {
        d.line(&format!("SelectorValue {{ Kind: {}, Value: {} }}", self.kind, quoted(&self.value)));
    }
}

impl Dump for Declaration {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::Declaration);
        d.bytes("Key", &self.key);
        d.list("Value", &self.value);
        d.flag("Important", self.important);
        d.close();
    }
}

impl Dump for Value {
    fn dump(&self, d: &mut Dumper) {
        match self {
            Value::Basic(v) => d.line(&format!("BasicValue {{ Value: {} }}", quoted(&v.value))),
            Value::String(v) => d.line(&format!(
                "StringValue {{ SingleQuote: {}, Value: {} }}",
                v.single_quote,
                quoted(&v.value)
            )),
            Value::Function(v) => {
                d.line("FunctionValue {");
                d.indent += 1;
                d.bytes("Name", &v.name);
                d.list("Args", &v.args);
                d.close();
            }
        }
    }
}

impl Dump for MediaAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::MediaAtRule);
        d.node("Query", &self.query);
        d.list("Rules", &self.rules);
        d.close();
    }
}

impl Dump for MediaQuery {
    fn dump(&self, d: &mut Dumper) {
        d.line("MediaQuery {");
        d.indent += 1;
        d.list("Expressions", &self.expressions);
        d.close();
    }
}

impl Dump for MediaQueryExpression {
    fn dump(&self, d: &mut Dumper) {
        d.line("MediaQueryExpression {");
        d.indent += 1;
        d.flag("Not", self.not);
        d.flag("Only", self.only);
        d.opt_bytes("MediaType", self.media_type.as_deref());
        d.list("Features", &self.features);
        d.close();
    }
}

impl Dump for MediaFeature {
    fn dump(&self, d: &mut Dumper) {
        let value = self.value.as_deref().map_or_else(|| "none".to_owned(), quoted);
        d.line(&format!("MediaFeature {{ Name: {}, Value: {} }}", quoted(&self.name), value));
    }
}

impl Dump for KeyframesAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::KeyframesAtRule);
        d.bytes("Name", &self.name);
        d.flag("WebkitPrefix", self.webkit_prefix);
        d.list("Stops", &self.stops);
        d.close();
    }
}

impl Dump for KeyframeStop {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::KeyframeStop);
        d.list("Stops", &self.stops);
        d.list("Rules", &self.rules);
        d.close();
    }
}

impl Dump for ImportAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::ImportAtRule);
        d.node("Url", &self.url);
        d.opt_node("Layer", self.layer.as_ref());
        d.opt_node("Supports", self.supports.as_ref());
        d.opt_node("Media", self.media.as_ref());
        d.close();
    }
}

impl Dump for CharsetAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::CharsetAtRule);
        d.bytes("Charset", &self.charset);
        d.close();
    }
}

impl Dump for FontFaceAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::FontFaceAtRule);
        d.list("Declarations", &self.declarations);
        d.close();
    }
}

impl Dump for FontFeatureValuesAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::FontFeatureValuesAtRule);
        d.list("FontFamilies", &self.font_families);
        d.list("Blocks", &self.blocks);
        d.close();
    }
}

impl Dump for FontFeatureValuesBlock {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::FontFeatureValuesBlock);
        d.bytes("Name", &self.name);
        d.list("Declarations", &self.declarations);
        d.close();
    }
}

impl Dump for ColorProfileAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::ColorProfileAtRule);
        d.flag("DeviceCmyk", self.device_cmyk);
        d.opt_bytes("Name", self.name.as_deref());
        d.list("Declarations", &self.declarations);
        d.close();
    }
}

impl Dump for CounterStyleAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::CounterStyleAtRule);
        d.bytes("Name", &self.name);
        d.list("Declarations", &self.declarations);
        d.close();
    }
}

impl Dump for ContainerAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::ContainerAtRule);
        d.opt_bytes("Name", self.name.as_deref());
        d.list("Query", &self.query);
        d.list("Rules", &self.rules);
        d.close();
    }
}

impl Dump for ContainerCondition {
    fn dump(&self, d: &mut Dumper) {
        d.line("ContainerCondition {");
        d.indent += 1;
        d.list("Features", &self.features);
        d.close();
    }
}

impl Dump for SupportsAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::SupportsAtRule);
        d.node("Condition", &self.condition);
        d.list("Rules", &self.rules);
        d.close();
    }
}

impl Dump for LayerAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::LayerAtRule);
        d.list("Names", &self.names);
        match &self.rules {
            Some(rules) => d.list("Rules", rules),
            None => d.none("Rules"),
        }
        d.close();
    }
}

impl Dump for PageAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::PageAtRule);
        d.opt_bytes("Selector", self.selector.as_deref());
        d.list("Declarations", &self.declarations);
        d.close();
    }
}

impl Dump for NamespaceAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::NamespaceAtRule);
        d.opt_bytes("Prefix", self.prefix.as_deref());
        d.node("Url", &self.url);
        d.close();
    }
}

impl Dump for ViewportAtRule {
    fn dump(&self, d: &mut Dumper) {
        d.open(NodeKind::ViewportAtRule);
        d.bytes("Name", &self.name);
        d.list("Declarations", &self.declarations);
        d.close();
    }
}

impl Dump for SupportsCondition {
    fn dump(&self, d: &mut Dumper) {
        match self {
            SupportsCondition::Declaration { key, value } => {
                d.line("SupportsDeclaration {");
                d.indent += 1;
                d.bytes("Key", key);
                d.list("Value", value);
                d.close();
            }
            SupportsCondition::Function { name, args } => {
                d.line("SupportsFunction {");
                d.indent += 1;
                d.bytes("Name", name);
                d.list("Args", args);
                d.close();
            }
            SupportsCondition::Operator { op } => {
                d.line(&format!("SupportsOperator {{ Op: {} }}", quoted(op)));
            }
            SupportsCondition::Not { inner } => {
                d.line("SupportsNot {");
                d.indent += 1;
                d.node("Inner", inner.as_ref());
                d.close();
            }
            SupportsCondition::Group { conditions } => {
                d.line("SupportsGroup {");
                d.indent += 1;
                d.list("Conditions", conditions);
                d.close();
            }
        }
    }
}

macro_rules! display_via_dump {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.dump_string())
                }
            }
        )*
    };
}

display_via_dump!(
    Stylesheet,
    Node,
    Comment,
    Selector,
    SelectorValue,
    Declaration,
    Value,
    MediaAtRule,
    MediaQuery,
    MediaFeature,
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
    SupportsCondition,
    LayerAtRule,
    PageAtRule,
    NamespaceAtRule,
    ViewportAtRule,
);
