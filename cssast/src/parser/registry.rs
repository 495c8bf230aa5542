use std::collections::HashMap;

use strum_macros::{Display, EnumIter};

/// Grammar selected for an at-rule name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AtRuleKind {
    Media,
    Keyframes,
    WebkitKeyframes,
    Import,
    Charset,
    FontFace,
    FontFeatureValues,
    ColorProfile,
    CounterStyle,
    Container,
    Supports,
    Layer,
    Page,
    Namespace,
    Viewport,
}

const DEFAULT_AT_RULES: &[(&str, AtRuleKind)] = &[
    ("media", AtRuleKind::Media),
    ("keyframes", AtRuleKind::Keyframes),
    ("-webkit-keyframes", AtRuleKind::WebkitKeyframes),
    ("import", AtRuleKind::Import),
    ("charset", AtRuleKind::Charset),
    ("font-face", AtRuleKind::FontFace),
    ("font-feature-values", AtRuleKind::FontFeatureValues),
    ("color-profile", AtRuleKind::ColorProfile),
    ("counter-style", AtRuleKind::CounterStyle),
    ("container", AtRuleKind::Container),
    ("supports", AtRuleKind::Supports),
    ("layer", AtRuleKind::Layer),
    ("page", AtRuleKind::Page),
    ("namespace", AtRuleKind::Namespace),
    ("viewport", AtRuleKind::Viewport),
    ("-ms-viewport", AtRuleKind::Viewport),
];

/// Table from lower-cased at-rule name to grammar, handed to the parser at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRuleRegistry {
    entries: HashMap<Vec<u8>, AtRuleKind>,
}

impl Default for AtRuleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, kind) in DEFAULT_AT_RULES {
            registry.register(name, *kind);
        }
        registry
    }
}

impl AtRuleRegistry {
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Kind of a built-in at-rule name.
    pub fn builtin(name: &str) -> Option<AtRuleKind> {
        DEFAULT_AT_RULES
            .iter()
            .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
    }

    pub fn register(&mut self, name: &str, kind: AtRuleKind) -> Option<AtRuleKind> {
        self.entries.insert(name.to_ascii_lowercase().into_bytes(), kind)
    }

    pub fn unregister(&mut self, name: &str) -> Option<AtRuleKind> {
        self.entries.remove(name.to_ascii_lowercase().as_bytes())
    }

    /// Case-insensitive lookup of the name following `@`.
    pub fn lookup(&self, name: &[u8]) -> Option<AtRuleKind> {
        self.entries.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test_registry {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn default_names() {
        let registry = AtRuleRegistry::default();
        assert_eq!(registry.lookup(b"media"), Some(AtRuleKind::Media));
        assert_eq!(registry.lookup(b"MEDIA"), Some(AtRuleKind::Media));
        assert_eq!(registry.lookup(b"-webkit-keyframes"), Some(AtRuleKind::WebkitKeyframes));
        assert_eq!(registry.lookup(b"-ms-viewport"), Some(AtRuleKind::Viewport));
        assert_eq!(registry.lookup(b"-moz-document"), None);
        assert_eq!(registry.len(), DEFAULT_AT_RULES.len());
    }

    #[test]
    fn every_kind_has_a_default_name() {
        for kind in AtRuleKind::iter() {
            assert!(DEFAULT_AT_RULES.iter().any(|(_, k)| *k == kind), "{kind} has no name");
        }
    }

    #[test]
    fn register_and_unregister() {
        let mut registry = AtRuleRegistry::empty();
        assert!(registry.is_empty());
        assert_eq!(registry.register("-Moz-Keyframes", AtRuleKind::Keyframes), None);
        assert_eq!(registry.lookup(b"-moz-keyframes"), Some(AtRuleKind::Keyframes));
        assert_eq!(registry.unregister("-MOZ-keyframes"), Some(AtRuleKind::Keyframes));
        assert_eq!(registry.lookup(b"-moz-keyframes"), None);
        assert_eq!(AtRuleRegistry::builtin("Font-Face"), Some(AtRuleKind::FontFace));
    }
}
