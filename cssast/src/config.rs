use std::collections::BTreeMap;

use anyhow::bail;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::parser::registry::AtRuleRegistry;

const CONFIG_ITEMS: &[&str] = &["keepComments", "maxErrors", "atRuleAliases", "disabledAtRules"];

/// Parser options. Read from camelCase JSON, every key optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Keep `Comment` nodes in the tree.
    pub keep_comments: bool,
    /// Stop recording errors after this many. Parsing still runs to the end.
    pub max_errors: Option<usize>,
    /// Extra at-rule names mapped to the built-in name whose grammar they reuse.
    pub at_rule_aliases: BTreeMap<String, String>,
    /// At-rule names removed from the registry.
    pub disabled_at_rules: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keep_comments: true,
            max_errors: None,
            at_rule_aliases: BTreeMap::new(),
            disabled_at_rules: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn update(&mut self, update: &Value) -> anyhow::Result<()> {
        if let Value::Object(update) = update {
            self.update_by_map(update)
        } else {
            bail!("got invalid configuration object {update}")
        }
    }

    /// Applies the keys present in `update`, leaving the others untouched.
    /// Nothing is applied when any key is invalid.
    pub fn update_by_map(&mut self, update: &Map<String, Value>) -> anyhow::Result<()> {
        if let Some(unknown) = update.keys().find(|key| !CONFIG_ITEMS.contains(&key.as_str())) {
            bail!("unknown configuration item `{unknown}`")
        }

        let mut next = self.clone();
        if let Some(keep_comments) = update.get("keepComments") {
            next.keep_comments = bool::deserialize(keep_comments)?;
        }
        if let Some(max_errors) = update.get("maxErrors") {
            next.max_errors = Option::<usize>::deserialize(max_errors)?;
        }
        if let Some(aliases) = update.get("atRuleAliases") {
            next.at_rule_aliases = BTreeMap::<String, String>::deserialize(aliases)?;
        }
        if let Some(disabled) = update.get("disabledAtRules") {
            next.disabled_at_rules = Vec::<String>::deserialize(disabled)?;
        }
        next.validate()?;

        *self = next;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (alias, target) in &self.at_rule_aliases {
            if AtRuleRegistry::builtin(target).is_none() {
                bail!("at-rule alias `{alias}` points to unknown at-rule `{target}`")
            }
        }
        Ok(())
    }

    /// Default registry with aliases added, then disabled names removed.
    pub fn registry(&self) -> AtRuleRegistry {
        let mut registry = AtRuleRegistry::default();
        for (alias, target) in &self.at_rule_aliases {
            match AtRuleRegistry::builtin(target) {
                Some(kind) => {
                    registry.register(alias, kind);
                }
                None => tracing::warn!(alias, target, "ignoring alias to unknown at-rule"),
            }
        }
        for name in &self.disabled_at_rules {
            registry.unregister(name);
        }
        registry
    }
}

#[cfg(test)]
mod test_config {
    use super::*;
    use crate::parser::registry::AtRuleKind;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.keep_comments);
        assert_eq!(config.registry(), AtRuleRegistry::default());
    }

    #[test]
    fn from_json() {
        let config = Config::from_json(
            r#"{"keepComments": false, "maxErrors": 3, "atRuleAliases": {"-moz-keyframes": "keyframes"}, "disabledAtRules": ["import"]}"#,
        )
        .unwrap();
        assert!(!config.keep_comments);
        assert_eq!(config.max_errors, Some(3));
        let registry = config.registry();
        assert_eq!(registry.lookup(b"-moz-keyframes"), Some(AtRuleKind::Keyframes));
        assert_eq!(registry.lookup(b"import"), None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Config::from_json(r#"{"keepComment": false}"#).is_err());
        assert!(Config::from_json(r#"{"atRuleAliases": {"-x-foo": "foo"}}"#).is_err());
        let mut config = Config::default();
        assert!(config.update(&json!([1, 2])).is_err());
        assert!(config.update(&json!({"semanticTokens": true})).is_err());
        assert!(config.update(&json!({"keepComments": "yes"})).is_err());
    }

    #[test]
    fn partial_update() {
        let mut config = Config::default();
        config.update(&json!({"maxErrors": 10})).unwrap();
        assert_eq!(config.max_errors, Some(10));
        assert!(config.keep_comments);

        config.update(&json!({"keepComments": false, "maxErrors": null})).unwrap();
        assert_eq!(config.max_errors, None);
        assert!(!config.keep_comments);

        let before = config.clone();
        assert!(config.update(&json!({"maxErrors": 1, "atRuleAliases": {"a": "nope"}})).is_err());
        assert_eq!(config, before);
    }
}
