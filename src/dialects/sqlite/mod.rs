use crate::dialects::base::{compile_rules, CompiledRule, RuleSet};
use std::sync::OnceLock;

static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();

/// Ordered rewrite table for SQLite targets
pub fn rules() -> &'static [CompiledRule] {
    RULES.get_or_init(|| {
        let rules_str = include_str!("rules.toml");
        let set: RuleSet = toml::from_str(rules_str).expect("Failed to parse SQLite rule table");
        compile_rules(set.rules).expect("Failed to compile SQLite rule table")
    })
}
