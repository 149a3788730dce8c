use crate::dialects::base::{compile_rules, CompiledRule, RuleSet};
use std::sync::OnceLock;

static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();

/// Ordered rewrite table for PostgreSQL targets
pub fn rules() -> &'static [CompiledRule] {
    RULES.get_or_init(|| {
        let rules_str = include_str!("rules.toml");
        let set: RuleSet =
            toml::from_str(rules_str).expect("Failed to parse PostgreSQL rule table");
        compile_rules(set.rules).expect("Failed to compile PostgreSQL rule table")
    })
}

/// Replace each `?` with `$1`, `$2`, ... in order of appearance.
///
/// The scan is purely lexical: a `?` inside a quoted literal is numbered as well.
pub fn renumber_placeholders(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len() + 8);
    let mut count = 0usize;

    for ch in sql.chars() {
        if ch == '?' {
            count += 1;
            result.push('$');
            result.push_str(&count.to_string());
        } else {
            result.push(ch);
        }
    }

    result
}
