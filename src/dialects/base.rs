use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single substitution in a dialect's rule table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    /// Literal substring, or a regular expression when `regex` is set
    pub find: String,
    /// Replacement text; regex rules may reference capture groups (`$1`, `${1}`)
    pub replace: String,
    #[serde(default)]
    pub regex: bool,
}

impl Rule {
    pub fn literal(find: &str, replace: &str) -> Self {
        Self {
            find: find.to_string(),
            replace: replace.to_string(),
            regex: false,
        }
    }

    pub fn pattern(find: &str, replace: &str) -> Self {
        Self {
            find: find.to_string(),
            replace: replace.to_string(),
            regex: true,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.regex { "regex" } else { "literal" };
        write!(f, "{:<7} {:?} -> {:?}", kind, self.find, self.replace)
    }
}

/// Ordered rule table as stored in a dialect's `rules.toml`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleSet {
    #[serde(rename = "rule", default)]
    pub rules: Vec<Rule>,
}

/// A rule with its regular expression compiled up front
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    regex: Option<Regex>,
}

impl CompiledRule {
    pub fn new(rule: Rule) -> Result<Self, DialectError> {
        // rules must never add or remove positional placeholders
        let touches_placeholder = if rule.regex {
            rule.replace.contains('?')
        } else {
            rule.find.contains('?') || rule.replace.contains('?')
        };
        if touches_placeholder {
            return Err(DialectError::InvalidRule {
                find: rule.find,
                reason: "rules may not add or remove '?' placeholders".to_string(),
            });
        }

        let regex = if rule.regex {
            let compiled = Regex::new(&rule.find).map_err(|e| DialectError::InvalidRule {
                find: rule.find.clone(),
                reason: e.to_string(),
            })?;
            if matches_placeholder(&compiled) {
                return Err(DialectError::InvalidRule {
                    find: rule.find,
                    reason: "pattern may match '?' placeholders".to_string(),
                });
            }
            Some(compiled)
        } else {
            None
        };

        Ok(Self { rule, regex })
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn apply(&self, sql: &str) -> String {
        match &self.regex {
            Some(re) => re.replace_all(sql, self.rule.replace.as_str()).into_owned(),
            None => sql.replace(&self.rule.find, &self.rule.replace),
        }
    }
}

/// Placeholder positions a pattern must never consume
const PLACEHOLDER_SAMPLES: &[&str] = &[
    "?",
    "= ?",
    "(?, ?)",
    "VALUES (?, ?, ?) WHERE id = ?",
    "LIMIT ? OFFSET ?",
];

fn matches_placeholder(regex: &Regex) -> bool {
    regex.as_str().contains(r"\?")
        || PLACEHOLDER_SAMPLES
            .iter()
            .any(|sample| regex.find_iter(sample).any(|m| m.as_str().contains('?')))
}

/// Compile a rule table, preserving its order
pub fn compile_rules(rules: Vec<Rule>) -> Result<Vec<CompiledRule>, DialectError> {
    rules.into_iter().map(CompiledRule::new).collect()
}

/// Apply every rule in order; an unmatched rule is a no-op
pub fn apply_rules(sql: &str, rules: &[CompiledRule]) -> String {
    rules
        .iter()
        .fold(sql.to_string(), |sql, rule| rule.apply(&sql))
}

/// Error types for dialect operations
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    #[error("Dialect not found: {0}")]
    NotFound(String),

    #[error("Invalid rule '{find}': {reason}")]
    InvalidRule { find: String, reason: String },

    #[error("Invalid conflict entry for table '{table}': {reason}")]
    InvalidConflictEntry { table: String, reason: String },

    #[error("Table '{0}' is registered more than once")]
    DuplicateTable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
