//! Target dialects for the preflight translator
//!
//! Statements are written against the canonical (MySQL-compatible) dialect. Each
//! non-canonical target carries an ordered rule table, embedded as TOML, and
//! shares the upsert rewriter driven by the conflict registry.

pub mod base;
pub mod registry;
pub mod upsert;

pub mod postgres;
pub mod sqlite;

pub use base::{apply_rules, compile_rules, CompiledRule, DialectError, Rule, RuleSet};
pub use registry::{ConflictEntry, ConflictRegistry};

use std::fmt;
use std::str::FromStr;

/// The engine statements are translated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Statements already match the execution engine; no translation
    #[default]
    Canonical,
    Sqlite,
    Postgres,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Canonical, Dialect::Sqlite, Dialect::Postgres];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Canonical => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Dialect::Canonical => &["mysql", "canonical", "mariadb"],
            Dialect::Sqlite => &["sqlite", "sqlite3"],
            Dialect::Postgres => &["postgres", "postgresql", "pg"],
        }
    }

    /// Resolve an optional driver name; absent or blank selects the canonical dialect
    pub fn from_driver(driver: Option<&str>) -> Result<Self, DialectError> {
        match driver.map(str::trim) {
            None | Some("") => Ok(Dialect::Canonical),
            Some(name) => name.parse(),
        }
    }

    /// Rule table applied for this dialect, in order
    pub fn rules(&self) -> &'static [CompiledRule] {
        match self {
            Dialect::Canonical => &[],
            Dialect::Sqlite => sqlite::rules(),
            Dialect::Postgres => postgres::rules(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Dialect::Canonical)
    }

    /// Whether `?` placeholders must be rewritten to `$n`
    pub fn numbers_placeholders(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Dialect::ALL
            .into_iter()
            .find(|d| d.aliases().contains(&lower.as_str()))
            .ok_or_else(|| DialectError::NotFound(s.to_string()))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// List all available dialect names
pub fn list_dialects() -> Vec<&'static str> {
    Dialect::ALL.iter().map(Dialect::name).collect()
}
